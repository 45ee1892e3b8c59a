//! Session settings under release and debug rules.

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temporary key file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

#[fixture]
fn good_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn env_with(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |name| vars.get(name).cloned());
    env
}

fn release_vars(key: &NamedTempFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key.path().to_string_lossy().into_owned()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

fn release_error(vars: HashMap<&'static str, String>) -> SessionConfigError {
    match session_settings_from_env(&env_with(vars), BuildMode::Release) {
        Ok(_) => panic!("release settings should be rejected"),
        Err(error) => error,
    }
}

#[rstest]
fn complete_release_settings_are_accepted(good_key: NamedTempFile) {
    let settings = session_settings_from_env(&env_with(release_vars(&good_key)), BuildMode::Release)
        .expect("valid release settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.key_fingerprint().len(), 16);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(good_key: NamedTempFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&good_key);
    vars.remove(missing);
    let error = release_error(vars);
    assert!(
        matches!(error, SessionConfigError::MissingEnv { name } if name == missing),
        "unexpected error: {error}"
    );
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
#[case(SAMESITE_ENV, "sometimes")]
fn release_rejects_malformed_toggles(
    good_key: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&good_key);
    vars.insert(name, value.to_owned());
    let error = release_error(vars);
    assert!(
        matches!(error, SessionConfigError::InvalidEnv { name: got, .. } if got == name),
        "unexpected error: {error}"
    );
}

#[rstest]
fn release_refuses_ephemeral_keys(good_key: NamedTempFile) {
    let mut vars = release_vars(&good_key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::EphemeralNotAllowed
    ));
}

#[rstest]
fn release_refuses_insecure_same_site_none(good_key: NamedTempFile) {
    let mut vars = release_vars(&good_key);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::InsecureSameSiteNone
    ));
}

#[rstest]
fn release_needs_a_readable_key(good_key: NamedTempFile) {
    let mut vars = release_vars(&good_key);
    vars.insert(KEY_FILE_ENV, "/nonexistent/bistro/session_key".to_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::KeyRead { .. }
    ));
}

#[rstest]
fn release_rejects_short_keys() {
    let short = key_file(32);
    let error = release_error(release_vars(&short));
    assert!(matches!(
        error,
        SessionConfigError::KeyTooShort { length: 32, .. }
    ));
}

#[rstest]
fn debug_builds_fall_back_to_defaults() {
    let settings = session_settings_from_env(&env_with(HashMap::new()), BuildMode::Debug)
        .expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_builds_replace_short_keys() {
    let short = key_file(8);
    let mut vars = HashMap::new();
    vars.insert(KEY_FILE_ENV, short.path().to_string_lossy().into_owned());
    let settings =
        session_settings_from_env(&env_with(vars), BuildMode::Debug).expect("temporary key");
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn the_same_key_file_yields_the_same_fingerprint(good_key: NamedTempFile) {
    let first = session_settings_from_env(&env_with(release_vars(&good_key)), BuildMode::Release)
        .expect("valid release settings");
    let second = session_settings_from_env(&env_with(release_vars(&good_key)), BuildMode::Release)
        .expect("valid release settings");
    assert_eq!(first.key_fingerprint(), second.key_fingerprint());
}
