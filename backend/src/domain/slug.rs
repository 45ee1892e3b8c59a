//! URL-safe identifiers for categories and products.

use serde::{Deserialize, Serialize};

/// Maximum slug length.
pub const SLUG_MAX: usize = 96;

/// Reasons a slug is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlugValidationError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain lowercase letters, digits and single hyphens")]
    InvalidCharacters,
}

/// Lowercase ASCII letters, digits and inner single hyphens.
///
/// # Examples
/// ```
/// use bistro::domain::Slug;
///
/// assert!(Slug::new("margherita-pizza").is_ok());
/// assert!(Slug::new("-pizza").is_err());
/// assert_eq!(Slug::from_name("Crème Brûlée & Co").as_ref(), "cr-me-br-l-e-co");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate an explicit slug.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SlugValidationError> {
        let value = raw.as_ref();
        if value.is_empty() {
            return Err(SlugValidationError::Empty);
        }
        if value.len() > SLUG_MAX {
            return Err(SlugValidationError::TooLong { max: SLUG_MAX });
        }
        let allowed = value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if !allowed || value.starts_with('-') || value.ends_with('-') || value.contains("--") {
            return Err(SlugValidationError::InvalidCharacters);
        }
        Ok(Self(value.to_owned()))
    }

    /// Derive a slug from a display name, collapsing every run of other
    /// characters into one hyphen. Falls back to `"item"` when nothing
    /// usable remains.
    pub fn from_name(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                out.push(ch.to_ascii_lowercase());
            } else if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        }
        let trimmed: String = out.trim_end_matches('-').chars().take(SLUG_MAX).collect();
        let cleaned = trimmed.trim_end_matches('-');
        if cleaned.is_empty() {
            Self(String::from("item"))
        } else {
            Self(cleaned.to_owned())
        }
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
