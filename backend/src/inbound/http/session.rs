//! Cookie session access for handlers.
//!
//! Only the signed-in user's id lives in the cookie; the role is looked up
//! on every request so demotions take effect immediately.

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// The caller's session, extracted from the request.
#[derive(Clone)]
pub struct SessionContext {
    session: Session,
}

impl SessionContext {
    /// Remember `user_id` as signed in. The session id is rotated first so a
    /// cookie captured before login cannot be replayed afterwards.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.session.renew();
        self.session
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|err| Error::internal(format!("session write failed: {err}")))
    }

    /// Forget the caller; the response carries an expired cookie.
    pub fn sign_out(&self) {
        self.session.purge();
    }

    /// The signed-in user id. A cookie holding something other than a user
    /// id counts as signed out.
    pub fn signed_in_user(&self) -> Result<Option<UserId>, Error> {
        let Some(raw) = self
            .session
            .get::<String>(USER_ID_KEY)
            .map_err(|err| Error::internal(format!("session read failed: {err}")))?
        else {
            return Ok(None);
        };
        Ok(UserId::new(&raw)
            .inspect_err(|err| warn!(error = %err, "discarding malformed session user id"))
            .ok())
    }

    /// Like [`Self::signed_in_user`] but `401` when nobody is signed in.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.signed_in_user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self {
            session: req.get_session(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::inbound::http::test_utils::{session_cookie, sign_in, test_session_middleware};

    const CUSTOMER_ID: &str = "9b2d4c1e-7f3a-4e8b-a5c6-0d1e2f3a4b5c";

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user_id()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    async fn sign_out(session: SessionContext) -> HttpResponse {
        session.sign_out();
        HttpResponse::NoContent().finish()
    }

    async fn forge(session: Session) -> Result<HttpResponse, actix_web::Error> {
        session.insert(USER_ID_KEY, "table-7")?;
        Ok(HttpResponse::NoContent().finish())
    }

    fn session_cookie_of(res: &ServiceResponse) -> Option<Cookie<'static>> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(Cookie::into_owned)
    }

    async fn ask_whoami<S>(app: &S, cookie: Option<Cookie<'static>>) -> (StatusCode, String)
    where
        S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let request = test::TestRequest::get().uri("/whoami");
        let request = match cookie {
            Some(cookie) => request.cookie(cookie),
            None => request,
        };
        let res = test::call_service(app, request.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    macro_rules! session_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .route("/test/sign-in/{id}", web::post().to(sign_in))
                    .route("/whoami", web::get().to(whoami))
                    .route("/sign-out", web::post().to(sign_out))
                    .route("/forge", web::post().to(forge)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn signed_in_customer_is_recognised() {
        let app = session_app!();
        let id = UserId::new(CUSTOMER_ID).expect("fixture id");
        let cookie = session_cookie(&app, &id).await;

        let (status, body) = ask_whoami(&app, Some(cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, CUSTOMER_ID);
    }

    #[actix_web::test]
    async fn anonymous_caller_is_unauthorised() {
        let app = session_app!();
        let (status, _) = ask_whoami(&app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn sign_out_sends_an_empty_cookie() {
        let app = session_app!();
        let id = UserId::new(CUSTOMER_ID).expect("fixture id");
        let cookie = session_cookie(&app, &id).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/sign-out")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let cleared = session_cookie_of(&res).expect("removal cookie");
        assert_eq!(cleared.value(), "");
    }

    #[actix_web::test]
    async fn malformed_user_id_counts_as_signed_out() {
        let app = session_app!();
        let res =
            test::call_service(&app, test::TestRequest::post().uri("/forge").to_request()).await;
        let cookie = session_cookie_of(&res).expect("forged cookie");

        let (status, _) = ask_whoami(&app, Some(cookie)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
