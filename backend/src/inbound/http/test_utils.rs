//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test, web};
use serde_json::Value;

use crate::domain::ports::{
    MockAccountCommand, MockAccountQuery, MockCatalogueCommand, MockCatalogueQuery, MockCheckout,
    MockContactInbox, MockImageLibrary, MockOrderAdministration, MockOrderTracking,
    MockShoppingCart, MockStaffChat, MockSubscribers, MockTestimonials,
};
use crate::domain::{Error, Role, User, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Test-only handler storing the path's user id in the session.
pub async fn sign_in(
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user_id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.sign_in(&user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sign `user_id` in through `/test/sign-in/{id}` and return the cookie.
pub async fn session_cookie<S>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(&format!("/test/sign-in/{user_id}"))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "test sign-in failed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// `mockall` doubles for every driving port, ready for expectations.
pub struct TestPorts {
    pub accounts: MockAccountCommand,
    pub account_query: MockAccountQuery,
    pub catalogue: MockCatalogueQuery,
    pub catalogue_admin: MockCatalogueCommand,
    pub cart: MockShoppingCart,
    pub checkout: MockCheckout,
    pub orders: MockOrderTracking,
    pub order_admin: MockOrderAdministration,
    pub testimonials: MockTestimonials,
    pub subscribers: MockSubscribers,
    pub contact: MockContactInbox,
    pub chat: MockStaffChat,
    pub images: MockImageLibrary,
}

impl Default for TestPorts {
    fn default() -> Self {
        Self {
            accounts: MockAccountCommand::new(),
            account_query: MockAccountQuery::new(),
            catalogue: MockCatalogueQuery::new(),
            catalogue_admin: MockCatalogueCommand::new(),
            cart: MockShoppingCart::new(),
            checkout: MockCheckout::new(),
            orders: MockOrderTracking::new(),
            order_admin: MockOrderAdministration::new(),
            testimonials: MockTestimonials::new(),
            subscribers: MockSubscribers::new(),
            contact: MockContactInbox::new(),
            chat: MockStaffChat::new(),
            images: MockImageLibrary::new(),
        }
    }
}

impl TestPorts {
    /// Resolve any session user id to `user`.
    pub fn signed_in_as(&mut self, user: &User) -> &mut Self {
        let stored = user.clone();
        self.account_query
            .expect_find_user()
            .returning(move |_| Ok(Some(stored.clone())));
        self
    }

    /// Wrap every double in an [`HttpState`].
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            accounts: Arc::new(self.accounts),
            account_query: Arc::new(self.account_query),
            catalogue: Arc::new(self.catalogue),
            catalogue_admin: Arc::new(self.catalogue_admin),
            cart: Arc::new(self.cart),
            checkout: Arc::new(self.checkout),
            orders: Arc::new(self.orders),
            order_admin: Arc::new(self.order_admin),
            testimonials: Arc::new(self.testimonials),
            subscribers: Arc::new(self.subscribers),
            contact: Arc::new(self.contact),
            chat: Arc::new(self.chat),
            images: Arc::new(self.images),
        })
    }
}

/// App with `state`, test sessions, the sign-in route, and `configure`'s
/// services mounted under `/api/v1`.
pub fn test_app(
    state: HttpState,
    configure: impl FnOnce(&mut web::ServiceConfig),
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route("/test/sign-in/{id}", web::post().to(sign_in))
        .service(web::scope("/api/v1").configure(configure))
}

/// Doubles with a signed-in user of `role` already resolvable.
pub fn signed_in(role: Role) -> (TestPorts, User) {
    let caller = crate::test_support::user(role);
    let mut ports = TestPorts::default();
    ports.signed_in_as(&caller);
    (ports, caller)
}

/// Send `request` to an app built from `ports` and `configure`, signed in
/// as `caller` when given. Non-JSON bodies decode to `Value::Null`.
pub async fn call_json(
    ports: TestPorts,
    caller: Option<&User>,
    configure: fn(&mut web::ServiceConfig),
    request: test::TestRequest,
) -> (StatusCode, Value) {
    let app = test::init_service(test_app(ports.into_state(), configure)).await;
    let request = match caller {
        Some(user) => request.cookie(session_cookie(&app, user.id()).await),
        None => request,
    };
    let res = test::call_service(&app, request.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}
