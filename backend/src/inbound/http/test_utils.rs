//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use crate::domain::ports::UserRepository;
use crate::domain::ports::StoredUser;
use crate::domain::{
    EmailAddress, Password, PasswordDigest, PersonName, Role, User, UserId, UserProfile,
};
use crate::inbound::http::state::{HttpState, ServiceOptions};
use crate::outbound::memory::InMemoryStore;

/// Password used by every account created through these helpers.
pub const PASSWORD: &str = "correct horse battery";

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

/// The session cookie set on `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// State wired over a fresh in-memory store.
pub fn memory_state() -> (InMemoryStore, HttpState) {
    let store = InMemoryStore::new();
    let state = HttpState::from_repositories(&store, ServiceOptions::default());
    (store, state)
}

/// Application exposing every `/api/v1` route over `state`.
pub fn api_app(
    state: HttpState,
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
        .app_data(web::JsonConfig::default().error_handler(super::error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(super::error::query_error_handler))
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(super::configure),
        )
}

/// Register an account through the API and return its session cookie and
/// the response body.
pub async fn register<S>(app: &S, role: Role, name: &str) -> (Cookie<'static>, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let slug = name.to_lowercase().replace(' ', ".");
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": name,
            "email": format!("{slug}@example.com"),
            "password": PASSWORD,
            "role": role.as_str(),
        }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "registration failed: {}", res.status());
    let cookie = session_cookie(&res);
    let body: Value = test::read_body_json(res).await;
    (cookie, body)
}

/// Insert an administrator directly, since admins cannot self-register.
pub async fn seed_admin(store: &InMemoryStore, name: &str) -> User {
    let slug = name.to_lowercase().replace(' ', ".");
    let password = Password::new(PASSWORD).expect("valid password");
    let user = User {
        id: UserId::random(),
        name: PersonName::new(name).expect("valid name"),
        email: EmailAddress::new(format!("{slug}@example.com")).expect("valid email"),
        phone: None,
        role: Role::Admin,
        is_active: true,
        created_at: chrono::Utc::now(),
    };
    let stored = StoredUser {
        user: user.clone(),
        password: PasswordDigest::hash(&password).expect("hash password"),
    };
    store
        .create(&stored, &UserProfile::default())
        .await
        .expect("seed admin");
    user
}

/// Sign in with the shared test password.
pub async fn login<S>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    session_cookie(&res)
}
