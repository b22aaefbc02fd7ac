//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates, so each file pulls this
//! module in with `mod support;` and drives the public API over an in-memory
//! store.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use anilink::Trace;
use anilink::domain::ports::{
    PasswordResetNotifier, PasswordResetNotifierError, StoredUser, UserRepository,
};
use anilink::domain::{
    EmailAddress, Password, PasswordDigest, PersonName, ResetToken, Role, User, UserId,
    UserProfile,
};
use anilink::inbound::http::error::{json_error_handler, path_error_handler, query_error_handler};
use anilink::inbound::http::state::{HttpState, ServiceOptions};
use anilink::outbound::memory::InMemoryStore;

pub const PASSWORD: &str = "correct horse battery";

/// Email derived from a display name, e.g. `Ruth Vet` -> `ruth.vet@example.com`.
pub fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase().replace(' ', "."))
}

/// Captures reset tokens instead of delivering them.
#[derive(Default)]
pub struct CapturingNotifier {
    tokens: Mutex<Vec<(String, String)>>,
}

impl CapturingNotifier {
    /// The most recent token sent to `email`.
    pub fn token_for(&self, email: &str) -> Option<String> {
        self.tokens
            .lock()
            .expect("notifier lock")
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }

    pub fn sent(&self) -> usize {
        self.tokens.lock().expect("notifier lock").len()
    }
}

#[async_trait]
impl PasswordResetNotifier for CapturingNotifier {
    async fn deliver(
        &self,
        user: &User,
        token: &ResetToken,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), PasswordResetNotifierError> {
        self.tokens
            .lock()
            .expect("notifier lock")
            .push((user.email.as_ref().to_owned(), token.expose().to_owned()));
        Ok(())
    }
}

/// A store, the state wired over it, and the reset notifier it uses.
pub struct Harness {
    pub store: InMemoryStore,
    pub state: HttpState,
    pub notifier: Arc<CapturingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let notifier = Arc::new(CapturingNotifier::default());
        let options = ServiceOptions {
            reset_notifier: notifier.clone(),
            ..ServiceOptions::default()
        };
        let state = HttpState::from_repositories(&store, options);
        Self {
            store,
            state,
            notifier,
        }
    }
}

/// The `/api/v1` surface wrapped the way the server wraps it.
pub fn app(
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
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(session)
                .configure(anilink::inbound::http::configure),
        )
}

pub fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Send a JSON request and return the status, the body (`Null` when empty),
/// and any refreshed session cookie.
pub async fn call<S>(
    app: &S,
    req: test::TestRequest,
    cookie: Option<&Cookie<'static>>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<Cookie<'static>>)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut req = req;
    if let Some(cookie) = cookie {
        req = req.cookie(cookie.clone());
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let cookie = session_cookie(&res);
    let bytes = test::read_body(res).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value, cookie)
}

/// Register through the API and return the session cookie and created user.
pub async fn register<S>(app: &S, role: Role, name: &str) -> (Cookie<'static>, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body, cookie) = call(
        app,
        test::TestRequest::post().uri("/api/v1/auth/register"),
        None,
        Some(json!({
            "name": name,
            "email": email_for(name),
            "password": PASSWORD,
            "role": role.as_str(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    (cookie.expect("session cookie"), body)
}

/// Sign in and return the session cookie.
pub async fn login<S>(app: &S, email: &str, password: &str) -> (StatusCode, Option<Cookie<'static>>)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, _, cookie) = call(
        app,
        test::TestRequest::post().uri("/api/v1/auth/login"),
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    (status, cookie)
}

/// Insert an administrator directly, since admins cannot self-register.
pub async fn seed_admin(store: &InMemoryStore, name: &str) -> User {
    let user = User {
        id: UserId::random(),
        name: PersonName::new(name).expect("valid name"),
        email: EmailAddress::new(email_for(name)).expect("valid email"),
        phone: None,
        role: Role::Admin,
        is_active: true,
        created_at: Utc::now(),
    };
    let password = Password::new(PASSWORD).expect("valid password");
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

/// Titles of the caller's notifications, newest first.
pub async fn notification_titles<S>(app: &S, cookie: &Cookie<'static>) -> Vec<String>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body, _) = call(
        app,
        test::TestRequest::get().uri("/api/v1/notifications"),
        Some(cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "feed failed: {body}");
    body["data"]
        .as_array()
        .expect("feed items")
        .iter()
        .filter_map(|item| item["title"].as_str().map(str::to_owned))
        .collect()
}
