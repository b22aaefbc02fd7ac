//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: persisting the signed-in user, resolving the
//! calling [`Actor`], and reading or writing the shopping cart that travels in
//! the same cookie.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::AccountsQuery;
use crate::domain::{Actor, Cart, Error, ErrorCode, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const CART_KEY: &str = "cart";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop every session value, signing the user out.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Resolve the signed-in account into an [`Actor`].
    ///
    /// Sessions pointing at accounts that no longer exist are purged so the
    /// stale cookie is not replayed.
    pub async fn require_actor(&self, accounts: &dyn AccountsQuery) -> Result<Actor, Error> {
        let user_id = self.require_user_id()?;
        let resolved = accounts.resolve_actor(&user_id).await;
        if let Err(error) = &resolved
            && error.code() == ErrorCode::Unauthorized
        {
            self.purge();
        }
        resolved
    }

    /// The cart stored in the session. A missing or unreadable cart is empty.
    pub fn cart(&self) -> Cart {
        let stored = match self.0.get::<String>(CART_KEY) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(error) => {
                warn!(%error, "discarding unreadable cart in session");
                return Cart::default();
            }
        };
        stored.parse().unwrap_or_else(|error| {
            warn!(%error, "discarding unreadable cart in session");
            Cart::default()
        })
    }

    /// Replace the stored cart. Empty carts are removed from the cookie.
    pub fn save_cart(&self, cart: &Cart) -> Result<(), Error> {
        if cart.is_empty() {
            self.0.remove(CART_KEY);
            return Ok(());
        }
        self.0
            .insert(CART_KEY, cart.to_string())
            .map_err(|error| Error::internal(format!("failed to persist cart: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
