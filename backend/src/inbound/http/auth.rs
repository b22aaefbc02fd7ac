//! Registration, login, logout, and password reset handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Amina Nakato","email":"amina@example.com","password":"..."}
//! POST /api/v1/auth/login {"email":"amina@example.com","password":"..."}
//! POST /api/v1/auth/logout
//! POST /api/v1/auth/password-reset/request {"email":"amina@example.com"}
//! POST /api/v1/auth/password-reset/verify {"token":"..."}
//! POST /api/v1/auth/password-reset/confirm {"token":"...","password":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::RegisterRequest;
use crate::domain::{
    EmailAddress, Error, LoginCredentials, Password, PersonName, PhoneNumber, ResetToken, Role,
    User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_credential_error, map_user_validation_error};

/// Body for `POST /auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[schema(example = "Amina Nakato")]
    pub name: String,
    #[schema(example = "amina@example.com")]
    pub email: String,
    #[schema(example = "+256700000001")]
    pub phone: Option<String>,
    pub password: String,
    /// Defaults to `OWNER`. `ADMIN` cannot be self-registered.
    pub role: Option<Role>,
}

impl TryFrom<RegisterBody> for RegisterRequest {
    type Error = Error;

    fn try_from(body: RegisterBody) -> Result<Self, Self::Error> {
        let phone = body
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(PhoneNumber::new)
            .transpose()
            .map_err(map_user_validation_error)?;
        Ok(Self {
            name: PersonName::new(body.name).map_err(map_user_validation_error)?,
            email: EmailAddress::new(&body.email).map_err(map_user_validation_error)?,
            phone,
            password: Password::new(&body.password).map_err(map_credential_error)?,
            role: body.role,
        })
    }
}

/// Body for `POST /auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[schema(example = "amina@example.com")]
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/password-reset/request`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequestBody {
    pub email: String,
}

/// Body for `POST /auth/password-reset/verify`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetVerifyBody {
    pub token: String,
}

/// Whether a reset token can still be redeemed.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetVerifyResponse {
    pub valid: bool,
}

/// Body for `POST /auth/password-reset/confirm`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetConfirmBody {
    pub token: String,
    pub password: String,
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Role cannot be self-registered", body = Error),
        (status = 409, description = "Email or phone already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let request = RegisterRequest::try_from(payload.into_inner())?;
    let user = state.accounts.register(request).await?;
    session.persist_user(&user.id)?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Account deactivated", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<User>> {
    let body = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&body.email, &body.password).map_err(map_credential_error)?;
    let user = state.accounts.login(credentials).await?;
    session.persist_user(&user.id)?;
    info!(user_id = %user.id, "signed in");
    Ok(web::Json(user))
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Ask for a password reset token.
///
/// The response is the same whether or not the email belongs to an account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/request",
    request_body = ResetRequestBody,
    responses(
        (status = 202, description = "Request accepted"),
        (status = 400, description = "Invalid email", body = Error)
    ),
    tags = ["auth"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/auth/password-reset/request")]
pub async fn request_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<ResetRequestBody>,
) -> ApiResult<HttpResponse> {
    let email = EmailAddress::new(&payload.email).map_err(map_user_validation_error)?;
    state.accounts.request_password_reset(email).await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Check a reset token without using it up.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/verify",
    request_body = ResetVerifyBody,
    responses(
        (status = 200, description = "Token status", body = ResetVerifyResponse)
    ),
    tags = ["auth"],
    operation_id = "verifyPasswordReset",
    security([])
)]
#[post("/auth/password-reset/verify")]
pub async fn verify_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<ResetVerifyBody>,
) -> ApiResult<web::Json<ResetVerifyResponse>> {
    let valid = state
        .accounts_query
        .verify_password_reset(ResetToken::from_client(&payload.token))
        .await?;
    Ok(web::Json(ResetVerifyResponse { valid }))
}

/// Redeem a reset token and set a new password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/confirm",
    request_body = ResetConfirmBody,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Invalid, used, or expired token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "confirmPasswordReset",
    security([])
)]
#[post("/auth/password-reset/confirm")]
pub async fn confirm_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<ResetConfirmBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let password = Password::new(&body.password).map_err(map_credential_error)?;
    state
        .accounts
        .confirm_password_reset(ResetToken::from_client(&body.token), password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
