//! Current-account handlers.
//!
//! ```text
//! GET /api/v1/users/me
//! PATCH /api/v1/users/me {"district":"Mbarara","latitude":-0.6,"longitude":30.65}
//! ```

use actix_web::{HttpResponse, get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ProfileUpdate;
use crate::domain::{Error, PersonName, PhoneNumber, UserWithProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_user_validation_error;

/// Partial update of the caller's account and profile.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub address_text: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub avatar_url: Option<String>,
}

impl TryFrom<UpdateMeBody> for ProfileUpdate {
    type Error = Error;

    fn try_from(body: UpdateMeBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: body
                .name
                .map(PersonName::new)
                .transpose()
                .map_err(map_user_validation_error)?,
            phone: body
                .phone
                .as_deref()
                .map(PhoneNumber::new)
                .transpose()
                .map_err(map_user_validation_error)?,
            district: body.district,
            region: body.region,
            address_text: body.address_text,
            latitude: body.latitude,
            longitude: body.longitude,
            avatar_url: body.avatar_url,
        })
    }
}

/// The signed-in account with its profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current account", body = UserWithProfile),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Account deactivated", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let me = state.accounts_query.me(&actor).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(me))
}

/// Update the caller's name, phone, or profile fields.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateMeBody,
    responses(
        (status = 200, description = "Updated account", body = UserWithProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Phone already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateMeBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let me = state.accounts.update_me(&actor, update).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(me))
}
