//! Vet directory and vet workspace handlers.
//!
//! ```text
//! GET /api/v1/vets?q=dairy&district=Mbarara&latitude=-0.6&longitude=30.6&radiusKm=25
//! GET /api/v1/vets/{id}
//! GET /api/v1/vets/{id}/availability
//! GET|PUT /api/v1/vets/me
//! PUT /api/v1/vets/me/availability
//! ```

use actix_web::{HttpRequest, HttpResponse, get, put, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Availability, Error, VetListing, VetProfile, VetProfileInput, VetSearch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, page_params, parse_user_id, proximity};

const VET_ID: FieldName = FieldName::new("id");

/// Directory search parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct VetSearchQuery {
    /// Matches vet name, clinic, or specialisation.
    pub q: Option<String>,
    pub district: Option<String>,
    pub specialization: Option<String>,
    pub farm_visits: Option<bool>,
    pub is_24x7: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Requires `latitude` and `longitude`.
    pub radius_km: Option<f64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Body for `PUT /vets/me`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VetProfileBody {
    #[schema(example = "Mbarara Animal Clinic")]
    pub clinic_name: String,
    #[schema(example = "UVB-2291")]
    pub license_number: String,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub is_24x7: bool,
    #[serde(default)]
    pub farm_visits: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub district: Option<String>,
}

impl From<VetProfileBody> for VetProfileInput {
    fn from(body: VetProfileBody) -> Self {
        Self {
            clinic_name: body.clinic_name,
            license_number: body.license_number,
            specializations: body.specializations,
            services: body.services,
            is_24x7: body.is_24x7,
            farm_visits: body.farm_visits,
            latitude: body.latitude,
            longitude: body.longitude,
            address: body.address,
            district: body.district,
        }
    }
}

/// Search approved vets. With an origin, results are ordered by distance.
#[utoipa::path(
    get,
    path = "/api/v1/vets",
    params(VetSearchQuery),
    responses(
        (status = 200, description = "Matching vets", body = Paginated<VetListing>),
        (status = 400, description = "Invalid search parameters", body = Error)
    ),
    tags = ["vets"],
    operation_id = "searchVets",
    security([])
)]
#[get("/vets")]
pub async fn search_vets(
    state: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<VetSearchQuery>,
) -> ApiResult<web::Json<Paginated<VetListing>>> {
    let query = query.into_inner();
    let page = page_params(query.page, query.page_size)?;
    let search = VetSearch {
        query: query.q,
        district: query.district,
        specialization: query.specialization,
        farm_visits: query.farm_visits,
        is_24x7: query.is_24x7,
        proximity: proximity(query.latitude, query.longitude, query.radius_km)?,
    };
    let results = state.vets_query.search(search, page).await?;
    Ok(web::Json(results.with_links(&req.full_url())))
}

/// The caller's own vet profile, whatever its review status.
#[utoipa::path(
    get,
    path = "/api/v1/vets/me",
    responses(
        (status = 200, description = "Own profile", body = VetProfile),
        (status = 403, description = "Not a vet", body = Error),
        (status = 404, description = "No profile yet", body = Error)
    ),
    tags = ["vets"],
    operation_id = "myVetProfile"
)]
#[get("/vets/me")]
pub async fn my_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let profile = state.vets_query.my_profile(&actor).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(profile))
}

/// Create or update the caller's vet profile.
///
/// New profiles start `PENDING`. Changing the licence number of an approved
/// profile sends it back for review.
#[utoipa::path(
    put,
    path = "/api/v1/vets/me",
    request_body = VetProfileBody,
    responses(
        (status = 200, description = "Saved profile", body = VetProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not a vet", body = Error)
    ),
    tags = ["vets"],
    operation_id = "upsertVetProfile"
)]
#[put("/vets/me")]
pub async fn upsert_my_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VetProfileBody>,
) -> ApiResult<web::Json<VetProfile>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let profile = state
        .vets
        .upsert_my_profile(&actor, payload.into_inner().into())
        .await?;
    Ok(web::Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/v1/vets/me/availability",
    request_body = Availability,
    responses(
        (status = 200, description = "Saved availability", body = Availability),
        (status = 400, description = "Invalid schedule", body = Error),
        (status = 403, description = "Not a vet", body = Error),
        (status = 409, description = "No vet profile yet", body = Error)
    ),
    tags = ["vets"],
    operation_id = "setVetAvailability"
)]
#[put("/vets/me/availability")]
pub async fn set_my_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Availability>,
) -> ApiResult<web::Json<Availability>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let saved = state
        .vets
        .set_availability(&actor, payload.into_inner())
        .await?;
    Ok(web::Json(saved))
}

/// Public profile of an approved vet.
#[utoipa::path(
    get,
    path = "/api/v1/vets/{id}",
    params(("id" = String, Path, description = "Vet user id")),
    responses(
        (status = 200, description = "Vet profile", body = VetProfile),
        (status = 404, description = "Unknown or unapproved vet", body = Error)
    ),
    tags = ["vets"],
    operation_id = "getVet",
    security([])
)]
#[get("/vets/{id}")]
pub async fn get_vet(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<VetProfile>> {
    let vet_id = parse_user_id(&path, VET_ID)?;
    Ok(web::Json(state.vets_query.get(vet_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/vets/{id}/availability",
    params(("id" = String, Path, description = "Vet user id")),
    responses(
        (status = 200, description = "Weekly availability", body = Availability),
        (status = 404, description = "Unknown or unapproved vet", body = Error)
    ),
    tags = ["vets"],
    operation_id = "getVetAvailability",
    security([])
)]
#[get("/vets/{id}/availability")]
pub async fn get_vet_availability(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Availability>> {
    let vet_id = parse_user_id(&path, VET_ID)?;
    Ok(web::Json(state.vets_query.availability(vet_id).await?))
}
