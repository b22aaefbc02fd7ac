//! Health case handlers.
//!
//! ```text
//! GET /api/v1/cases?status=SUBMITTED&animalId=...
//! POST /api/v1/cases {"animalId":"...","symptoms":["fever","not eating"]}
//! GET /api/v1/cases/{id}
//! POST /api/v1/cases/{id}/assign {"vetId":"..."}
//! POST /api/v1/cases/{id}/close
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{Case, CaseFilter, CaseStatus, Error, NewCase, SymptomsInput};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional, parse_user_id, parse_uuid};

const CASE_ID: FieldName = FieldName::new("id");

/// Body for `POST /cases`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseBody {
    /// Animal the case concerns. Must belong to the caller.
    pub animal_id: Option<Uuid>,
    /// Free-text animal type; defaults to the linked animal's species.
    pub animal_type: Option<String>,
    /// Either a list of symptoms or a comma-separated string.
    pub symptoms: SymptomsInput,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<CreateCaseBody> for NewCase {
    fn from(body: CreateCaseBody) -> Self {
        Self {
            animal_id: body.animal_id,
            animal_type: body.animal_type,
            symptoms: body.symptoms,
            notes: body.notes,
            location: body.location,
            district: body.district,
            latitude: body.latitude,
            longitude: body.longitude,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignVetBody {
    pub vet_id: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CaseListQuery {
    pub animal_id: Option<String>,
    /// `SUBMITTED`, `UNDER_REVIEW`, or `CLOSED`.
    pub status: Option<String>,
}

/// Cases visible to the caller: their own as an owner, assigned ones as a
/// vet, every case as an admin.
#[utoipa::path(
    get,
    path = "/api/v1/cases",
    params(CaseListQuery),
    responses(
        (status = 200, description = "Visible cases, newest first", body = [Case]),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["cases"],
    operation_id = "listCases"
)]
#[get("/cases")]
pub async fn list_cases(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CaseListQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let query = query.into_inner();
    let filter = CaseFilter {
        animal_id: query
            .animal_id
            .as_deref()
            .map(|raw| parse_uuid(raw, FieldName::new("animalId")))
            .transpose()?,
        status: parse_optional(
            query.status.as_deref(),
            FieldName::new("status"),
            CaseStatus::parse,
        )?,
    };
    let cases = state.cases_query.list(&actor, filter).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(cases))
}

#[utoipa::path(
    post,
    path = "/api/v1/cases",
    request_body = CreateCaseBody,
    responses(
        (status = 201, description = "Case opened", body = Case),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not a livestock owner", body = Error)
    ),
    tags = ["cases"],
    operation_id = "createCase"
)]
#[post("/cases")]
pub async fn create_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCaseBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let case = state
        .cases
        .create(&actor, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(case))
}

#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}",
    params(("id" = String, Path, description = "Case id")),
    responses(
        (status = 200, description = "Case", body = Case),
        (status = 403, description = "Not visible to the caller", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["cases"],
    operation_id = "getCase"
)]
#[get("/cases/{id}")]
pub async fn get_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, CASE_ID)?;
    let case = state.cases_query.get(&actor, id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(case))
}

/// Assign an approved vet. The case moves to `UNDER_REVIEW`.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/assign",
    params(("id" = String, Path, description = "Case id")),
    request_body = AssignVetBody,
    responses(
        (status = 200, description = "Vet assigned", body = Case),
        (status = 400, description = "Vet is not approved", body = Error),
        (status = 403, description = "Not the owner or an admin", body = Error),
        (status = 409, description = "Case is closed", body = Error)
    ),
    tags = ["cases"],
    operation_id = "assignCaseVet"
)]
#[post("/cases/{id}/assign")]
pub async fn assign_vet(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AssignVetBody>,
) -> ApiResult<web::Json<Case>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, CASE_ID)?;
    let vet_id = parse_user_id(&payload.vet_id, FieldName::new("vetId"))?;
    let case = state.cases.assign_vet(&actor, id, vet_id).await?;
    Ok(web::Json(case))
}

#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/close",
    params(("id" = String, Path, description = "Case id")),
    responses(
        (status = 200, description = "Case closed", body = Case),
        (status = 403, description = "Not permitted to close", body = Error),
        (status = 409, description = "Already closed", body = Error)
    ),
    tags = ["cases"],
    operation_id = "closeCase"
)]
#[post("/cases/{id}/close")]
pub async fn close_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Case>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, CASE_ID)?;
    Ok(web::Json(state.cases.close(&actor, id).await?))
}
