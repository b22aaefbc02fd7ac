//! Administrator endpoints.
//!
//! Every route requires an `ADMIN` session.
//!
//! ```text
//! GET /api/v1/admin/stats?days=30
//! GET /api/v1/admin/reports/overview?from=2026-04-01&to=2026-04-30
//! GET /api/v1/admin/users?search=...&role=VET&status=active
//! PATCH /api/v1/admin/users/{id} {"isActive":false}
//! GET /api/v1/admin/vets?status=PENDING
//! POST /api/v1/admin/vets/{id}/approve
//! POST /api/v1/admin/vets/{id}/reject {"reason":"..."}
//! GET /api/v1/admin/products?flagged=true
//! PATCH /api/v1/admin/products/{id} {"verified":true}
//! GET|PUT /api/v1/admin/settings
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, get, patch, post, put, web};
use chrono::NaiveDate;
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, PlatformSettings, PlatformStats, Product, ProductAdminFilter, ProductModeration,
    ReportsOverview, Role, User, UserAdminFilter, UserAdminUpdate, VetProfile, VetStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_params, parse_optional, parse_user_id, parse_uuid,
};

const ID: FieldName = FieldName::new("id");

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Reporting window in days, 1 to 365. Defaults to 30.
    pub days: Option<u32>,
}

/// Report range as `YYYY-MM-DD` UTC days, both inclusive.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportsQuery {
    /// Defaults to 30 days before today. Also accepted as `start`.
    #[serde(alias = "start")]
    pub from: Option<NaiveDate>,
    /// Defaults to today. Also accepted as `end`.
    #[serde(alias = "end")]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct UserListQuery {
    /// Matched against name, email, and phone.
    pub search: Option<String>,
    pub role: Option<String>,
    /// `active` or `inactive`.
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

fn parse_account_status(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "active" => Some(true),
        "inactive" => Some(false),
        _ => None,
    }
}

impl UserListQuery {
    fn filter(&self) -> Result<UserAdminFilter, Error> {
        Ok(UserAdminFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            role: parse_optional(self.role.as_deref(), FieldName::new("role"), |raw| {
                raw.parse::<Role>().ok()
            })?,
            is_active: parse_optional(
                self.status.as_deref(),
                FieldName::new("status"),
                parse_account_status,
            )?,
        })
    }
}

/// Body for `PATCH /admin/users/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateBody {
    pub is_active: Option<bool>,
    pub role: Option<Role>,
}

impl From<UserUpdateBody> for UserAdminUpdate {
    fn from(body: UserUpdateBody) -> Self {
        Self {
            is_active: body.is_active,
            role: body.role,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct VetListQuery {
    /// `PENDING`, `APPROVED`, or `REJECTED`.
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Body for `POST /admin/vets/{id}/reject`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RejectBody {
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProductListQuery {
    pub flagged: Option<bool>,
    pub verified: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Body for `PATCH /admin/products/{id}`. Omitted fields are left alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationBody {
    pub verified: Option<bool>,
    pub is_active: Option<bool>,
    pub is_flagged: Option<bool>,
    pub recommended: Option<bool>,
    pub admin_note: Option<String>,
}

impl From<ModerationBody> for ProductModeration {
    fn from(body: ModerationBody) -> Self {
        Self {
            verified: body.verified,
            is_active: body.is_active,
            is_flagged: body.is_flagged,
            recommended: body.recommended,
            admin_note: body.admin_note,
        }
    }
}

/// Admin analytics over a range of days.
#[utoipa::path(
    get,
    path = "/api/v1/admin/reports/overview",
    params(ReportsQuery),
    responses(
        (status = 200, description = "Orders by day, bookings by status, top sellers and products", body = ReportsOverview),
        (status = 400, description = "Range reversed or too long", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminReportsOverview"
)]
#[get("/admin/reports/overview")]
pub async fn reports_overview(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReportsQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let report = state
        .admin_query
        .reports_overview(&actor, query.from, query.to)
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(report))
}

/// Platform counters and recent activity.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Platform statistics", body = PlatformStats),
        (status = 400, description = "Window out of range", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminStats"
)]
#[get("/admin/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<StatsQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let stats = state.admin_query.stats(&actor, query.days).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(stats))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Accounts", body = Paginated<User>),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<UserListQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let page = page_params(query.page, query.page_size)?;
    let users = state
        .admin_query
        .list_users(&actor, query.filter()?, page)
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(users.with_links(&req.full_url())))
}

/// Activate, deactivate, or change the role of an account.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserUpdateBody,
    responses(
        (status = 200, description = "Updated account", body = User),
        (status = 403, description = "Not an admin, or an admin changing their own account", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateUser"
)]
#[patch("/admin/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UserUpdateBody>,
) -> ApiResult<web::Json<User>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_user_id(&path, ID)?;
    let user = state
        .admin
        .update_user(&actor, id, payload.into_inner().into())
        .await?;
    Ok(web::Json(user))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/vets",
    params(VetListQuery),
    responses(
        (status = 200, description = "Vet profiles", body = Paginated<VetProfile>),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListVets"
)]
#[get("/admin/vets")]
pub async fn list_vets(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<VetListQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let page = page_params(query.page, query.page_size)?;
    let status = parse_optional(
        query.status.as_deref(),
        FieldName::new("status"),
        VetStatus::parse,
    )?;
    let vets = state.admin_query.list_vets(&actor, status, page).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(vets.with_links(&req.full_url())))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/vets/{id}/approve",
    params(("id" = String, Path, description = "Vet user id")),
    responses(
        (status = 200, description = "Approved profile", body = VetProfile),
        (status = 404, description = "No such vet profile", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminApproveVet"
)]
#[post("/admin/vets/{id}/approve")]
pub async fn approve_vet(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<VetProfile>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_user_id(&path, ID)?;
    Ok(web::Json(state.admin.approve_vet(&actor, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/vets/{id}/reject",
    params(("id" = String, Path, description = "Vet user id")),
    request_body = RejectBody,
    responses(
        (status = 200, description = "Rejected profile", body = VetProfile),
        (status = 400, description = "Missing reason", body = Error),
        (status = 404, description = "No such vet profile", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminRejectVet"
)]
#[post("/admin/vets/{id}/reject")]
pub async fn reject_vet(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RejectBody>,
) -> ApiResult<web::Json<VetProfile>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_user_id(&path, ID)?;
    let profile = state
        .admin
        .reject_vet(&actor, id, payload.into_inner().reason)
        .await?;
    Ok(web::Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products", body = Paginated<Product>),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListProducts"
)]
#[get("/admin/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<ProductListQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let page = page_params(query.page, query.page_size)?;
    let filter = ProductAdminFilter {
        flagged: query.flagged,
        verified: query.verified,
    };
    let products = state.admin_query.list_products(&actor, filter, page).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(products.with_links(&req.full_url())))
}

/// Verify, flag, recommend, or deactivate a listing.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = ModerationBody,
    responses(
        (status = 200, description = "Moderated product", body = Product),
        (status = 404, description = "Unknown product", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminModerateProduct"
)]
#[patch("/admin/products/{id}")]
pub async fn moderate_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ModerationBody>,
) -> ApiResult<web::Json<Product>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, ID)?;
    let product = state
        .admin
        .moderate_product(&actor, id, payload.into_inner().into())
        .await?;
    Ok(web::Json(product))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/settings",
    responses(
        (status = 200, description = "Effective settings", body = PlatformSettings),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminGetSettings"
)]
#[get("/admin/settings")]
pub async fn get_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let settings = state.admin_query.settings(&actor).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(settings))
}

/// Update one or more settings. Unknown keys reject the whole request.
#[utoipa::path(
    put,
    path = "/api/v1/admin/settings",
    request_body = PlatformSettings,
    responses(
        (status = 200, description = "Effective settings", body = PlatformSettings),
        (status = 400, description = "Unknown key or invalid value", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateSettings"
)]
#[put("/admin/settings")]
pub async fn update_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BTreeMap<String, String>>,
) -> ApiResult<web::Json<PlatformSettings>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let settings = state
        .admin
        .update_settings(&actor, payload.into_inner())
        .await?;
    Ok(web::Json(settings))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
