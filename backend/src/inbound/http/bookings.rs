//! Appointment handlers.
//!
//! ```text
//! GET /api/v1/bookings?status=REQUESTED&page=1
//! POST /api/v1/bookings {"vetId":"...","visitType":"CLINIC","scheduledAt":"2026-05-01T09:00:00Z"}
//! GET /api/v1/bookings/{id}
//! PATCH /api/v1/bookings/{id}/status {"status":"CONFIRMED"}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{Booking, BookingStatus, Error, NewBooking, VisitType};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_params, parse_optional, parse_required, parse_rfc3339_timestamp, parse_user_id,
    parse_uuid,
};

const BOOKING_ID: FieldName = FieldName::new("id");
const STATUS: FieldName = FieldName::new("status");

/// Body for `POST /bookings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    pub vet_id: String,
    /// Optional case the visit is about; must be one of the caller's cases.
    pub case_id: Option<Uuid>,
    pub visit_type: VisitType,
    /// RFC 3339 timestamp.
    #[schema(example = "2026-05-01T09:00:00Z")]
    pub scheduled_at: String,
    pub notes: Option<String>,
}

impl TryFrom<CreateBookingBody> for NewBooking {
    type Error = Error;

    fn try_from(body: CreateBookingBody) -> Result<Self, Self::Error> {
        Ok(Self {
            vet_id: parse_user_id(&body.vet_id, FieldName::new("vetId"))?,
            case_id: body.case_id,
            visit_type: body.visit_type,
            scheduled_at: parse_rfc3339_timestamp(
                &body.scheduled_at,
                FieldName::new("scheduledAt"),
            )?,
            notes: body.notes,
        })
    }
}

/// Body for `PATCH /bookings/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusBody {
    #[schema(example = "CONFIRMED")]
    pub status: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct BookingListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Bookings the caller takes part in, newest appointment first.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    params(BookingListQuery),
    responses(
        (status = 200, description = "Bookings", body = Paginated<Booking>),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 403, description = "Sellers have no bookings", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "listBookings"
)]
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<BookingListQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let page = page_params(query.page, query.page_size)?;
    let status = parse_optional(query.status.as_deref(), STATUS, BookingStatus::parse)?;
    let bookings = state.bookings_query.list(&actor, status, page).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(bookings.with_links(&req.full_url())))
}

/// Request an appointment with an approved vet.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingBody,
    responses(
        (status = 201, description = "Booking requested", body = Booking),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not a livestock owner", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "createBooking"
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateBookingBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let input = NewBooking::try_from(payload.into_inner())?;
    let booking = state.bookings.create(&actor, input).await?;
    Ok(HttpResponse::Created().json(booking))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "getBooking"
)]
#[get("/bookings/{id}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, BOOKING_ID)?;
    let booking = state.bookings_query.get(&actor, id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(booking))
}

/// Move a booking through its lifecycle.
///
/// The vet confirms, declines, starts, and completes. The owner may only
/// cancel, and only while the booking is requested or confirmed.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/status",
    params(("id" = String, Path, description = "Booking id")),
    request_body = BookingStatusBody,
    responses(
        (status = 200, description = "Updated booking", body = Booking),
        (status = 400, description = "Unknown status", body = Error),
        (status = 403, description = "Transition not permitted for caller", body = Error),
        (status = 409, description = "Transition not allowed from current status", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "updateBookingStatus"
)]
#[patch("/bookings/{id}/status")]
pub async fn update_booking_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<BookingStatusBody>,
) -> ApiResult<web::Json<Booking>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, BOOKING_ID)?;
    let status = parse_required(&payload.status, STATUS, BookingStatus::parse)?;
    let booking = state.bookings.update_status(&actor, id, status).await?;
    Ok(web::Json(booking))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::domain::ports::MockBookingsCommand;
    use crate::domain::{BookingStatus, Role};
    use crate::inbound::http::test_utils::{api_app, memory_state, register};

    #[actix_web::test]
    async fn scheduled_at_must_be_rfc3339() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (owner, _) = register(&app, Role::Owner, "Amina Nakato").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/bookings")
                .cookie(owner)
                .set_json(json!({
                    "vetId": Uuid::new_v4(),
                    "visitType": "CLINIC",
                    "scheduledAt": "next tuesday",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "scheduledAt");
    }

    #[actix_web::test]
    async fn status_updates_parse_case_insensitively() {
        let (_, mut state) = memory_state();
        let mut bookings = MockBookingsCommand::new();
        bookings
            .expect_update_status()
            .withf(|_, _, status| *status == BookingStatus::Cancelled)
            .times(1)
            .returning(|_, _, _| Err(crate::domain::Error::conflict("already completed")));
        state.bookings = Arc::new(bookings);
        let app = test::init_service(api_app(state)).await;
        let (owner, _) = register(&app, Role::Owner, "Amina Nakato").await;

        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/bookings/{}/status", Uuid::new_v4()))
                .cookie(owner)
                .set_json(json!({"status": "cancelled"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn sellers_have_no_bookings() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (seller, _) = register(&app, Role::Seller, "Brian Okello").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/bookings")
                .cookie(seller)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
