//! Buyer order handlers.
//!
//! ```text
//! GET /api/v1/orders?status=pending
//! POST /api/v1/orders {"items":[{"productId":"...","qty":2}],"deliveryOption":"PICKUP"}
//! GET /api/v1/orders/{id}
//! POST /api/v1/orders/{id}/cancel
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DeliveryOption, Error, Order, OrderLine, OrderRequest, OrderStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, page_params, parse_optional, parse_uuid};

const ORDER_ID: FieldName = FieldName::new("id");

/// Body for `POST /orders`. Every line must come from the same seller.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub items: Vec<OrderLine>,
    pub delivery_option: DeliveryOption,
    pub delivery_district: Option<String>,
    pub delivery_address: Option<String>,
}

impl From<PlaceOrderBody> for OrderRequest {
    fn from(body: PlaceOrderBody) -> Self {
        Self {
            items: body.items,
            delivery_option: body.delivery_option,
            delivery_district: body.delivery_district,
            delivery_address: body.delivery_address,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct OrderListQuery {
    /// `pending`, `confirmed`, `packed`, `dispatched`, `delivered`, or
    /// `cancelled`.
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Orders placed by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Caller's orders", body = Paginated<Order>),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 403, description = "Role cannot buy", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listMyOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<OrderListQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let page = page_params(query.page, query.page_size)?;
    let status = parse_optional(
        query.status.as_deref(),
        FieldName::new("status"),
        OrderStatus::parse,
    )?;
    let orders = state.orders_query.list_mine(&actor, status, page).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(orders.with_links(&req.full_url())))
}

/// Place a single-seller order, reserving stock.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = PlaceOrderBody,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid items or delivery details", body = Error),
        (status = 403, description = "Role cannot buy", body = Error),
        (status = 409, description = "Insufficient stock", body = Error)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PlaceOrderBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let order = state
        .orders
        .place(&actor, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Not the buyer or seller", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, ORDER_ID)?;
    let order = state.orders_query.get(&actor, id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(order))
}

/// Cancel a pending or confirmed order and restock its items.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Cancelled order", body = Order),
        (status = 403, description = "Not the buyer or seller", body = Error),
        (status = 409, description = "Order already packed or later", body = Error)
    ),
    tags = ["orders"],
    operation_id = "cancelOrder"
)]
#[post("/orders/{id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Order>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, ORDER_ID)?;
    Ok(web::Json(state.orders.cancel(&actor, id).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::domain::ports::MockOrdersCommand;
    use crate::domain::{DeliveryOption, Error, Role};
    use crate::inbound::http::test_utils::{api_app, memory_state, register};

    #[actix_web::test]
    async fn place_forwards_lines_and_delivery() {
        let (_, mut state) = memory_state();
        let product_id = Uuid::new_v4();
        let mut orders = MockOrdersCommand::new();
        orders
            .expect_place()
            .withf(move |_, request| {
                request.items.len() == 1
                    && request.items[0].product_id == product_id
                    && request.items[0].qty == 2
                    && request.delivery_option == DeliveryOption::Delivery
            })
            .times(1)
            .returning(|_, _| Err(Error::conflict("insufficient stock")));
        state.orders = Arc::new(orders);
        let app = test::init_service(api_app(state)).await;
        let (buyer, _) = register(&app, Role::Owner, "Amina Nakato").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/orders")
                .cookie(buyer)
                .set_json(json!({
                    "items": [{"productId": product_id, "qty": 2}],
                    "deliveryOption": "DELIVERY",
                    "deliveryDistrict": "Mbarara",
                    "deliveryAddress": "Plot 4, High Street",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn vets_cannot_buy() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (vet, _) = register(&app, Role::Vet, "Dr Grace Atim").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/orders")
                .cookie(vet)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn new_buyers_see_an_empty_page() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (buyer, _) = register(&app, Role::Owner, "Amina Nakato").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/orders?status=pending")
                .cookie(buyer)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["data"], json!([]));
    }
}
