//! Session cart handlers.
//!
//! The cart lives in the session cookie, so browsing and filling it does not
//! require an account. Checkout does.
//!
//! ```text
//! GET|DELETE /api/v1/cart
//! POST /api/v1/cart/items {"productId":"...","qty":2}
//! PUT /api/v1/cart/items/{productId} {"qty":5}
//! DELETE /api/v1/cart/items/{productId}
//! POST /api/v1/cart/checkout {"deliveryOption":"PICKUP"}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::CheckoutRequest;
use crate::domain::{Cart, CartView, DeliveryOption, Error, Order};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const PRODUCT_ID: FieldName = FieldName::new("productId");

fn default_qty() -> i32 {
    1
}

/// Body for `POST /cart/items`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemBody {
    pub product_id: Uuid,
    /// Defaults to 1. Merged with any quantity already in the cart.
    #[serde(default = "default_qty")]
    pub qty: i32,
}

/// Body for `PUT /cart/items/{productId}`. Zero removes the line.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SetQtyBody {
    pub qty: i32,
}

/// Body for `POST /cart/checkout`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub delivery_option: DeliveryOption,
    pub delivery_district: Option<String>,
    pub delivery_address: Option<String>,
}

impl From<CheckoutBody> for CheckoutRequest {
    fn from(body: CheckoutBody) -> Self {
        Self {
            delivery_option: body.delivery_option,
            delivery_district: body.delivery_district,
            delivery_address: body.delivery_address,
        }
    }
}

async fn priced(state: &HttpState, cart: &Cart) -> ApiResult<HttpResponse> {
    let view = state.orders_query.price_cart(cart).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(view))
}

/// The cart priced against current listings.
///
/// Lines whose product is no longer visible are reported in `unavailable`.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses((status = 200, description = "Priced cart", body = CartView)),
    tags = ["cart"],
    operation_id = "getCart",
    security([])
)]
#[get("/cart")]
pub async fn get_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    priced(&state, &session.cart()).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    responses((status = 200, description = "Emptied cart", body = CartView)),
    tags = ["cart"],
    operation_id = "clearCart",
    security([])
)]
#[delete("/cart")]
pub async fn clear_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let mut cart = session.cart();
    cart.clear();
    session.save_cart(&cart)?;
    priced(&state, &cart).await
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddItemBody,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 400, description = "Quantity out of range or cart full", body = Error),
        (status = 404, description = "Unknown or hidden product", body = Error)
    ),
    tags = ["cart"],
    operation_id = "addCartItem",
    security([])
)]
#[post("/cart/items")]
pub async fn add_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddItemBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    state.marketplace.get(body.product_id).await?;
    let mut cart = session.cart();
    cart.add(body.product_id, body.qty)?;
    session.save_cart(&cart)?;
    priced(&state, &cart).await
}

#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{productId}",
    params(("productId" = String, Path, description = "Product id")),
    request_body = SetQtyBody,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 400, description = "Quantity out of range", body = Error),
        (status = 404, description = "Product not in cart", body = Error)
    ),
    tags = ["cart"],
    operation_id = "setCartItemQty",
    security([])
)]
#[put("/cart/items/{product_id}")]
pub async fn set_item_qty(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SetQtyBody>,
) -> ApiResult<HttpResponse> {
    let product_id = parse_uuid(&path, PRODUCT_ID)?;
    let mut cart = session.cart();
    cart.set_qty(product_id, payload.qty)?;
    session.save_cart(&cart)?;
    priced(&state, &cart).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{productId}",
    params(("productId" = String, Path, description = "Product id")),
    responses((status = 200, description = "Updated cart", body = CartView)),
    tags = ["cart"],
    operation_id = "removeCartItem",
    security([])
)]
#[delete("/cart/items/{product_id}")]
pub async fn remove_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let product_id = parse_uuid(&path, PRODUCT_ID)?;
    let mut cart = session.cart();
    cart.remove(product_id);
    session.save_cart(&cart)?;
    priced(&state, &cart).await
}

/// Place one order per seller for the cart's lines and empty the cart.
///
/// If any order fails, the ones already placed are cancelled and the cart is
/// left untouched.
#[utoipa::path(
    post,
    path = "/api/v1/cart/checkout",
    request_body = CheckoutBody,
    responses(
        (status = 201, description = "Orders placed", body = [Order]),
        (status = 400, description = "Empty cart or unavailable products", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Insufficient stock", body = Error)
    ),
    tags = ["cart"],
    operation_id = "checkout"
)]
#[post("/cart/checkout")]
pub async fn checkout(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CheckoutBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let orders = state
        .orders
        .checkout(&actor, session.cart(), payload.into_inner().into())
        .await?;
    session.save_cart(&Cart::default())?;
    info!(buyer_id = %actor.user_id, orders = orders.len(), "cart checked out");
    Ok(HttpResponse::Created().json(orders))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::Utc;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::domain::ports::MockMarketplaceQuery;
    use crate::domain::{Product, ProductCategory, Role, UserId};
    use crate::inbound::http::test_utils::{api_app, memory_state, register, session_cookie};

    fn listed(id: Uuid) -> Product {
        let now = Utc::now();
        Product {
            id,
            seller_id: UserId::random(),
            category: ProductCategory::Feed,
            title: "Dairy meal 50kg".into(),
            description: None,
            price: 95_000,
            currency: "UGX".into(),
            stock_qty: 10,
            latitude: None,
            longitude: None,
            district: None,
            is_active: true,
            verified: true,
            recommended: false,
            is_flagged: false,
            admin_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn anonymous_carts_survive_in_the_cookie() {
        let (_, mut state) = memory_state();
        let mut marketplace = MockMarketplaceQuery::new();
        marketplace
            .expect_get()
            .returning(|id| Ok(listed(id)));
        state.marketplace = Arc::new(marketplace);
        let app = test::init_service(api_app(state)).await;
        let product_id = Uuid::new_v4();

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/cart/items")
                .set_json(json!({"productId": product_id, "qty": 2}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/cart/items")
                .cookie(cookie)
                .set_json(json!({"productId": product_id}))
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&res);

        // The product is unknown to the store, so pricing reports it unavailable.
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["unavailable"][0]["qty"], 3);

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/cart/items/{product_id}"))
                .cookie(cookie)
                .set_json(json!({"qty": 0}))
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["unavailable"], json!([]));
        assert_eq!(body["total"], 0);
    }

    #[actix_web::test]
    async fn hidden_products_cannot_be_added() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/cart/items")
                .set_json(json!({"productId": Uuid::new_v4()}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn checkout_requires_login() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/cart/checkout")
                .set_json(json!({"deliveryOption": "PICKUP"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn empty_carts_cannot_be_checked_out() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (buyer, _) = register(&app, Role::Owner, "Amina Nakato").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/cart/checkout")
                .cookie(buyer)
                .set_json(json!({"deliveryOption": "PICKUP"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "empty");
    }
}
