//! Seller workspace: listings, storefront profile, dashboard, and incoming
//! orders.
//!
//! ```text
//! GET|POST /api/v1/seller/products
//! PATCH|DELETE /api/v1/seller/products/{id}
//! GET|PUT /api/v1/seller/profile
//! GET /api/v1/seller/dashboard
//! GET /api/v1/seller/orders?status=pending
//! PATCH /api/v1/seller/orders/{id}/status {"status":"packed"}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, NewProduct, Order, OrderStatus, Product, ProductCategory, ProductPatch,
    SellerDashboard, SellerProfile, SellerProfileInput,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_params, parse_optional, parse_required, parse_uuid,
};

const PRODUCT_ID: FieldName = FieldName::new("id");
const ORDER_ID: FieldName = FieldName::new("id");
const STATUS: FieldName = FieldName::new("status");

/// Body for `POST /seller/products`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductBody {
    pub category: ProductCategory,
    #[schema(example = "Dairy meal 50kg")]
    pub title: String,
    pub description: Option<String>,
    /// Price in whole shillings.
    #[schema(example = 95000)]
    pub price: i64,
    pub stock_qty: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub district: Option<String>,
}

impl From<CreateProductBody> for NewProduct {
    fn from(body: CreateProductBody) -> Self {
        Self {
            category: body.category,
            title: body.title,
            description: body.description,
            price: body.price,
            stock_qty: body.stock_qty,
            latitude: body.latitude,
            longitude: body.longitude,
            district: body.district,
        }
    }
}

/// Body for `PATCH /seller/products/{id}`.
///
/// `verified` and `isFlagged` are moderation fields; sending either is
/// rejected.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductBody {
    pub category: Option<ProductCategory>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock_qty: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub district: Option<String>,
    pub is_active: Option<bool>,
    #[schema(ignore)]
    #[serde(default, skip_serializing)]
    pub verified: Option<bool>,
    #[schema(ignore)]
    #[serde(default, skip_serializing)]
    pub is_flagged: Option<bool>,
}

impl TryFrom<UpdateProductBody> for ProductPatch {
    type Error = Error;

    fn try_from(body: UpdateProductBody) -> Result<Self, Self::Error> {
        if body.verified.is_some() || body.is_flagged.is_some() {
            return Err(Error::forbidden(
                "verification and flagging are managed by administrators",
            ));
        }
        Ok(Self {
            category: body.category,
            title: body.title,
            description: body.description,
            price: body.price,
            stock_qty: body.stock_qty,
            latitude: body.latitude,
            longitude: body.longitude,
            district: body.district,
            is_active: body.is_active,
        })
    }
}

/// Body for `PUT /seller/profile`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfileBody {
    #[schema(example = "Okello Agro Supplies")]
    pub store_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub district: Option<String>,
}

impl From<SellerProfileBody> for SellerProfileInput {
    fn from(body: SellerProfileBody) -> Self {
        Self {
            store_name: body.store_name,
            contact_email: body.contact_email,
            contact_phone: body.contact_phone,
            district: body.district,
        }
    }
}

/// Body for `PATCH /seller/orders/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct OrderStatusBody {
    #[schema(example = "packed")]
    pub status: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SellerOrdersQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Every listing owned by the caller, including inactive ones.
#[utoipa::path(
    get,
    path = "/api/v1/seller/products",
    responses(
        (status = 200, description = "Own listings", body = [Product]),
        (status = 403, description = "Not a seller", body = Error)
    ),
    tags = ["seller"],
    operation_id = "listMyProducts"
)]
#[get("/seller/products")]
pub async fn list_my_products(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let products = state.seller_query.list_my_products(&actor).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(products))
}

#[utoipa::path(
    post,
    path = "/api/v1/seller/products",
    request_body = CreateProductBody,
    responses(
        (status = 201, description = "Product listed", body = Product),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not a seller", body = Error)
    ),
    tags = ["seller"],
    operation_id = "createProduct"
)]
#[post("/seller/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateProductBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let product = state
        .seller
        .create_product(&actor, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(product))
}

#[utoipa::path(
    patch,
    path = "/api/v1/seller/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = UpdateProductBody,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Moderation fields supplied", body = Error),
        (status = 404, description = "Not one of the caller's products", body = Error)
    ),
    tags = ["seller"],
    operation_id = "updateProduct"
)]
#[patch("/seller/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateProductBody>,
) -> ApiResult<web::Json<Product>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, PRODUCT_ID)?;
    let patch = ProductPatch::try_from(payload.into_inner())?;
    Ok(web::Json(state.seller.update_product(&actor, id, patch).await?))
}

/// Withdraw a listing. The record is kept so past orders still resolve.
#[utoipa::path(
    delete,
    path = "/api/v1/seller/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Deactivated product", body = Product),
        (status = 404, description = "Not one of the caller's products", body = Error)
    ),
    tags = ["seller"],
    operation_id = "deactivateProduct"
)]
#[delete("/seller/products/{id}")]
pub async fn deactivate_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Product>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, PRODUCT_ID)?;
    Ok(web::Json(state.seller.deactivate_product(&actor, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/seller/profile",
    responses(
        (status = 200, description = "Store profile", body = SellerProfile),
        (status = 403, description = "Not a seller", body = Error),
        (status = 404, description = "No profile yet", body = Error)
    ),
    tags = ["seller"],
    operation_id = "sellerProfile"
)]
#[get("/seller/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let profile = state.seller_query.profile(&actor).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(profile))
}

#[utoipa::path(
    put,
    path = "/api/v1/seller/profile",
    request_body = SellerProfileBody,
    responses(
        (status = 200, description = "Saved profile", body = SellerProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not a seller", body = Error)
    ),
    tags = ["seller"],
    operation_id = "upsertSellerProfile"
)]
#[put("/seller/profile")]
pub async fn upsert_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SellerProfileBody>,
) -> ApiResult<web::Json<SellerProfile>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let profile = state
        .seller
        .upsert_profile(&actor, payload.into_inner().into())
        .await?;
    Ok(web::Json(profile))
}

/// Listing, inventory, order, and revenue counters for the caller's store.
#[utoipa::path(
    get,
    path = "/api/v1/seller/dashboard",
    responses(
        (status = 200, description = "Store totals", body = SellerDashboard),
        (status = 403, description = "Not a seller", body = Error)
    ),
    tags = ["seller"],
    operation_id = "sellerDashboard"
)]
#[get("/seller/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let totals = state.seller_query.dashboard(&actor).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(totals))
}

/// Orders placed against the caller's listings.
#[utoipa::path(
    get,
    path = "/api/v1/seller/orders",
    params(SellerOrdersQuery),
    responses(
        (status = 200, description = "Incoming orders", body = Paginated<Order>),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 403, description = "Not a seller", body = Error)
    ),
    tags = ["seller"],
    operation_id = "listSellerOrders"
)]
#[get("/seller/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<SellerOrdersQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let page = page_params(query.page, query.page_size)?;
    let status = parse_optional(query.status.as_deref(), STATUS, OrderStatus::parse)?;
    let orders = state
        .orders_query
        .list_seller_orders(&actor, status, page)
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(orders.with_links(&req.full_url())))
}

/// Advance an incoming order. `cancelled` restocks the items.
#[utoipa::path(
    patch,
    path = "/api/v1/seller/orders/{id}/status",
    params(("id" = String, Path, description = "Order id")),
    request_body = OrderStatusBody,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Unknown status", body = Error),
        (status = 403, description = "Not the order's seller", body = Error),
        (status = 409, description = "Status cannot move backwards", body = Error)
    ),
    tags = ["seller"],
    operation_id = "updateOrderStatus"
)]
#[patch("/seller/orders/{id}/status")]
pub async fn update_order_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<OrderStatusBody>,
) -> ApiResult<web::Json<Order>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, ORDER_ID)?;
    let status = parse_required(&payload.status, STATUS, OrderStatus::parse)?;
    Ok(web::Json(state.orders.update_status(&actor, id, status).await?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::domain::Role;
    use crate::inbound::http::test_utils::{api_app, memory_state, register};

    fn feed() -> Value {
        json!({
            "category": "FEED",
            "title": "Dairy meal 50kg",
            "price": 95000,
            "stockQty": 12,
            "district": "Mbarara",
        })
    }

    #[actix_web::test]
    async fn new_listings_await_verification_and_can_be_withdrawn() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (seller, _) = register(&app, Role::Seller, "Brian Okello").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/seller/products")
                .cookie(seller.clone())
                .set_json(feed())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let product: Value = test::read_body_json(res).await;
        let id = product["id"].as_str().expect("id").to_owned();
        assert_eq!(product["currency"], "UGX");

        assert_eq!(product["verified"], false);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/marketplace/products/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/seller/products/{id}"))
                .cookie(seller.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let product: Value = test::read_body_json(res).await;
        assert_eq!(product["isActive"], false);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/seller/dashboard")
                .cookie(seller)
                .to_request(),
        )
        .await;
        let totals: Value = test::read_body_json(res).await;
        assert_eq!(totals["productsCount"], 1);
        assert_eq!(totals["activeProductsCount"], 0);
    }

    #[actix_web::test]
    async fn sellers_cannot_moderate_their_own_listings() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (seller, _) = register(&app, Role::Seller, "Brian Okello").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/seller/products")
                .cookie(seller.clone())
                .set_json(feed())
                .to_request(),
        )
        .await;
        let product: Value = test::read_body_json(res).await;
        let id = product["id"].as_str().expect("id");

        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/seller/products/{id}"))
                .cookie(seller)
                .set_json(json!({"verified": true}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn owners_have_no_store() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (owner, _) = register(&app, Role::Owner, "Amina Nakato").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/seller/products")
                .cookie(owner)
                .set_json(feed())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn store_profile_round_trips() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (seller, _) = register(&app, Role::Seller, "Brian Okello").await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/seller/profile")
                .cookie(seller.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/seller/profile")
                .cookie(seller.clone())
                .set_json(json!({"storeName": "Okello Agro", "contactEmail": "Shop@Example.com"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/seller/profile")
                .cookie(seller)
                .to_request(),
        )
        .await;
        let profile: Value = test::read_body_json(res).await;
        assert_eq!(profile["contactEmail"], "shop@example.com");
    }
}
