//! Public product catalogue.
//!
//! ```text
//! GET /api/v1/marketplace/products?q=feed&category=FEED&latitude=0.3&longitude=32.5&radiusKm=50
//! GET /api/v1/marketplace/products/{id}
//! ```

use actix_web::{HttpRequest, get, web};
use pagination::Paginated;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, Product, ProductCategory, ProductListing, ProductSearch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_params, parse_optional, parse_uuid, proximity,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProductSearchQuery {
    /// Matches title or description.
    pub q: Option<String>,
    /// One of the product categories, e.g. `FEED` or `MEDICINE`.
    pub category: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Search active, in-stock, unflagged products.
///
/// Recommended and verified listings come first unless an origin is given,
/// in which case results are ordered by distance.
#[utoipa::path(
    get,
    path = "/api/v1/marketplace/products",
    params(ProductSearchQuery),
    responses(
        (status = 200, description = "Matching products", body = Paginated<ProductListing>),
        (status = 400, description = "Invalid search parameters", body = Error)
    ),
    tags = ["marketplace"],
    operation_id = "searchProducts",
    security([])
)]
#[get("/marketplace/products")]
pub async fn search_products(
    state: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<ProductSearchQuery>,
) -> ApiResult<web::Json<Paginated<ProductListing>>> {
    let query = query.into_inner();
    let page = page_params(query.page, query.page_size)?;
    let search = ProductSearch {
        query: query.q,
        category: parse_optional(
            query.category.as_deref(),
            FieldName::new("category"),
            ProductCategory::parse,
        )?,
        district: query.district,
        proximity: proximity(query.latitude, query.longitude, query.radius_km)?,
    };
    let results = state.marketplace.search(search, page).await?;
    Ok(web::Json(results.with_links(&req.full_url())))
}

#[utoipa::path(
    get,
    path = "/api/v1/marketplace/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Unknown or hidden product", body = Error)
    ),
    tags = ["marketplace"],
    operation_id = "getProduct",
    security([])
)]
#[get("/marketplace/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Product>> {
    let id = parse_uuid(&path, FieldName::new("id"))?;
    Ok(web::Json(state.marketplace.get(id).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use pagination::Paginated;
    use rstest::rstest;
    use serde_json::Value;

    use crate::domain::ProductCategory;
    use crate::domain::ports::MockMarketplaceQuery;
    use crate::inbound::http::test_utils::{api_app, memory_state};

    #[actix_web::test]
    async fn category_filter_is_parsed() {
        let (_, mut state) = memory_state();
        let mut marketplace = MockMarketplaceQuery::new();
        marketplace
            .expect_search()
            .withf(|search, _| {
                search.category == Some(ProductCategory::Feed) && search.proximity.is_none()
            })
            .times(1)
            .returning(|_, page| Ok(Paginated::new(Vec::new(), 0, page)));
        state.marketplace = Arc::new(marketplace);
        let app = actix_test::init_service(api_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/marketplace/products?category=feed")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["page"], 1);
    }

    #[rstest]
    #[case("/api/v1/marketplace/products?category=tractors", "category")]
    #[case("/api/v1/marketplace/products?latitude=91&longitude=0", "latitude")]
    #[case("/api/v1/marketplace/products?pageSize=500", "pageSize")]
    #[actix_web::test]
    async fn invalid_search_parameters_name_the_field(#[case] uri: &str, #[case] field: &str) {
        let app = actix_test::init_service(api_app(memory_state().1)).await;
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn unknown_products_are_not_found() {
        let app = actix_test::init_service(api_app(memory_state().1)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/marketplace/products/{}", uuid::Uuid::new_v4()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
