//! Tests for the admin endpoints.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::Role;
use crate::inbound::http::test_utils::{api_app, login, memory_state, register, seed_admin};

const ADMIN_EMAIL: &str = "joseph.admin@example.com";

async fn send<S>(app: &S, req: actix_test::TestRequest, cookie: &Cookie<'static>) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let res = actix_test::call_service(app, req.cookie(cookie.clone()).to_request()).await;
    let status = res.status();
    let body = actix_test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

#[rstest]
#[case(Role::Owner)]
#[case(Role::Vet)]
#[case(Role::Seller)]
#[actix_web::test]
async fn non_admins_are_forbidden(#[case] role: Role) {
    let app = actix_test::init_service(api_app(memory_state().1)).await;
    let (cookie, _) = register(&app, role, "Amina Nakato").await;
    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/api/v1/admin/stats"), &cookie).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[actix_web::test]
async fn approving_a_vet_lists_them_publicly() {
    let (store, state) = memory_state();
    seed_admin(&store, "Joseph Admin").await;
    let app = actix_test::init_service(api_app(state)).await;
    let (vet, vet_body) = register(&app, Role::Vet, "Dr Grace Atim").await;
    let vet_id = vet_body["id"].as_str().expect("vet id").to_owned();

    let (status, _) = send(
        &app,
        actix_test::TestRequest::put().uri("/api/v1/vets/me").set_json(json!({
            "clinicName": "Mbarara Animal Clinic",
            "licenseNumber": "UVB-2291",
            "specializations": ["dairy"],
            "farmVisits": true,
        })),
        &vet,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let admin = login(&app, ADMIN_EMAIL).await;
    let (_, pending) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/vets?status=pending"),
        &admin,
    )
    .await;
    assert_eq!(pending["total"], 1);
    assert_eq!(pending["data"][0]["userId"], vet_id.as_str());

    let (status, approved) = send(
        &app,
        actix_test::TestRequest::post().uri(&format!("/api/v1/admin/vets/{vet_id}/approve")),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "APPROVED");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/vets/{vet_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let (_, unread) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/notifications/unread-count"),
        &vet,
    )
    .await;
    assert_eq!(unread["count"], 1);
}

#[actix_web::test]
async fn rejection_requires_a_reason() {
    let (store, state) = memory_state();
    seed_admin(&store, "Joseph Admin").await;
    let app = actix_test::init_service(api_app(state)).await;
    let (vet, vet_body) = register(&app, Role::Vet, "Dr Grace Atim").await;
    let vet_id = vet_body["id"].as_str().expect("vet id").to_owned();
    send(
        &app,
        actix_test::TestRequest::put().uri("/api/v1/vets/me").set_json(json!({
            "clinicName": "Mbarara Animal Clinic",
            "licenseNumber": "UVB-2291",
        })),
        &vet,
    )
    .await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let uri = format!("/api/v1/admin/vets/{vet_id}/reject");

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post().uri(&uri).set_json(json!({"reason": "  "})),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "reason");

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({"reason": "licence number not found in the register"})),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REJECTED");
}

#[actix_web::test]
async fn verified_products_become_visible() {
    let (store, state) = memory_state();
    seed_admin(&store, "Joseph Admin").await;
    let app = actix_test::init_service(api_app(state)).await;
    let (seller, _) = register(&app, Role::Seller, "Peter Okello").await;
    let (_, product) = send(
        &app,
        actix_test::TestRequest::post().uri("/api/v1/seller/products").set_json(json!({
            "category": "FEED",
            "title": "Dairy meal 50kg",
            "price": 95000,
            "stockQty": 12,
        })),
        &seller,
    )
    .await;
    let product_id = product["id"].as_str().expect("product id").to_owned();

    let admin = login(&app, ADMIN_EMAIL).await;
    let (_, queue) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/products?verified=false"),
        &admin,
    )
    .await;
    assert_eq!(queue["total"], 1);

    let (status, moderated) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/admin/products/{product_id}"))
            .set_json(json!({"verified": true, "recommended": true})),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moderated["verified"], true);
    assert_eq!(moderated["recommended"], true);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/marketplace/products/{product_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn admins_manage_other_accounts_but_not_their_own() {
    let (store, state) = memory_state();
    let me = seed_admin(&store, "Joseph Admin").await;
    let app = actix_test::init_service(api_app(state)).await;
    let (_, owner) = register(&app, Role::Owner, "Amina Nakato").await;
    let owner_id = owner["id"].as_str().expect("owner id").to_owned();
    let admin = login(&app, ADMIN_EMAIL).await;

    let (status, _) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/admin/users/{}", me.id))
            .set_json(json!({"isActive": false})),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/admin/users/{owner_id}"))
            .set_json(json!({"isActive": false})),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isActive"], false);

    let (_, inactive) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/users?status=inactive"),
        &admin,
    )
    .await;
    assert_eq!(inactive["total"], 1);
    assert_eq!(inactive["data"][0]["id"], owner_id.as_str());

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/users?status=dormant"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "status");
}

#[actix_web::test]
async fn settings_are_validated_and_merged_with_defaults() {
    let (store, state) = memory_state();
    seed_admin(&store, "Joseph Admin").await;
    let app = actix_test::init_service(api_app(state)).await;
    let admin = login(&app, ADMIN_EMAIL).await;

    let (_, defaults) = send(&app, actix_test::TestRequest::get().uri("/api/v1/admin/settings"), &admin).await;
    assert_eq!(defaults["default_currency"], "UGX");
    assert_eq!(defaults["notifications_enabled"], "true");

    let (status, _) = send(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/admin/settings")
            .set_json(json!({"theme": "dark"})),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/admin/settings")
            .set_json(json!({"platform_fee_percent": "2.5"})),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["platform_fee_percent"], "2.5");
    assert_eq!(updated["max_booking_distance_km"], "50");
}

#[rstest]
#[case("/api/v1/admin/stats?days=0")]
#[case("/api/v1/admin/stats?days=366")]
#[actix_web::test]
async fn stats_window_is_bounded(#[case] uri: &str) {
    let (store, state) = memory_state();
    seed_admin(&store, "Joseph Admin").await;
    let app = actix_test::init_service(api_app(state)).await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let (status, body) = send(&app, actix_test::TestRequest::get().uri(uri), &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "days");
}

#[actix_web::test]
async fn stats_count_registered_accounts() {
    let (store, state) = memory_state();
    seed_admin(&store, "Joseph Admin").await;
    let app = actix_test::init_service(api_app(state)).await;
    register(&app, Role::Owner, "Amina Nakato").await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let (status, stats) = send(&app, actix_test::TestRequest::get().uri("/api/v1/admin/stats"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["days"], 30);
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["revenue"], 0);
}

#[rstest]
#[case("/api/v1/admin/reports/overview?from=2026-05-10&to=2026-05-01", "from", "out_of_range")]
#[case("/api/v1/admin/reports/overview?from=2024-01-01&to=2026-01-01", "from", "out_of_range")]
#[case("/api/v1/admin/reports/overview?from=yesterday", "query", "malformed")]
#[actix_web::test]
async fn reports_reject_bad_ranges(#[case] uri: &str, #[case] field: &str, #[case] code: &str) {
    let (store, state) = memory_state();
    seed_admin(&store, "Joseph Admin").await;
    let app = actix_test::init_service(api_app(state)).await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let (status, body) = send(&app, actix_test::TestRequest::get().uri(uri), &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn reports_overview_lists_every_booking_status() {
    let (store, state) = memory_state();
    seed_admin(&store, "Joseph Admin").await;
    let app = actix_test::init_service(api_app(state)).await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let (status, report) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/reports/overview?start=2026-04-01&end=2026-04-30"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["from"], "2026-04-01");
    assert_eq!(report["to"], "2026-04-30");
    assert_eq!(report["ordersByDay"], json!([]));
    assert_eq!(report["topSellers"], json!([]));
    assert_eq!(report["bookingsByStatus"]["REQUESTED"], 0);
    assert_eq!(
        report["bookingsByStatus"].as_object().map(serde_json::Map::len),
        Some(6)
    );
}
