//! Marketplace flow: verified listings from two sellers are bought in one
//! checkout, then fulfilled or cancelled per seller.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use anilink::domain::Role;

mod support;

use support::{Harness, app, call, email_for, login, notification_titles, register, seed_admin};

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id").to_owned()
}

async fn list_product<S>(app: &S, seller: &Cookie<'static>, title: &str, price: i64) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, product, _) = call(
        app,
        test::TestRequest::post().uri("/api/v1/seller/products"),
        Some(seller),
        Some(json!({
            "category": "FEED",
            "title": title,
            "price": price,
            "stockQty": 10,
            "district": "Mbarara",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    assert_eq!(product["verified"], false);
    id_of(&product)
}

#[actix_web::test]
async fn checkout_splits_the_cart_per_seller() {
    let harness = Harness::new();
    seed_admin(&harness.store, "Joseph Admin").await;
    let app = test::init_service(app(harness.state)).await;

    let (okello, _) = register(&app, Role::Seller, "Peter Okello").await;
    let (akello, _) = register(&app, Role::Seller, "Sarah Akello").await;
    let (buyer, _) = register(&app, Role::Owner, "Amina Nakato").await;
    let (_, admin) = login(&app, &email_for("Joseph Admin"), support::PASSWORD).await;
    let admin = admin.expect("admin session");

    let dairy_meal = list_product(&app, &okello, "Dairy meal 50kg", 95_000).await;
    let mineral_lick = list_product(&app, &akello, "Mineral lick", 12_000).await;

    let (_, listed, _) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/marketplace/products"),
        None,
        None,
    )
    .await;
    assert_eq!(listed["total"], 0, "unverified products stay hidden");

    for product_id in [&dairy_meal, &mineral_lick] {
        let (status, body, _) = call(
            &app,
            test::TestRequest::patch().uri(&format!("/api/v1/admin/products/{product_id}")),
            Some(&admin),
            Some(json!({ "verified": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (_, listed, _) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/marketplace/products"),
        None,
        None,
    )
    .await;
    assert_eq!(listed["total"], 2);

    // The cart lives in the session cookie, so keep the refreshed one.
    let mut session = buyer.clone();
    for (product_id, qty) in [(&dairy_meal, 2), (&mineral_lick, 3)] {
        let (status, cart, cookie) = call(
            &app,
            test::TestRequest::post().uri("/api/v1/cart/items"),
            Some(&session),
            Some(json!({ "productId": product_id, "qty": qty })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{cart}");
        session = cookie.unwrap_or(session);
    }

    let (status, orders, cookie) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/cart/checkout"),
        Some(&session),
        Some(json!({ "deliveryOption": "PICKUP" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{orders}");
    session = cookie.unwrap_or(session);
    let orders = orders.as_array().expect("orders").clone();
    assert_eq!(orders.len(), 2);
    let total: i64 = orders
        .iter()
        .map(|order| order["totalPrice"].as_i64().expect("total"))
        .sum();
    assert_eq!(total, 2 * 95_000 + 3 * 12_000);

    let (_, cart, _) = call(&app, test::TestRequest::get().uri("/api/v1/cart"), Some(&session), None).await;
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));

    let (_, seller_orders, _) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/seller/orders"),
        Some(&okello),
        None,
    )
    .await;
    assert_eq!(seller_orders["total"], 1);
    let okello_order = id_of(&seller_orders["data"][0]);
    let akello_order = orders
        .iter()
        .map(id_of)
        .find(|id| *id != okello_order)
        .expect("second order");

    let status_uri = format!("/api/v1/seller/orders/{okello_order}/status");
    for next in ["confirmed", "packed"] {
        let (status, body, _) = call(
            &app,
            test::TestRequest::patch().uri(&status_uri),
            Some(&okello),
            Some(json!({ "status": next })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{next}: {body}");
        assert_eq!(body["status"], next);
    }

    // Status only moves forward.
    let (status, _, _) = call(
        &app,
        test::TestRequest::patch().uri(&status_uri),
        Some(&okello),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Another seller cannot touch the order.
    let (status, _, _) = call(
        &app,
        test::TestRequest::patch().uri(&status_uri),
        Some(&akello),
        Some(json!({ "status": "dispatched" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = call(
        &app,
        test::TestRequest::post().uri(&format!("/api/v1/orders/{okello_order}/cancel")),
        Some(&session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "packed orders cannot be cancelled");

    let (status, cancelled, _) = call(
        &app,
        test::TestRequest::post().uri(&format!("/api/v1/orders/{akello_order}/cancel")),
        Some(&session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{cancelled}");
    assert_eq!(cancelled["status"], "cancelled");

    let (_, lick, _) = call(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/marketplace/products/{mineral_lick}")),
        None,
        None,
    )
    .await;
    assert_eq!(lick["stockQty"], 10, "cancellation restores stock");
    let (_, meal, _) = call(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/marketplace/products/{dairy_meal}")),
        None,
        None,
    )
    .await;
    assert_eq!(meal["stockQty"], 8);

    let buyer_titles = notification_titles(&app, &session).await;
    assert!(buyer_titles.iter().any(|title| title == "Order update"));
    let akello_titles = notification_titles(&app, &akello).await;
    assert!(akello_titles.iter().any(|title| title == "New order"));
    assert!(akello_titles.iter().any(|title| title == "Order cancelled"));
}

#[actix_web::test]
async fn checkout_rejects_more_than_the_stock() {
    let harness = Harness::new();
    seed_admin(&harness.store, "Joseph Admin").await;
    let app = test::init_service(app(harness.state)).await;

    let (seller, _) = register(&app, Role::Seller, "Peter Okello").await;
    let (buyer, _) = register(&app, Role::Owner, "Amina Nakato").await;
    let (_, admin) = login(&app, &email_for("Joseph Admin"), support::PASSWORD).await;
    let admin = admin.expect("admin session");

    let product_id = list_product(&app, &seller, "Dairy meal 50kg", 95_000).await;
    call(
        &app,
        test::TestRequest::patch().uri(&format!("/api/v1/admin/products/{product_id}")),
        Some(&admin),
        Some(json!({ "verified": true })),
    )
    .await;

    let (status, _, cookie) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/cart/items"),
        Some(&buyer),
        Some(json!({ "productId": product_id, "qty": 11 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session = cookie.unwrap_or(buyer);

    let (status, body, _) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/cart/checkout"),
        Some(&session),
        Some(json!({ "deliveryOption": "PICKUP" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (_, mine, _) = call(&app, test::TestRequest::get().uri("/api/v1/orders"), Some(&session), None).await;
    assert_eq!(mine["total"], 0);
}
