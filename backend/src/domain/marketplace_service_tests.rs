//! Tests for the public catalogue and seller workspace.

use chrono::{DateTime, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockOrderRepository, MockProductRepository, MockSellerProfileRepository, SellerOrderTotals,
};
use crate::domain::test_support::{fixed_clock, visible_product};
use crate::domain::{ErrorCode, ProductCategory, ProximityFilter, Role, UserId};

type Service =
    MarketplaceService<MockProductRepository, MockSellerProfileRepository, MockOrderRepository>;

#[fixture]
fn now() -> DateTime<Utc> {
    "2026-05-04T10:00:00Z".parse().expect("valid timestamp")
}

fn service(products: MockProductRepository, orders: MockOrderRepository, now: DateTime<Utc>) -> Service {
    MarketplaceService::new(
        Arc::new(products),
        Arc::new(MockSellerProfileRepository::new()),
        Arc::new(orders),
        fixed_clock(now),
    )
}

fn seller() -> Actor {
    Actor::new(UserId::random(), Role::Seller)
}

#[rstest]
#[tokio::test]
async fn radius_search_counts_only_nearby_products(now: DateTime<Utc>) {
    let mut near = visible_product(UserId::random(), 120_000, 10);
    near.latitude = Some(-0.6072);
    near.longitude = Some(30.6545);
    let mut far = visible_product(UserId::random(), 90_000, 10);
    far.latitude = Some(2.7724);
    far.longitude = Some(32.2881);
    let unplaced = visible_product(UserId::random(), 80_000, 10);
    let near_id = near.id;
    let all = vec![far, unplaced, near];
    let mut products = MockProductRepository::new();
    products
        .expect_search_visible()
        .returning(move |_| Ok(all.clone()));
    let svc = service(products, MockOrderRepository::new(), now);

    let search = ProductSearch {
        proximity: ProximityFilter::from_query(Some(-0.6), Some(30.65), Some(25.0))
            .expect("filter"),
        ..ProductSearch::default()
    };
    let page = svc
        .search(search, PageParams::default())
        .await
        .expect("searched");
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].product.id, near_id);
}

#[rstest]
#[tokio::test]
async fn unverified_products_are_not_public(now: DateTime<Utc>) {
    let mut hidden = visible_product(UserId::random(), 50_000, 3);
    hidden.verified = false;
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_id()
        .returning(move |_| Ok(Some(hidden.clone())));
    let svc = service(products, MockOrderRepository::new(), now);

    let err = svc.get(Uuid::new_v4()).await.expect_err("hidden");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn price_edits_reset_verification(now: DateTime<Utc>) {
    let actor = seller();
    let product = visible_product(actor.user_id, 50_000, 3);
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_id()
        .returning(move |_| Ok(Some(product.clone())));
    products
        .expect_save()
        .withf(|p| !p.verified && p.price == 55_000)
        .times(1)
        .returning(|_| Ok(()));
    let svc = service(products, MockOrderRepository::new(), now);

    let patch = ProductPatch {
        price: Some(55_000),
        ..ProductPatch::default()
    };
    let updated = svc
        .update_product(&actor, Uuid::new_v4(), patch)
        .await
        .expect("updated");
    assert_eq!(updated.updated_at, now);
}

#[rstest]
#[tokio::test]
async fn sellers_cannot_touch_each_others_products(now: DateTime<Utc>) {
    let product = visible_product(UserId::random(), 50_000, 3);
    let mut products = MockProductRepository::new();
    products
        .expect_find_by_id()
        .returning(move |_| Ok(Some(product.clone())));
    products.expect_save().never();
    let svc = service(products, MockOrderRepository::new(), now);

    let err = svc
        .deactivate_product(&seller(), Uuid::new_v4())
        .await
        .expect_err("foreign product");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn new_listings_start_unverified(now: DateTime<Utc>) {
    let mut products = MockProductRepository::new();
    products.expect_save().times(1).returning(|_| Ok(()));
    let svc = service(products, MockOrderRepository::new(), now);

    let product = svc
        .create_product(
            &seller(),
            NewProduct {
                category: ProductCategory::Medicine,
                title: "Albendazole 100ml".into(),
                description: None,
                price: 18_000,
                stock_qty: 40,
                latitude: None,
                longitude: None,
                district: None,
            },
        )
        .await
        .expect("created");
    assert!(product.is_active);
    assert!(!product.verified);
}

#[rstest]
#[tokio::test]
async fn dashboard_combines_inventory_and_order_totals(now: DateTime<Utc>) {
    let actor = seller();
    let mut retired = visible_product(actor.user_id, 10_000, 4);
    retired.is_active = false;
    let listed = vec![visible_product(actor.user_id, 20_000, 6), retired];
    let mut products = MockProductRepository::new();
    products
        .expect_list_by_seller()
        .returning(move |_| Ok(listed.clone()));
    let mut orders = MockOrderRepository::new();
    orders.expect_seller_totals().returning(|_| {
        Ok(SellerOrderTotals {
            orders_count: 7,
            pending_orders_count: 2,
            delivered_revenue: 340_000,
        })
    });
    let svc = service(products, orders, now);

    let dashboard = svc.dashboard(&actor).await.expect("dashboard");
    assert_eq!(
        dashboard,
        SellerDashboard {
            products_count: 2,
            active_products_count: 1,
            orders_count: 7,
            pending_orders_count: 2,
            inventory_count: 10,
            revenue: 340_000,
        }
    );
}

#[rstest]
#[tokio::test]
async fn owners_have_no_seller_workspace(now: DateTime<Utc>) {
    let svc = service(MockProductRepository::new(), MockOrderRepository::new(), now);
    let owner = Actor::new(UserId::random(), Role::Owner);

    let err = svc.profile(&owner).await.expect_err("sellers only");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}
