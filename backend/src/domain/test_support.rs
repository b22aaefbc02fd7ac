//! Builders shared by the domain service tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, MockClock};

use crate::domain::ports::NotificationSink;
use crate::domain::{
    EmailAddress, NewNotification, NewProduct, Notification, PersonName, Product,
    ProductCategory, Role, User, UserId, VetProfile, VetProfileInput, VetStatus,
};

pub(crate) fn fixed_clock(now: DateTime<Utc>) -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now);
    Arc::new(clock)
}

pub(crate) fn sample_user(role: Role, name: &str) -> User {
    let slug = name.to_lowercase().replace(' ', ".");
    User {
        id: UserId::random(),
        name: PersonName::new(name).expect("valid name"),
        email: EmailAddress::new(format!("{slug}@example.com")).expect("valid email"),
        phone: None,
        role,
        is_active: true,
        created_at: "2026-01-01T00:00:00Z".parse().expect("valid timestamp"),
    }
}

/// Notification sink that records what services emit.
#[derive(Default)]
pub(crate) struct RecordingSink {
    sent: std::sync::Mutex<Vec<(NewNotification, bool)>>,
}

impl RecordingSink {
    /// Titles of everything emitted, in order.
    pub(crate) fn titles(&self) -> Vec<String> {
        self.sent().into_iter().map(|(n, _)| n.title).collect()
    }

    /// Emitted notifications paired with whether `notify_once` was used.
    pub(crate) fn sent(&self) -> Vec<(NewNotification, bool)> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn record(&self, notification: NewNotification, once: bool) -> Option<Notification> {
        let stored = notification.clone().into_notification(Utc::now());
        if let Ok(mut guard) = self.sent.lock() {
            guard.push((notification, once));
        }
        Some(stored)
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: NewNotification) -> Option<Notification> {
        self.record(notification, false)
    }

    async fn notify_once(&self, notification: NewNotification) -> Option<Notification> {
        self.record(notification, true)
    }
}

pub(crate) fn sample_vet(user_id: UserId, status: VetStatus) -> VetProfile {
    let mut profile = VetProfile::upsert(
        None,
        user_id,
        "Dr Okello",
        VetProfileInput {
            clinic_name: "Mbarara Animal Clinic".into(),
            license_number: "UVB-1234".into(),
            specializations: vec!["cattle".into()],
            farm_visits: true,
            district: Some("Mbarara".into()),
            ..VetProfileInput::default()
        },
        "2026-01-01T00:00:00Z".parse().expect("valid timestamp"),
    )
    .expect("valid vet profile");
    profile.status = status;
    profile
}

/// A verified, active listing buyers can see.
pub(crate) fn visible_product(seller_id: UserId, price: i64, stock_qty: i32) -> Product {
    let mut product = Product::create(
        seller_id,
        NewProduct {
            category: ProductCategory::Feed,
            title: "Dairy meal 70kg".into(),
            description: Some("High-protein dairy meal".into()),
            price,
            stock_qty,
            latitude: None,
            longitude: None,
            district: Some("Mbarara".into()),
        },
        "2026-01-01T00:00:00Z".parse().expect("valid timestamp"),
    )
    .expect("valid product");
    product.verified = true;
    product
}
