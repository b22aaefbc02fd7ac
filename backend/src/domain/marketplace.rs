//! Marketplace products, seller storefronts, and moderation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{bounded_text, invalid_field, optional_text};
use crate::domain::{EmailAddress, Error, GeoPoint, PhoneNumber, ProximityFilter, UserId};

/// The only currency products are priced in.
pub const CURRENCY: &str = "UGX";

/// Product grouping used by marketplace filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    Animal,
    Feed,
    Medicine,
    Equipment,
    Accessory,
}

impl ProductCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Animal => "ANIMAL",
            Self::Feed => "FEED",
            Self::Medicine => "MEDICINE",
            Self::Equipment => "EQUIPMENT",
            Self::Accessory => "ACCESSORY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ANIMAL" => Some(Self::Animal),
            "FEED" => Some(Self::Feed),
            "MEDICINE" => Some(Self::Medicine),
            "EQUIPMENT" => Some(Self::Equipment),
            "ACCESSORY" => Some(Self::Accessory),
            _ => None,
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listing offered by a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub seller_id: UserId,
    pub category: ProductCategory,
    pub title: String,
    pub description: Option<String>,
    /// Unit price in whole Uganda shillings.
    pub price: i64,
    #[schema(example = "UGX")]
    pub currency: String,
    pub stock_qty: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub district: Option<String>,
    pub is_active: bool,
    pub verified: bool,
    pub recommended: bool,
    pub is_flagged: bool,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product annotated with distance from the search origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub distance_km: Option<f64>,
}

/// Unvalidated product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub category: ProductCategory,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock_qty: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub district: Option<String>,
}

/// Seller edit. Moderation fields are not reachable from here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub category: Option<ProductCategory>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock_qty: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub district: Option<String>,
    pub is_active: Option<bool>,
}

/// Admin moderation decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductModeration {
    pub verified: Option<bool>,
    pub is_active: Option<bool>,
    pub is_flagged: Option<bool>,
    pub recommended: Option<bool>,
    pub admin_note: Option<String>,
}

fn check_price(price: i64) -> Result<i64, Error> {
    if price <= 0 {
        return Err(invalid_field(
            "price",
            "not_positive",
            "price must be greater than zero",
            Some(json!(price)),
        ));
    }
    Ok(price)
}

fn check_stock(stock: i32) -> Result<i32, Error> {
    if stock < 0 {
        return Err(invalid_field(
            "stockQty",
            "negative",
            "stockQty must not be negative",
            Some(json!(stock)),
        ));
    }
    Ok(stock)
}

fn check_point(latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<GeoPoint>, Error> {
    GeoPoint::from_optional(latitude, longitude)
        .map_err(|err| invalid_field("latitude", "invalid_coordinates", err.to_string(), None))
}

impl Product {
    /// Validate a new listing. Listings start active and unverified.
    pub fn create(seller_id: UserId, input: NewProduct, now: DateTime<Utc>) -> Result<Self, Error> {
        let point = check_point(input.latitude, input.longitude)?;
        Ok(Self {
            id: Uuid::new_v4(),
            seller_id,
            category: input.category,
            title: bounded_text("title", &input.title, 2, 150)?,
            description: optional_text("description", input.description.as_deref(), 4000)?,
            price: check_price(input.price)?,
            currency: CURRENCY.to_owned(),
            stock_qty: check_stock(input.stock_qty)?,
            latitude: point.map(|p| p.latitude()),
            longitude: point.map(|p| p.longitude()),
            district: optional_text("district", input.district.as_deref(), 100)?,
            is_active: true,
            verified: false,
            recommended: false,
            is_flagged: false,
            admin_note: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Shown to buyers: verified, active, and not flagged.
    pub fn is_visible(&self) -> bool {
        self.verified && self.is_active && !self.is_flagged
    }

    /// Stored location, when both coordinates are present.
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_optional(self.latitude, self.longitude)
            .ok()
            .flatten()
    }

    /// Apply a seller edit. Changing what buyers are promised resets
    /// verification.
    pub fn apply_seller_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> Result<(), Error> {
        let mut next = self.clone();
        let mut needs_review = false;
        if let Some(category) = patch.category
            && category != next.category
        {
            next.category = category;
            needs_review = true;
        }
        if let Some(title) = patch.title.as_deref() {
            let title = bounded_text("title", title, 2, 150)?;
            needs_review |= title != next.title;
            next.title = title;
        }
        if let Some(description) = patch.description.as_deref() {
            let description = optional_text("description", Some(description), 4000)?;
            needs_review |= description != next.description;
            next.description = description;
        }
        if let Some(price) = patch.price {
            let price = check_price(price)?;
            needs_review |= price != next.price;
            next.price = price;
        }
        if let Some(stock) = patch.stock_qty {
            next.stock_qty = check_stock(stock)?;
        }
        if patch.latitude.is_some() || patch.longitude.is_some() {
            let point = check_point(patch.latitude, patch.longitude)?;
            next.latitude = point.map(|p| p.latitude());
            next.longitude = point.map(|p| p.longitude());
        }
        if let Some(district) = patch.district.as_deref() {
            next.district = optional_text("district", Some(district), 100)?;
        }
        if let Some(active) = patch.is_active {
            next.is_active = active;
        }
        if needs_review {
            next.verified = false;
        }
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Apply an admin moderation decision.
    pub fn moderate(&mut self, decision: ProductModeration, now: DateTime<Utc>) -> Result<(), Error> {
        let note = match decision.admin_note.as_deref() {
            Some(note) => optional_text("adminNote", Some(note), 1000)?,
            None => self.admin_note.clone(),
        };
        if let Some(verified) = decision.verified {
            self.verified = verified;
        }
        if let Some(active) = decision.is_active {
            self.is_active = active;
        }
        if let Some(flagged) = decision.is_flagged {
            self.is_flagged = flagged;
        }
        if let Some(recommended) = decision.recommended {
            self.recommended = recommended;
        }
        self.admin_note = note;
        self.updated_at = now;
        Ok(())
    }
}

/// Public marketplace search criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductSearch {
    /// Case-insensitive text matched against title and description.
    pub query: Option<String>,
    pub category: Option<ProductCategory>,
    pub district: Option<String>,
    pub proximity: Option<ProximityFilter>,
}

impl ProductSearch {
    /// Apply the non-geographic filters. Visibility is not checked here.
    pub fn matches(&self, product: &Product) -> bool {
        let query_ok = self.query.as_deref().map(str::trim).is_none_or(|q| {
            let needle = q.to_lowercase();
            product.title.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        });
        let category_ok = self.category.is_none_or(|c| product.category == c);
        let district_ok = self.district.as_deref().is_none_or(|d| {
            product
                .district
                .as_deref()
                .is_some_and(|own| own.eq_ignore_ascii_case(d.trim()))
        });
        query_ok && category_ok && district_ok
    }
}

/// Admin product list filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductAdminFilter {
    pub flagged: Option<bool>,
    pub verified: Option<bool>,
}

impl ProductAdminFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.flagged.is_none_or(|f| product.is_flagged == f)
            && self.verified.is_none_or(|v| product.verified == v)
    }
}

/// A seller's storefront details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    pub user_id: UserId,
    pub store_name: String,
    pub contact_email: Option<EmailAddress>,
    pub contact_phone: Option<PhoneNumber>,
    pub district: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated storefront details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerProfileInput {
    pub store_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub district: Option<String>,
}

impl SellerProfile {
    /// Validate storefront details for `user_id`.
    pub fn build(user_id: UserId, input: SellerProfileInput, now: DateTime<Utc>) -> Result<Self, Error> {
        let contact_email = optional_text("contactEmail", input.contact_email.as_deref(), 254)?
            .map(|raw| {
                EmailAddress::new(&raw).map_err(|err| {
                    invalid_field("contactEmail", "invalid", err.to_string(), Some(json!(raw)))
                })
            })
            .transpose()?;
        let contact_phone = optional_text("contactPhone", input.contact_phone.as_deref(), 32)?
            .map(|raw| {
                PhoneNumber::new(&raw).map_err(|err| {
                    invalid_field("contactPhone", "invalid", err.to_string(), Some(json!(raw)))
                })
            })
            .transpose()?;
        Ok(Self {
            user_id,
            store_name: bounded_text("storeName", &input.store_name, 2, 120)?,
            contact_email,
            contact_phone,
            district: optional_text("district", input.district.as_deref(), 100)?,
            updated_at: now,
        })
    }
}

/// Seller workspace summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerDashboard {
    pub products_count: u64,
    pub active_products_count: u64,
    pub orders_count: u64,
    pub pending_orders_count: u64,
    /// Units in stock across every listing.
    pub inventory_count: i64,
    /// Sum of delivered order totals in UGX.
    pub revenue: i64,
}

#[cfg(test)]
mod tests {
    //! Listing validation, visibility, and seller edits.

    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn product() -> Product {
        let mut product = Product::create(
            UserId::random(),
            NewProduct {
                category: ProductCategory::Feed,
                title: "Dairy meal 70kg".into(),
                description: Some("High protein".into()),
                price: 95_000,
                stock_qty: 12,
                latitude: None,
                longitude: None,
                district: Some("Mukono".into()),
            },
            Utc::now(),
        )
        .expect("valid product");
        product.verified = true;
        product
    }

    #[rstest]
    #[case(0)]
    #[case(-10)]
    fn non_positive_prices_are_rejected(#[case] price: i64) {
        let err = Product::create(
            UserId::random(),
            NewProduct {
                category: ProductCategory::Feed,
                title: "Salt lick".into(),
                description: None,
                price,
                stock_qty: 1,
                latitude: None,
                longitude: None,
                district: None,
            },
            Utc::now(),
        )
        .expect_err("bad price");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn new_listings_start_unverified(product: Product) {
        let fresh = Product::create(
            product.seller_id,
            NewProduct {
                category: product.category,
                title: product.title.clone(),
                description: None,
                price: product.price,
                stock_qty: 0,
                latitude: None,
                longitude: None,
                district: None,
            },
            Utc::now(),
        )
        .expect("valid");
        assert!(!fresh.verified && fresh.is_active && !fresh.is_visible());
        assert_eq!(fresh.currency, CURRENCY);
    }

    #[rstest]
    #[case(ProductPatch { stock_qty: Some(3), ..ProductPatch::default() }, true)]
    #[case(ProductPatch { price: Some(95_000), ..ProductPatch::default() }, true)]
    #[case(ProductPatch { price: Some(99_000), ..ProductPatch::default() }, false)]
    #[case(ProductPatch { title: Some("Dairy meal 50kg".into()), ..ProductPatch::default() }, false)]
    #[case(ProductPatch { category: Some(ProductCategory::Medicine), ..ProductPatch::default() }, false)]
    fn material_edits_reset_verification(
        mut product: Product,
        #[case] patch: ProductPatch,
        #[case] still_verified: bool,
    ) {
        product.apply_seller_patch(patch, Utc::now()).expect("valid patch");
        assert_eq!(product.verified, still_verified);
    }

    #[rstest]
    fn moderation_can_flag_and_hide(mut product: Product) {
        assert!(product.is_visible());
        product
            .moderate(
                ProductModeration {
                    is_flagged: Some(true),
                    admin_note: Some("Counterfeit label".into()),
                    ..ProductModeration::default()
                },
                Utc::now(),
            )
            .expect("valid moderation");
        assert!(!product.is_visible());
        assert_eq!(product.admin_note.as_deref(), Some("Counterfeit label"));
    }

    #[rstest]
    #[case(ProductSearch { query: Some("PROTEIN".into()), ..ProductSearch::default() }, true)]
    #[case(ProductSearch { category: Some(ProductCategory::Animal), ..ProductSearch::default() }, false)]
    #[case(ProductSearch { district: Some("mukono".into()), ..ProductSearch::default() }, true)]
    fn search_matches(product: Product, #[case] search: ProductSearch, #[case] expected: bool) {
        assert_eq!(search.matches(&product), expected);
    }

    #[rstest]
    fn seller_profile_validates_contacts() {
        let err = SellerProfile::build(
            UserId::random(),
            SellerProfileInput {
                store_name: "Agro Hub".into(),
                contact_email: Some("not-an-email".into()),
                ..SellerProfileInput::default()
            },
            Utc::now(),
        )
        .expect_err("bad email");
        assert_eq!(err.details().expect("details")["field"], "contactEmail");
    }
}
