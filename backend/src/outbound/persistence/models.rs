//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Each row converts from its aggregate by
//! reference and back into it fallibly; conversion failures are reported as
//! strings and mapped to the owning repository's query error.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::{PasswordResetRecord, StoredUser};
use crate::domain::{
    Animal, AnimalSex, Booking, BookingStatus, Case, CaseStatus, DeliveryOption, EmailAddress,
    Notification, NotificationPayload, NotificationType, Order, OrderItem, OrderStatus,
    PasswordDigest, PersonName, PhoneNumber, Product, ProductCategory, ResetTokenDigest,
    SellerProfile, User, UserId, UserProfile, VetProfile, VetStatus, VisitType,
};

use super::schema::{
    animals, bookings, cases, notifications, order_items, orders, password_reset_tokens,
    products, seller_profiles, user_profiles, users, vet_profiles,
};

fn unknown(column: &str, value: &str) -> String {
    format!("unrecognised {column} value: {value}")
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Row struct for the users table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for account fields editable after registration.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserAccountUpdate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> UserAccountUpdate<'a> {
    pub fn from_user(user: &'a User, now: DateTime<Utc>) -> Self {
        Self {
            name: user.name.as_ref(),
            email: user.email.as_ref(),
            phone: user.phone.as_ref().map(AsRef::as_ref),
            role: user.role.as_str(),
            is_active: user.is_active,
            updated_at: now,
        }
    }
}

impl UserRow {
    pub fn from_stored(stored: &StoredUser) -> Self {
        let user = &stored.user;
        Self {
            id: *user.id.as_uuid(),
            name: user.name.as_ref().to_owned(),
            email: user.email.as_ref().to_owned(),
            phone: user.phone.as_ref().map(|p| p.as_ref().to_owned()),
            role: user.role.as_str().to_owned(),
            is_active: user.is_active,
            password_hash: stored.password.as_str().to_owned(),
            created_at: user.created_at,
            updated_at: user.created_at,
        }
    }

    pub fn into_stored(self) -> Result<StoredUser, String> {
        let user = User {
            id: UserId::from_uuid(self.id),
            name: PersonName::new(self.name).map_err(|err| err.to_string())?,
            email: EmailAddress::new(&self.email).map_err(|err| err.to_string())?,
            phone: self
                .phone
                .map(|raw| PhoneNumber::new(raw).map_err(|err| err.to_string()))
                .transpose()?,
            role: self.role.parse().map_err(|_| unknown("role", &self.role))?,
            is_active: self.is_active,
            created_at: self.created_at,
        };
        Ok(StoredUser {
            user,
            password: PasswordDigest::from_phc(self.password_hash),
        })
    }
}

/// Row struct for the user_profiles table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_profiles)]
#[diesel(primary_key(user_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserProfileRow {
    pub user_id: Uuid,
    pub district: Option<String>,
    pub region: Option<String>,
    pub address_text: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfileRow {
    pub fn from_profile(user_id: &UserId, profile: &UserProfile, now: DateTime<Utc>) -> Self {
        Self {
            user_id: *user_id.as_uuid(),
            district: profile.district.clone(),
            region: profile.region.clone(),
            address_text: profile.address_text.clone(),
            latitude: profile.latitude,
            longitude: profile.longitude,
            avatar_url: profile.avatar_url.clone(),
            updated_at: now,
        }
    }

    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            district: self.district,
            region: self.region,
            address_text: self.address_text,
            latitude: self.latitude,
            longitude: self.longitude,
            avatar_url: self.avatar_url,
        }
    }
}

/// Row struct for the password_reset_tokens table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = password_reset_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PasswordResetRow {
    pub token_digest: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl From<&PasswordResetRecord> for PasswordResetRow {
    fn from(record: &PasswordResetRecord) -> Self {
        Self {
            token_digest: record.digest.as_str().to_owned(),
            user_id: *record.user_id.as_uuid(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            used_at: record.used_at,
        }
    }
}

impl From<PasswordResetRow> for PasswordResetRecord {
    fn from(row: PasswordResetRow) -> Self {
        Self {
            digest: ResetTokenDigest::from_hex(row.token_digest),
            user_id: UserId::from_uuid(row.user_id),
            created_at: row.created_at,
            expires_at: row.expires_at,
            used_at: row.used_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Animal care
// ---------------------------------------------------------------------------

/// Row struct for the animals table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = animals)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnimalRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub species: String,
    pub breed: Option<String>,
    pub name: Option<String>,
    pub sex: String,
    pub date_of_birth: Option<NaiveDate>,
    pub colour: Option<String>,
    pub tag_number: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub vaccinations: serde_json::Value,
    pub treatments: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnimalRow {
    pub fn from_animal(animal: &Animal) -> Result<Self, String> {
        Ok(Self {
            id: animal.id,
            owner_id: *animal.owner_id.as_uuid(),
            species: animal.species.clone(),
            breed: animal.breed.clone(),
            name: animal.name.clone(),
            sex: animal.sex.as_str().to_owned(),
            date_of_birth: animal.date_of_birth,
            colour: animal.colour.clone(),
            tag_number: animal.tag_number.clone(),
            photo_url: animal.photo_url.clone(),
            notes: animal.notes.clone(),
            vaccinations: serde_json::to_value(&animal.vaccinations)
                .map_err(|err| format!("serialise vaccinations: {err}"))?,
            treatments: serde_json::to_value(&animal.treatments)
                .map_err(|err| format!("serialise treatments: {err}"))?,
            created_at: animal.created_at,
            updated_at: animal.updated_at,
        })
    }

    pub fn into_animal(self) -> Result<Animal, String> {
        Ok(Animal {
            id: self.id,
            owner_id: UserId::from_uuid(self.owner_id),
            species: self.species,
            breed: self.breed,
            name: self.name,
            sex: AnimalSex::from_storage(&self.sex),
            date_of_birth: self.date_of_birth,
            colour: self.colour,
            tag_number: self.tag_number,
            photo_url: self.photo_url,
            notes: self.notes,
            vaccinations: serde_json::from_value(self.vaccinations)
                .map_err(|err| format!("deserialise vaccinations: {err}"))?,
            treatments: serde_json::from_value(self.treatments)
                .map_err(|err| format!("deserialise treatments: {err}"))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for the cases table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = cases)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CaseRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub vet_id: Option<Uuid>,
    pub animal_id: Option<Uuid>,
    pub animal_type: String,
    pub symptoms: Vec<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Case> for CaseRow {
    fn from(case: &Case) -> Self {
        Self {
            id: case.id,
            owner_id: *case.owner_id.as_uuid(),
            vet_id: case.vet_id.map(|id| *id.as_uuid()),
            animal_id: case.animal_id,
            animal_type: case.animal_type.clone(),
            symptoms: case.symptoms.clone(),
            notes: case.notes.clone(),
            location: case.location.clone(),
            district: case.district.clone(),
            latitude: case.latitude,
            longitude: case.longitude,
            status: case.status.as_str().to_owned(),
            created_at: case.created_at,
            updated_at: case.updated_at,
        }
    }
}

impl CaseRow {
    pub fn into_case(self) -> Result<Case, String> {
        let status = CaseStatus::parse(&self.status).ok_or_else(|| unknown("status", &self.status))?;
        Ok(Case {
            id: self.id,
            owner_id: UserId::from_uuid(self.owner_id),
            vet_id: self.vet_id.map(UserId::from_uuid),
            animal_id: self.animal_id,
            animal_type: self.animal_type,
            symptoms: self.symptoms,
            notes: self.notes,
            location: self.location,
            district: self.district,
            latitude: self.latitude,
            longitude: self.longitude,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for the vet_profiles table, excluding the availability document.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = vet_profiles)]
#[diesel(primary_key(user_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VetProfileRow {
    pub user_id: Uuid,
    pub name: String,
    pub clinic_name: String,
    pub license_number: String,
    pub specializations: Vec<String>,
    pub services: Vec<String>,
    pub is_24x7: bool,
    pub farm_visits: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub avg_rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&VetProfile> for VetProfileRow {
    fn from(vet: &VetProfile) -> Self {
        Self {
            user_id: *vet.user_id.as_uuid(),
            name: vet.name.clone(),
            clinic_name: vet.clinic_name.clone(),
            license_number: vet.license_number.clone(),
            specializations: vet.specializations.clone(),
            services: vet.services.clone(),
            is_24x7: vet.is_24x7,
            farm_visits: vet.farm_visits,
            latitude: vet.latitude,
            longitude: vet.longitude,
            address: vet.address.clone(),
            district: vet.district.clone(),
            status: vet.status.as_str().to_owned(),
            rejection_reason: vet.rejection_reason.clone(),
            avg_rating: vet.avg_rating,
            review_count: i32::try_from(vet.review_count).unwrap_or(i32::MAX),
            created_at: vet.created_at,
            updated_at: vet.updated_at,
        }
    }
}

impl VetProfileRow {
    pub fn into_profile(self) -> Result<VetProfile, String> {
        let status = VetStatus::parse(&self.status).ok_or_else(|| unknown("status", &self.status))?;
        Ok(VetProfile {
            user_id: UserId::from_uuid(self.user_id),
            name: self.name,
            clinic_name: self.clinic_name,
            license_number: self.license_number,
            specializations: self.specializations,
            services: self.services,
            is_24x7: self.is_24x7,
            farm_visits: self.farm_visits,
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address,
            district: self.district,
            status,
            rejection_reason: self.rejection_reason,
            avg_rating: self.avg_rating,
            review_count: u32::try_from(self.review_count).unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for the bookings table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub vet_id: Uuid,
    pub case_id: Option<Uuid>,
    pub visit_type: String,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            owner_id: *booking.owner_id.as_uuid(),
            vet_id: *booking.vet_id.as_uuid(),
            case_id: booking.case_id,
            visit_type: booking.visit_type.as_str().to_owned(),
            scheduled_at: booking.scheduled_at,
            notes: booking.notes.clone(),
            status: booking.status.as_str().to_owned(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

impl BookingRow {
    pub fn into_booking(self) -> Result<Booking, String> {
        Ok(Booking {
            id: self.id,
            owner_id: UserId::from_uuid(self.owner_id),
            vet_id: UserId::from_uuid(self.vet_id),
            case_id: self.case_id,
            visit_type: VisitType::parse(&self.visit_type)
                .ok_or_else(|| unknown("visit_type", &self.visit_type))?,
            scheduled_at: self.scheduled_at,
            notes: self.notes,
            status: BookingStatus::parse(&self.status)
                .ok_or_else(|| unknown("status", &self.status))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

/// Row struct for the products table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
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

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            seller_id: *product.seller_id.as_uuid(),
            category: product.category.as_str().to_owned(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
            currency: product.currency.clone(),
            stock_qty: product.stock_qty,
            latitude: product.latitude,
            longitude: product.longitude,
            district: product.district.clone(),
            is_active: product.is_active,
            verified: product.verified,
            recommended: product.recommended,
            is_flagged: product.is_flagged,
            admin_note: product.admin_note.clone(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl ProductRow {
    pub fn into_product(self) -> Result<Product, String> {
        Ok(Product {
            id: self.id,
            seller_id: UserId::from_uuid(self.seller_id),
            category: ProductCategory::parse(&self.category)
                .ok_or_else(|| unknown("category", &self.category))?,
            title: self.title,
            description: self.description,
            price: self.price,
            currency: self.currency,
            stock_qty: self.stock_qty,
            latitude: self.latitude,
            longitude: self.longitude,
            district: self.district,
            is_active: self.is_active,
            verified: self.verified,
            recommended: self.recommended,
            is_flagged: self.is_flagged,
            admin_note: self.admin_note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for the seller_profiles table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = seller_profiles)]
#[diesel(primary_key(user_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SellerProfileRow {
    pub user_id: Uuid,
    pub store_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub district: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SellerProfile> for SellerProfileRow {
    fn from(profile: &SellerProfile) -> Self {
        Self {
            user_id: *profile.user_id.as_uuid(),
            store_name: profile.store_name.clone(),
            contact_email: profile.contact_email.as_ref().map(|e| e.as_ref().to_owned()),
            contact_phone: profile.contact_phone.as_ref().map(|p| p.as_ref().to_owned()),
            district: profile.district.clone(),
            updated_at: profile.updated_at,
        }
    }
}

impl SellerProfileRow {
    pub fn into_profile(self) -> Result<SellerProfile, String> {
        Ok(SellerProfile {
            user_id: UserId::from_uuid(self.user_id),
            store_name: self.store_name,
            contact_email: self
                .contact_email
                .map(|raw| EmailAddress::new(raw).map_err(|err| err.to_string()))
                .transpose()?,
            contact_phone: self
                .contact_phone
                .map(|raw| PhoneNumber::new(raw).map_err(|err| err.to_string()))
                .transpose()?,
            district: self.district,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for the orders table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub total_price: i64,
    pub delivery_option: String,
    pub delivery_district: Option<String>,
    pub delivery_address: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the order_items table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderItemRow {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    pub product_name: String,
    pub qty: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

impl OrderItemRow {
    /// Bucket item rows by their order id.
    pub fn group_by_order(items: Vec<Self>) -> HashMap<Uuid, Vec<Self>> {
        let mut grouped: HashMap<Uuid, Vec<Self>> = HashMap::new();
        for item in items {
            grouped.entry(item.order_id).or_default().push(item);
        }
        grouped
    }
}

impl OrderRow {
    pub fn split(order: &Order) -> (Self, Vec<OrderItemRow>) {
        let row = Self {
            id: order.id,
            buyer_id: *order.buyer_id.as_uuid(),
            seller_id: *order.seller_id.as_uuid(),
            total_price: order.total_price,
            delivery_option: order.delivery_option.as_str().to_owned(),
            delivery_district: order.delivery_district.clone(),
            delivery_address: order.delivery_address.clone(),
            status: order.status.as_str().to_owned(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        };
        let items = order
            .items
            .iter()
            .zip(0_i32..)
            .map(|(item, position)| OrderItemRow {
                order_id: order.id,
                product_id: item.product_id,
                position,
                product_name: item.product_name.clone(),
                qty: item.qty,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
            })
            .collect();
        (row, items)
    }

    /// Rebuild an order from its row and item rows (in any order).
    pub fn into_order(self, mut items: Vec<OrderItemRow>) -> Result<Order, String> {
        items.sort_by_key(|item| item.position);
        Ok(Order {
            id: self.id,
            buyer_id: UserId::from_uuid(self.buyer_id),
            seller_id: UserId::from_uuid(self.seller_id),
            items: items
                .into_iter()
                .map(|item| OrderItem {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    qty: item.qty,
                    unit_price: item.unit_price,
                    subtotal: item.subtotal,
                })
                .collect(),
            total_price: self.total_price,
            delivery_option: DeliveryOption::parse(&self.delivery_option)
                .ok_or_else(|| unknown("delivery_option", &self.delivery_option))?,
            delivery_district: self.delivery_district,
            delivery_address: self.delivery_address,
            status: OrderStatus::parse(&self.status)
                .ok_or_else(|| unknown("status", &self.status))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// Row struct for the notifications table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub payload: Option<serde_json::Value>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationRow {
    pub fn from_notification(notification: &Notification) -> Result<Self, String> {
        Ok(Self {
            id: notification.id,
            user_id: *notification.user_id.as_uuid(),
            kind: notification.kind.as_str().to_owned(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            payload: notification
                .payload
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|err| format!("serialise payload: {err}"))?,
            read: notification.read,
            created_at: notification.created_at,
        })
    }

    pub fn into_notification(self) -> Result<Notification, String> {
        let payload: Option<NotificationPayload> = self
            .payload
            .map(serde_json::from_value)
            .transpose()
            .map_err(|err| format!("deserialise payload: {err}"))?;
        Ok(Notification {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            kind: NotificationType::parse(&self.kind).ok_or_else(|| unknown("kind", &self.kind))?,
            title: self.title,
            message: self.message,
            payload,
            read: self.read,
            created_at: self.created_at,
        })
    }
}
