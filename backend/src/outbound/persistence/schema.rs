//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Registered accounts. `email` and `phone` carry unique constraints.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        /// One of OWNER, VET, SELLER, ADMIN.
        role -> Varchar,
        is_active -> Bool,
        /// Argon2id PHC string.
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Optional location and avatar details, one row per account.
    user_profiles (user_id) {
        user_id -> Uuid,
        district -> Nullable<Varchar>,
        region -> Nullable<Varchar>,
        address_text -> Nullable<Varchar>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        avatar_url -> Nullable<Varchar>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issued password reset tokens, keyed by their SHA-256 digest.
    password_reset_tokens (token_digest) {
        token_digest -> Varchar,
        user_id -> Uuid,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
        used_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Livestock records. Health history is stored as JSONB arrays.
    animals (id) {
        id -> Uuid,
        owner_id -> Uuid,
        species -> Varchar,
        breed -> Nullable<Varchar>,
        name -> Nullable<Varchar>,
        sex -> Varchar,
        date_of_birth -> Nullable<Date>,
        colour -> Nullable<Varchar>,
        tag_number -> Nullable<Varchar>,
        photo_url -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        vaccinations -> Jsonb,
        treatments -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Health cases raised by owners.
    cases (id) {
        id -> Uuid,
        owner_id -> Uuid,
        vet_id -> Nullable<Uuid>,
        animal_id -> Nullable<Uuid>,
        animal_type -> Varchar,
        symptoms -> Array<Text>,
        notes -> Nullable<Text>,
        location -> Nullable<Varchar>,
        district -> Nullable<Varchar>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        /// One of SUBMITTED, UNDER_REVIEW, CLOSED.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Vet directory entries, keyed by the vet's account id.
    vet_profiles (user_id) {
        user_id -> Uuid,
        name -> Varchar,
        clinic_name -> Varchar,
        license_number -> Varchar,
        specializations -> Array<Text>,
        services -> Array<Text>,
        is_24x7 -> Bool,
        farm_visits -> Bool,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        address -> Nullable<Varchar>,
        district -> Nullable<Varchar>,
        /// One of PENDING, APPROVED, REJECTED.
        status -> Varchar,
        rejection_reason -> Nullable<Text>,
        avg_rating -> Float8,
        review_count -> Int4,
        /// Weekly schedule document; NULL until the vet publishes one.
        availability -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Appointment requests between owners and vets.
    bookings (id) {
        id -> Uuid,
        owner_id -> Uuid,
        vet_id -> Uuid,
        case_id -> Nullable<Uuid>,
        visit_type -> Varchar,
        scheduled_at -> Timestamptz,
        notes -> Nullable<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Marketplace listings. Prices are whole shillings.
    products (id) {
        id -> Uuid,
        seller_id -> Uuid,
        category -> Varchar,
        title -> Varchar,
        description -> Nullable<Text>,
        price -> Int8,
        currency -> Varchar,
        stock_qty -> Int4,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        district -> Nullable<Varchar>,
        is_active -> Bool,
        verified -> Bool,
        recommended -> Bool,
        is_flagged -> Bool,
        admin_note -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Seller storefront details, one row per seller.
    seller_profiles (user_id) {
        user_id -> Uuid,
        store_name -> Varchar,
        contact_email -> Nullable<Varchar>,
        contact_phone -> Nullable<Varchar>,
        district -> Nullable<Varchar>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Orders, one per seller.
    orders (id) {
        id -> Uuid,
        buyer_id -> Uuid,
        seller_id -> Uuid,
        total_price -> Int8,
        delivery_option -> Varchar,
        delivery_district -> Nullable<Varchar>,
        delivery_address -> Nullable<Varchar>,
        /// One of pending, confirmed, packed, dispatched, delivered, cancelled.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Priced order lines captured at placement time.
    order_items (order_id, product_id) {
        order_id -> Uuid,
        product_id -> Uuid,
        position -> Int4,
        product_name -> Varchar,
        qty -> Int4,
        unit_price -> Int8,
        subtotal -> Int8,
    }
}

diesel::table! {
    /// In-app notification inbox entries.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Varchar,
        title -> Varchar,
        message -> Text,
        payload -> Nullable<Jsonb>,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Platform key/value settings.
    platform_settings (key) {
        key -> Varchar,
        value -> Varchar,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(order_items -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    user_profiles,
    password_reset_tokens,
    animals,
    cases,
    vet_profiles,
    bookings,
    products,
    seller_profiles,
    orders,
    order_items,
    notifications,
    platform_settings,
);
