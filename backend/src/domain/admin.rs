//! Platform administration: statistics, user management, and settings.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::invalid_field;
use crate::domain::{Booking, BookingStatus, Error, Order, Role, User, UserId};

/// Default reporting window for platform statistics.
pub const DEFAULT_STATS_DAYS: u32 = 30;
/// Number of recent bookings and orders included in statistics.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub days: u32,
    pub total_users: u64,
    pub active_users: u64,
    pub total_vets: u64,
    pub pending_vets: u64,
    pub total_products: u64,
    pub flagged_products: u64,
    pub total_bookings: u64,
    pub total_orders: u64,
    /// Totals of confirmed-or-later orders placed within `days`, in UGX.
    pub revenue: i64,
    pub recent_bookings: Vec<Booking>,
    pub recent_orders: Vec<Order>,
}

/// Days covered by a reports overview when no range is given.
pub const DEFAULT_REPORT_DAYS: u64 = 30;
/// Entries kept in each reports ranking.
pub const REPORT_TOP_LIMIT: usize = 10;

/// Inclusive range of UTC calendar days a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl ReportWindow {
    /// Fill missing bounds relative to `today` and check the range.
    ///
    /// `from` defaults to [`DEFAULT_REPORT_DAYS`] before `today` and `to` to
    /// `today`. The range may not run backwards or span more than `max_days`.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
        max_days: u32,
    ) -> Result<Self, Error> {
        let to = to.unwrap_or(today);
        let from = from
            .or_else(|| today.checked_sub_days(Days::new(DEFAULT_REPORT_DAYS)))
            .unwrap_or(NaiveDate::MIN);
        if from > to {
            return Err(invalid_field(
                "from",
                "out_of_range",
                "from must not be after to",
                Some(json!({ "from": from, "to": to })),
            ));
        }
        if (to - from).num_days() > i64::from(max_days) {
            return Err(invalid_field(
                "from",
                "out_of_range",
                format!("a report covers at most {max_days} days"),
                Some(json!({ "from": from, "to": to })),
            ));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// First instant inside the window.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.from.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant after the window.
    pub fn ends_before(&self) -> DateTime<Utc> {
        self.to
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.starts_at() && at < self.ends_before()
    }
}

/// Orders placed on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrdersByDay {
    pub date: NaiveDate,
    pub count: u64,
    /// Sum of order totals, in UGX.
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopSeller {
    pub id: UserId,
    pub name: String,
    pub orders: u64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: Uuid,
    pub title: String,
    /// Orders containing the product.
    pub orders: u64,
}

/// Admin analytics over a date range.
///
/// Orders of every status count towards the daily series and rankings.
/// `bookingsByStatus` covers all bookings, regardless of the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportsOverview {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub orders_by_day: Vec<OrdersByDay>,
    pub bookings_by_status: BTreeMap<String, u64>,
    pub top_sellers: Vec<TopSeller>,
    pub top_products: Vec<TopProduct>,
}

/// The facts about one order a report needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOrder {
    pub seller_id: UserId,
    pub created_at: DateTime<Utc>,
    pub total_price: i64,
    pub product_ids: Vec<Uuid>,
}

impl From<&Order> for ReportOrder {
    fn from(order: &Order) -> Self {
        Self {
            seller_id: order.seller_id,
            created_at: order.created_at,
            total_price: order.total_price,
            product_ids: order.items.iter().map(|item| item.product_id).collect(),
        }
    }
}

impl ReportsOverview {
    /// Aggregate `orders` falling inside `window` and per-status booking
    /// counts into an overview.
    ///
    /// Sellers and products the lookups cannot name are left out of the
    /// rankings. Rankings keep at most `top_limit` entries.
    pub fn tally<'a>(
        window: ReportWindow,
        orders: impl IntoIterator<Item = &'a ReportOrder>,
        booking_counts: impl IntoIterator<Item = (BookingStatus, u64)>,
        seller_name: impl Fn(&UserId) -> Option<String>,
        product_title: impl Fn(&Uuid) -> Option<String>,
        top_limit: usize,
    ) -> Self {
        let mut days: BTreeMap<NaiveDate, (u64, i64)> = BTreeMap::new();
        let mut sellers: HashMap<UserId, (u64, i64)> = HashMap::new();
        let mut products: HashMap<Uuid, u64> = HashMap::new();
        for order in orders.into_iter().filter(|o| window.contains(o.created_at)) {
            let day = days.entry(order.created_at.date_naive()).or_default();
            day.0 += 1;
            day.1 = day.1.saturating_add(order.total_price);
            let seller = sellers.entry(order.seller_id).or_default();
            seller.0 += 1;
            seller.1 = seller.1.saturating_add(order.total_price);
            for product_id in &order.product_ids {
                *products.entry(*product_id).or_default() += 1;
            }
        }

        let mut bookings_by_status: BTreeMap<String, u64> = BookingStatus::ALL
            .iter()
            .map(|status| (status.as_str().to_owned(), 0))
            .collect();
        for (status, count) in booking_counts {
            *bookings_by_status
                .entry(status.as_str().to_owned())
                .or_default() += count;
        }

        let mut top_sellers: Vec<TopSeller> = sellers
            .into_iter()
            .filter_map(|(id, (orders, total))| {
                seller_name(&id).map(|name| TopSeller {
                    id,
                    name,
                    orders,
                    total,
                })
            })
            .collect();
        top_sellers.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then(b.orders.cmp(&a.orders))
                .then_with(|| a.name.cmp(&b.name))
        });
        top_sellers.truncate(top_limit);

        let mut top_products: Vec<TopProduct> = products
            .into_iter()
            .filter_map(|(id, orders)| {
                product_title(&id).map(|title| TopProduct { id, title, orders })
            })
            .collect();
        top_products.sort_by(|a, b| b.orders.cmp(&a.orders).then_with(|| a.title.cmp(&b.title)));
        top_products.truncate(top_limit);

        Self {
            from: window.from,
            to: window.to,
            orders_by_day: days
                .into_iter()
                .map(|(date, (count, total))| OrdersByDay { date, count, total })
                .collect(),
            bookings_by_status,
            top_sellers,
            top_products,
        }
    }
}

/// Admin user list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAdminFilter {
    /// Matched against name, email, and phone.
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserAdminFilter {
    pub fn matches(&self, user: &User) -> bool {
        let search_ok = self.search.as_deref().map(str::trim).is_none_or(|q| {
            let needle = q.to_lowercase();
            user.name.as_ref().to_lowercase().contains(&needle)
                || user.email.as_ref().contains(&needle)
                || user
                    .phone
                    .as_ref()
                    .is_some_and(|phone| phone.as_ref().contains(&needle))
        });
        search_ok
            && self.role.is_none_or(|role| user.role == role)
            && self.is_active.is_none_or(|active| user.is_active == active)
    }
}

/// Account change applied by an admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserAdminUpdate {
    pub is_active: Option<bool>,
    pub role: Option<Role>,
}

/// Known platform setting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    PlatformFeePercent,
    MaxBookingDistanceKm,
    NotificationsEnabled,
    DefaultCurrency,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        Self::PlatformFeePercent,
        Self::MaxBookingDistanceKm,
        Self::NotificationsEnabled,
        Self::DefaultCurrency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlatformFeePercent => "platform_fee_percent",
            Self::MaxBookingDistanceKm => "max_booking_distance_km",
            Self::NotificationsEnabled => "notifications_enabled",
            Self::DefaultCurrency => "default_currency",
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            Self::PlatformFeePercent => "0",
            Self::MaxBookingDistanceKm => "50",
            Self::NotificationsEnabled => "true",
            Self::DefaultCurrency => "UGX",
        }
    }

    /// Check and normalise a value for this key.
    pub fn validate(self, raw: &str) -> Result<String, Error> {
        let value = raw.trim();
        let reject = |message: &str| {
            invalid_field(self.as_str(), "invalid_value", message, Some(json!(raw)))
        };
        match self {
            Self::PlatformFeePercent => match value.parse::<f64>() {
                Ok(n) if n.is_finite() && (0.0..=100.0).contains(&n) => Ok(value.to_owned()),
                _ => Err(reject("platform_fee_percent must be a number between 0 and 100")),
            },
            Self::MaxBookingDistanceKm => match value.parse::<f64>() {
                Ok(n) if n.is_finite() && n > 0.0 => Ok(value.to_owned()),
                _ => Err(reject("max_booking_distance_km must be a positive number")),
            },
            Self::NotificationsEnabled => value
                .parse::<bool>()
                .map(|b| b.to_string())
                .map_err(|_| reject("notifications_enabled must be true or false")),
            Self::DefaultCurrency => {
                if value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase()) {
                    Ok(value.to_owned())
                } else {
                    Err(reject("default_currency must be three uppercase letters"))
                }
            }
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                invalid_field("key", "unknown_setting", format!("unknown setting: {s}"), Some(json!(s)))
            })
    }
}

/// Effective platform settings, defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PlatformSettings(BTreeMap<String, String>);

impl Default for PlatformSettings {
    fn default() -> Self {
        Self(
            SettingKey::ALL
                .into_iter()
                .map(|key| (key.as_str().to_owned(), key.default_value().to_owned()))
                .collect(),
        )
    }
}

impl PlatformSettings {
    /// Overlay stored values on the defaults. Unknown stored keys are ignored.
    pub fn from_stored(stored: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut settings = Self::default();
        for (key, value) in stored {
            if key.parse::<SettingKey>().is_ok() {
                settings.0.insert(key, value);
            }
        }
        settings
    }

    pub fn get(&self, key: SettingKey) -> &str {
        self.0
            .get(key.as_str())
            .map_or(key.default_value(), String::as_str)
    }

    /// Whether new notifications should be stored.
    pub fn notifications_enabled(&self) -> bool {
        self.get(SettingKey::NotificationsEnabled) != "false"
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// Validate a settings update. Every key must be known.
pub fn validate_settings_update(
    updates: BTreeMap<String, String>,
) -> Result<Vec<(SettingKey, String)>, Error> {
    if updates.is_empty() {
        return Err(invalid_field("settings", "required", "no settings supplied", None));
    }
    updates
        .into_iter()
        .map(|(key, value)| {
            let key: SettingKey = key.parse()?;
            key.validate(&value).map(|v| (key, v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Settings validation, admin filters, and report aggregation.

    use super::*;
    use crate::domain::{EmailAddress, PersonName, UserId};
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[case(SettingKey::PlatformFeePercent, "12.5", true)]
    #[case(SettingKey::PlatformFeePercent, "101", false)]
    #[case(SettingKey::PlatformFeePercent, "-1", false)]
    #[case(SettingKey::MaxBookingDistanceKm, "0", false)]
    #[case(SettingKey::MaxBookingDistanceKm, "75", true)]
    #[case(SettingKey::NotificationsEnabled, "false", true)]
    #[case(SettingKey::NotificationsEnabled, "no", false)]
    #[case(SettingKey::DefaultCurrency, "KES", true)]
    #[case(SettingKey::DefaultCurrency, "ugx", false)]
    fn setting_values_are_validated(
        #[case] key: SettingKey,
        #[case] value: &str,
        #[case] ok: bool,
    ) {
        assert_eq!(key.validate(value).is_ok(), ok);
    }

    #[rstest]
    fn unknown_keys_are_rejected() {
        let err = validate_settings_update(BTreeMap::from([(
            "theme".to_owned(),
            "dark".to_owned(),
        )]))
        .expect_err("unknown key");
        assert_eq!(err.details().expect("details")["code"], "unknown_setting");
    }

    #[rstest]
    fn defaults_fill_gaps_in_stored_values() {
        let settings = PlatformSettings::from_stored([
            ("notifications_enabled".to_owned(), "false".to_owned()),
            ("legacy".to_owned(), "x".to_owned()),
        ]);
        assert!(!settings.notifications_enabled());
        assert_eq!(settings.get(SettingKey::DefaultCurrency), "UGX");
        assert_eq!(settings.as_map().len(), 4);
    }

    #[rstest]
    #[case(UserAdminFilter { search: Some("NAKATO".into()), ..UserAdminFilter::default() }, true)]
    #[case(UserAdminFilter { search: Some("0772".into()), ..UserAdminFilter::default() }, false)]
    #[case(UserAdminFilter { role: Some(Role::Vet), ..UserAdminFilter::default() }, false)]
    #[case(UserAdminFilter { is_active: Some(true), ..UserAdminFilter::default() }, true)]
    fn user_filter(#[case] filter: UserAdminFilter, #[case] expected: bool) {
        let user = User {
            id: UserId::random(),
            name: PersonName::new("Amina Nakato").expect("valid"),
            email: EmailAddress::new("amina@example.com").expect("valid"),
            phone: None,
            role: Role::Owner,
            is_active: true,
            created_at: Utc::now(),
        };
        assert_eq!(filter.matches(&user), expected);
    }

    fn day(raw: &str) -> NaiveDate {
        raw.parse().expect("valid date")
    }

    fn at(raw: &str) -> DateTime<Utc> {
        raw.parse().expect("valid timestamp")
    }

    #[rstest]
    fn report_window_defaults_to_the_last_thirty_days() {
        let window = ReportWindow::resolve(None, None, day("2026-05-31"), 365).expect("window");
        assert_eq!(window.from(), day("2026-05-01"));
        assert_eq!(window.to(), day("2026-05-31"));
        assert!(window.contains(at("2026-05-31T23:59:59Z")));
        assert!(!window.contains(at("2026-06-01T00:00:00Z")));
        assert!(!window.contains(at("2026-04-30T23:59:59Z")));
    }

    #[rstest]
    #[case(Some("2026-05-10"), Some("2026-05-09"))]
    #[case(Some("2024-01-01"), Some("2026-01-01"))]
    fn report_window_rejects_bad_ranges(#[case] from: Option<&str>, #[case] to: Option<&str>) {
        let err = ReportWindow::resolve(from.map(day), to.map(day), day("2026-05-31"), 365)
            .expect_err("bad range");
        assert_eq!(err.details().expect("details")["field"], "from");
    }

    #[rstest]
    fn tally_groups_orders_by_day_seller_and_product() {
        let window = ReportWindow::resolve(
            Some(day("2026-05-01")),
            Some(day("2026-05-02")),
            day("2026-05-31"),
            365,
        )
        .expect("window");
        let (big, small) = (UserId::random(), UserId::random());
        let (feed, salt) = (Uuid::new_v4(), Uuid::new_v4());
        let order = |seller, when, total, products: &[Uuid]| ReportOrder {
            seller_id: seller,
            created_at: at(when),
            total_price: total,
            product_ids: products.to_vec(),
        };
        let orders = [
            order(big, "2026-05-01T08:00:00Z", 90_000, &[feed, salt]),
            order(small, "2026-05-01T17:30:00Z", 10_000, &[salt]),
            order(big, "2026-05-02T09:00:00Z", 30_000, &[feed]),
            order(small, "2026-05-03T09:00:00Z", 500_000, &[salt]),
        ];
        let bookings = [(BookingStatus::Requested, 2), (BookingStatus::Completed, 1)];

        let report = ReportsOverview::tally(
            window,
            &orders,
            bookings,
            |id| Some(if *id == big { "Kato Feeds" } else { "Salt Depot" }.to_owned()),
            |id| (*id == feed).then(|| "Dairy meal".to_owned()),
            REPORT_TOP_LIMIT,
        );

        assert_eq!(
            report.orders_by_day,
            vec![
                OrdersByDay { date: day("2026-05-01"), count: 2, total: 100_000 },
                OrdersByDay { date: day("2026-05-02"), count: 1, total: 30_000 },
            ]
        );
        assert_eq!(report.top_sellers[0].id, big);
        assert_eq!((report.top_sellers[0].orders, report.top_sellers[0].total), (2, 120_000));
        assert_eq!(report.top_sellers[1].total, 10_000);
        assert_eq!(
            report.top_products,
            vec![TopProduct { id: feed, title: "Dairy meal".into(), orders: 2 }],
            "unnamed products are left out"
        );
        assert_eq!(report.bookings_by_status.len(), BookingStatus::ALL.len());
        assert_eq!(report.bookings_by_status["REQUESTED"], 2);
        assert_eq!(report.bookings_by_status["DECLINED"], 0);
    }
}
