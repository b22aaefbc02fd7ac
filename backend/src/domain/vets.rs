//! Vet directory entries and weekly availability.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::validation::{bounded_text, invalid_field, optional_text};
use crate::domain::{Error, GeoPoint, ProximityFilter, UserId};

const LIST_MAX: usize = 20;
const TAG_MAX: usize = 60;

/// Verification state of a vet directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VetStatus {
    Pending,
    Approved,
    Rejected,
}

impl VetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for VetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public directory entry for a veterinarian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VetProfile {
    pub user_id: UserId,
    /// Account display name.
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
    pub status: VetStatus,
    pub rejection_reason: Option<String>,
    pub avg_rating: f64,
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Directory entry annotated with distance from the search origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VetListing {
    #[serde(flatten)]
    pub profile: VetProfile,
    pub distance_km: Option<f64>,
}

/// Full replacement of the editable profile fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VetProfileInput {
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
}

fn tag_list(field: &str, raw: Vec<String>) -> Result<Vec<String>, Error> {
    let mut tags: Vec<String> = Vec::new();
    for item in raw {
        let trimmed = item.trim();
        if trimmed.is_empty() || tags.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
            continue;
        }
        tags.push(bounded_text(field, trimmed, 1, TAG_MAX)?);
    }
    if tags.len() > LIST_MAX {
        return Err(invalid_field(
            field,
            "too_many",
            format!("{field} may list at most {LIST_MAX} entries"),
            Some(json!(tags.len())),
        ));
    }
    Ok(tags)
}

impl VetProfile {
    /// Create or replace a vet's directory entry.
    ///
    /// New entries start as `PENDING`. Changing the licence number of an
    /// approved entry, or resubmitting a rejected one, returns it to
    /// `PENDING` for review.
    pub fn upsert(
        existing: Option<VetProfile>,
        user_id: UserId,
        name: &str,
        input: VetProfileInput,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let point = GeoPoint::from_optional(input.latitude, input.longitude).map_err(|err| {
            invalid_field("latitude", "invalid_coordinates", err.to_string(), None)
        })?;
        let clinic_name = bounded_text("clinicName", &input.clinic_name, 2, 120)?;
        let license_number = bounded_text("licenseNumber", &input.license_number, 3, 60)?;
        let specializations = tag_list("specializations", input.specializations)?;
        let services = tag_list("services", input.services)?;
        let address = optional_text("address", input.address.as_deref(), 200)?;
        let district = optional_text("district", input.district.as_deref(), 100)?;

        let (status, rejection_reason, avg_rating, review_count, created_at) = match existing {
            None => (VetStatus::Pending, None, 0.0, 0, now),
            Some(previous) => {
                let status = match previous.status {
                    VetStatus::Approved if previous.license_number != license_number => {
                        VetStatus::Pending
                    }
                    VetStatus::Rejected => VetStatus::Pending,
                    other => other,
                };
                let reason = (status == VetStatus::Rejected)
                    .then_some(previous.rejection_reason)
                    .flatten();
                (
                    status,
                    reason,
                    previous.avg_rating,
                    previous.review_count,
                    previous.created_at,
                )
            }
        };

        Ok(Self {
            user_id,
            name: name.to_owned(),
            clinic_name,
            license_number,
            specializations,
            services,
            is_24x7: input.is_24x7,
            farm_visits: input.farm_visits,
            latitude: point.map(|p| p.latitude()),
            longitude: point.map(|p| p.longitude()),
            address,
            district,
            status,
            rejection_reason,
            avg_rating,
            review_count,
            created_at,
            updated_at: now,
        })
    }

    /// Stored location, when both coordinates are present and valid.
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_optional(self.latitude, self.longitude)
            .ok()
            .flatten()
    }
}

/// Directory search criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VetSearch {
    /// Free text matched against name, clinic, and district.
    pub query: Option<String>,
    pub district: Option<String>,
    pub specialization: Option<String>,
    pub farm_visits: Option<bool>,
    pub is_24x7: Option<bool>,
    pub proximity: Option<ProximityFilter>,
}

impl VetSearch {
    /// Apply the non-geographic filters. Status is not checked here.
    pub fn matches(&self, vet: &VetProfile) -> bool {
        let query_ok = self.query.as_deref().map(str::trim).is_none_or(|q| {
            let needle = q.to_lowercase();
            [Some(vet.name.as_str()), Some(vet.clinic_name.as_str()), vet.district.as_deref()]
                .into_iter()
                .flatten()
                .any(|value| value.to_lowercase().contains(&needle))
        });
        let district_ok = self.district.as_deref().is_none_or(|d| {
            vet.district
                .as_deref()
                .is_some_and(|own| own.eq_ignore_ascii_case(d.trim()))
        });
        let specialization_ok = self.specialization.as_deref().is_none_or(|s| {
            vet.specializations
                .iter()
                .any(|own| own.eq_ignore_ascii_case(s.trim()))
        });
        let farm_ok = self.farm_visits.is_none_or(|wanted| vet.farm_visits == wanted);
        let always_open_ok = self.is_24x7.is_none_or(|wanted| vet.is_24x7 == wanted);
        query_ok && district_ok && specialization_ok && farm_ok && always_open_ok
    }
}

/// Day of the week keyed by its three-letter abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

/// Opening window in local `HH:MM` time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSlot {
    #[schema(example = "08:00")]
    pub start: String,
    #[schema(example = "12:30")]
    pub end: String,
}

fn parse_clock(day: Weekday, raw: &str) -> Result<NaiveTime, Error> {
    let strict = raw.len() == 5 && raw.as_bytes().get(2) == Some(&b':');
    strict
        .then(|| NaiveTime::parse_from_str(raw, "%H:%M").ok())
        .flatten()
        .ok_or_else(|| {
            invalid_field(
                "weeklySchedule",
                "invalid_time",
                format!("times must use HH:MM ({day:?})"),
                Some(json!(raw)),
            )
        })
}

/// Weekly opening hours and visit options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub weekly_schedule: BTreeMap<Weekday, Vec<TimeSlot>>,
    pub accept_farm_visits: bool,
    pub is_emergency_247: bool,
}

impl Availability {
    /// Check every slot and return the schedule with each day sorted.
    pub fn validate(mut self) -> Result<Self, Error> {
        for (day, slots) in &mut self.weekly_schedule {
            let mut parsed = Vec::with_capacity(slots.len());
            for slot in slots.iter() {
                let start = parse_clock(*day, &slot.start)?;
                let end = parse_clock(*day, &slot.end)?;
                if start >= end {
                    return Err(invalid_field(
                        "weeklySchedule",
                        "empty_slot",
                        format!("slot start must precede its end ({day:?})"),
                        Some(json!({ "start": slot.start, "end": slot.end })),
                    ));
                }
                parsed.push((start, end, slot.clone()));
            }
            parsed.sort_by_key(|(start, _, _)| *start);
            if let Some(pair) = parsed.windows(2).find(|pair| pair[1].0 < pair[0].1) {
                return Err(invalid_field(
                    "weeklySchedule",
                    "overlap",
                    format!("slots on {day:?} overlap"),
                    Some(json!([pair[0].2.start, pair[1].2.start])),
                ));
            }
            *slots = parsed.into_iter().map(|(_, _, slot)| slot).collect();
        }
        self.weekly_schedule.retain(|_, slots| !slots.is_empty());
        Ok(self)
    }
}
