//! Health cases raised by owners and reviewed by vets.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{bounded_text, invalid_field, optional_text};
use crate::domain::{Error, GeoPoint, UserId};

const MAX_SYMPTOMS: usize = 30;
const SYMPTOM_MAX: usize = 100;

/// Review state of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Submitted,
    UnderReview,
    Closed,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Closed => "CLOSED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SUBMITTED" => Some(Self::Submitted),
            "UNDER_REVIEW" => Some(Self::UnderReview),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symptoms as submitted: a JSON array or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SymptomsInput {
    List(Vec<String>),
    Text(String),
}

impl SymptomsInput {
    /// Trim entries, drop blanks, and require at least one symptom.
    pub fn normalise(self) -> Result<Vec<String>, Error> {
        let raw = match self {
            Self::List(items) => items,
            Self::Text(text) => text.split(',').map(str::to_owned).collect(),
        };
        let symptoms: Vec<String> = raw
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect();
        if symptoms.is_empty() {
            return Err(invalid_field(
                "symptoms",
                "required",
                "at least one symptom is required",
                None,
            ));
        }
        if symptoms.len() > MAX_SYMPTOMS {
            return Err(invalid_field(
                "symptoms",
                "too_many",
                format!("at most {MAX_SYMPTOMS} symptoms may be listed"),
                Some(json!(symptoms.len())),
            ));
        }
        if let Some(long) = symptoms.iter().find(|s| s.chars().count() > SYMPTOM_MAX) {
            return Err(invalid_field(
                "symptoms",
                "length",
                format!("each symptom must be at most {SYMPTOM_MAX} characters"),
                Some(json!(long)),
            ));
        }
        Ok(symptoms)
    }
}

/// A reported health problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: Uuid,
    pub owner_id: UserId,
    pub vet_id: Option<UserId>,
    pub animal_id: Option<Uuid>,
    pub animal_type: String,
    pub symptoms: Vec<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated case submission.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCase {
    pub animal_id: Option<Uuid>,
    pub animal_type: Option<String>,
    pub symptoms: SymptomsInput,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Visibility-independent list filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseFilter {
    pub animal_id: Option<Uuid>,
    pub status: Option<CaseStatus>,
}

/// Which cases a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseScope {
    Owner(UserId),
    Vet(UserId),
    All,
}

/// Result of a state-changing case command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
}

impl Case {
    /// Validate a submission. `animal_type` falls back to `species_hint`.
    pub fn create(
        owner_id: UserId,
        input: NewCase,
        species_hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let animal_type_raw = input
            .animal_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .or(species_hint)
            .unwrap_or_default();
        let point = GeoPoint::from_optional(input.latitude, input.longitude).map_err(|err| {
            invalid_field("latitude", "invalid_coordinates", err.to_string(), None)
        })?;
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            vet_id: None,
            animal_id: input.animal_id,
            animal_type: bounded_text("animalType", animal_type_raw, 1, 50)?,
            symptoms: input.symptoms.normalise()?,
            notes: optional_text("notes", input.notes.as_deref(), 2000)?,
            location: optional_text("location", input.location.as_deref(), 200)?,
            district: optional_text("district", input.district.as_deref(), 100)?,
            latitude: point.map(|p| p.latitude()),
            longitude: point.map(|p| p.longitude()),
            status: CaseStatus::Submitted,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether `user` may read this case.
    pub fn is_visible_to(&self, user: UserId, is_admin: bool) -> bool {
        is_admin || self.owner_id == user || self.vet_id == Some(user)
    }

    /// Assign a vet and move the case under review.
    pub fn assign(&mut self, vet_id: UserId, now: DateTime<Utc>) -> Result<Transition, Error> {
        if self.status == CaseStatus::Closed {
            return Err(Error::conflict("closed cases cannot be assigned"));
        }
        if self.vet_id == Some(vet_id) && self.status == CaseStatus::UnderReview {
            return Ok(Transition::Unchanged);
        }
        self.vet_id = Some(vet_id);
        self.status = CaseStatus::UnderReview;
        self.updated_at = now;
        Ok(Transition::Changed)
    }

    /// Close the case. Closing twice is a no-op.
    pub fn close(&mut self, now: DateTime<Utc>) -> Transition {
        if self.status == CaseStatus::Closed {
            return Transition::Unchanged;
        }
        self.status = CaseStatus::Closed;
        self.updated_at = now;
        Transition::Changed
    }
}
