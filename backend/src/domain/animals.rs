//! Livestock records and their health history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{bounded_text, invalid_field, optional_text};
use crate::domain::{Error, UserId};

const SPECIES_MAX: usize = 50;
const SHORT_TEXT_MAX: usize = 100;
const NOTES_MAX: usize = 2000;
const URL_MAX: usize = 500;

/// Recorded sex of an animal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimalSex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl AnimalSex {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse the storage representation; unknown values map to `Unknown`.
    pub fn from_storage(raw: &str) -> Self {
        match raw {
            "MALE" => Self::Male,
            "FEMALE" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

/// A vaccine dose given to an animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationRecord {
    pub id: Uuid,
    pub vaccine: String,
    pub administered_on: NaiveDate,
    pub next_due_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// A treatment given to an animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecord {
    pub id: Uuid,
    pub treatment: String,
    pub administered_on: NaiveDate,
    pub notes: Option<String>,
}

/// An owner's animal with its embedded health history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: Uuid,
    pub owner_id: UserId,
    pub species: String,
    pub breed: Option<String>,
    pub name: Option<String>,
    pub sex: AnimalSex,
    /// Estimated date of birth.
    pub date_of_birth: Option<NaiveDate>,
    pub colour: Option<String>,
    pub tag_number: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub vaccinations: Vec<VaccinationRecord>,
    pub treatments: Vec<TreatmentRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated fields for a new animal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAnimal {
    pub species: String,
    pub breed: Option<String>,
    pub name: Option<String>,
    pub sex: Option<AnimalSex>,
    pub date_of_birth: Option<NaiveDate>,
    pub colour: Option<String>,
    pub tag_number: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for an animal. Blank text clears optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalPatch {
    pub species: Option<String>,
    pub breed: Option<String>,
    pub name: Option<String>,
    pub sex: Option<AnimalSex>,
    pub date_of_birth: Option<NaiveDate>,
    pub colour: Option<String>,
    pub tag_number: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

/// Owner-scoped list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalFilter {
    pub species: Option<String>,
    pub search: Option<String>,
}

impl AnimalFilter {
    /// Whether `animal` satisfies the filter. Matching is case-insensitive.
    pub fn matches(&self, animal: &Animal) -> bool {
        let species_ok = self
            .species
            .as_deref()
            .is_none_or(|species| animal.species.eq_ignore_ascii_case(species.trim()));
        let search_ok = self.search.as_deref().map(str::trim).is_none_or(|needle| {
            let needle = needle.to_lowercase();
            [animal.name.as_deref(), animal.tag_number.as_deref(), animal.breed.as_deref()]
                .into_iter()
                .flatten()
                .any(|value| value.to_lowercase().contains(&needle))
        });
        species_ok && search_ok
    }
}

fn check_birth_date(date_of_birth: Option<NaiveDate>, today: NaiveDate) -> Result<(), Error> {
    match date_of_birth {
        Some(date) if date > today => Err(invalid_field(
            "dateOfBirth",
            "in_future",
            "dateOfBirth must not be in the future",
            Some(json!(date.to_string())),
        )),
        _ => Ok(()),
    }
}

impl Animal {
    /// Validate `input` and build a record owned by `owner_id`.
    pub fn create(
        owner_id: UserId,
        input: NewAnimal,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        check_birth_date(input.date_of_birth, now.date_naive())?;
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            species: bounded_text("species", &input.species, 1, SPECIES_MAX)?,
            breed: optional_text("breed", input.breed.as_deref(), SHORT_TEXT_MAX)?,
            name: optional_text("name", input.name.as_deref(), SHORT_TEXT_MAX)?,
            sex: input.sex.unwrap_or_default(),
            date_of_birth: input.date_of_birth,
            colour: optional_text("colour", input.colour.as_deref(), SHORT_TEXT_MAX)?,
            tag_number: optional_text("tagNumber", input.tag_number.as_deref(), SHORT_TEXT_MAX)?,
            photo_url: optional_text("photoUrl", input.photo_url.as_deref(), URL_MAX)?,
            notes: optional_text("notes", input.notes.as_deref(), NOTES_MAX)?,
            vaccinations: Vec::new(),
            treatments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a validated partial update.
    pub fn apply_patch(&mut self, patch: AnimalPatch, now: DateTime<Utc>) -> Result<(), Error> {
        check_birth_date(patch.date_of_birth, now.date_naive())?;
        let mut next = self.clone();
        if let Some(species) = patch.species.as_deref() {
            next.species = bounded_text("species", species, 1, SPECIES_MAX)?;
        }
        if let Some(breed) = patch.breed.as_deref() {
            next.breed = optional_text("breed", Some(breed), SHORT_TEXT_MAX)?;
        }
        if let Some(name) = patch.name.as_deref() {
            next.name = optional_text("name", Some(name), SHORT_TEXT_MAX)?;
        }
        if let Some(sex) = patch.sex {
            next.sex = sex;
        }
        if patch.date_of_birth.is_some() {
            next.date_of_birth = patch.date_of_birth;
        }
        if let Some(colour) = patch.colour.as_deref() {
            next.colour = optional_text("colour", Some(colour), SHORT_TEXT_MAX)?;
        }
        if let Some(tag) = patch.tag_number.as_deref() {
            next.tag_number = optional_text("tagNumber", Some(tag), SHORT_TEXT_MAX)?;
        }
        if let Some(url) = patch.photo_url.as_deref() {
            next.photo_url = optional_text("photoUrl", Some(url), URL_MAX)?;
        }
        if let Some(notes) = patch.notes.as_deref() {
            next.notes = optional_text("notes", Some(notes), NOTES_MAX)?;
        }
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

/// Unvalidated vaccination entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVaccination {
    pub vaccine: String,
    pub administered_on: NaiveDate,
    pub next_due_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewVaccination {
    /// Validate into a stored record.
    pub fn into_record(self) -> Result<VaccinationRecord, Error> {
        if let Some(due) = self.next_due_on
            && due < self.administered_on
        {
            return Err(invalid_field(
                "nextDueOn",
                "before_administered",
                "nextDueOn must not precede administeredOn",
                Some(json!(due.to_string())),
            ));
        }
        Ok(VaccinationRecord {
            id: Uuid::new_v4(),
            vaccine: bounded_text("vaccine", &self.vaccine, 1, SHORT_TEXT_MAX)?,
            administered_on: self.administered_on,
            next_due_on: self.next_due_on,
            notes: optional_text("notes", self.notes.as_deref(), NOTES_MAX)?,
        })
    }
}

/// Unvalidated treatment entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTreatment {
    pub treatment: String,
    pub administered_on: NaiveDate,
    pub notes: Option<String>,
}

impl NewTreatment {
    /// Validate into a stored record.
    pub fn into_record(self) -> Result<TreatmentRecord, Error> {
        Ok(TreatmentRecord {
            id: Uuid::new_v4(),
            treatment: bounded_text("treatment", &self.treatment, 1, SHORT_TEXT_MAX)?,
            administered_on: self.administered_on,
            notes: optional_text("notes", self.notes.as_deref(), NOTES_MAX)?,
        })
    }
}
