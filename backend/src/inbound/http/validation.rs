//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers accept identifiers, enum filters, and timestamps as raw strings
//! so a malformed value produces the structured `invalid_request` envelope
//! rather than a framework-generated 404.

use chrono::{DateTime, Utc};
use pagination::{PageParams, PageParamsError};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    CredentialValidationError, Error, GeoError, ProximityFilter, UserId, UserValidationError,
    invalid_field,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    InvalidValue,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    invalid_field(
        field,
        ErrorCode::InvalidUuid.as_str(),
        format!("{field} must be a valid UUID"),
        Some(json!(value)),
    )
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    parse_uuid(value, field).map(UserId::from_uuid)
}

pub(crate) fn parse_rfc3339_timestamp(value: &str, field: FieldName) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            let name = field.as_str();
            invalid_field(
                name,
                ErrorCode::InvalidTimestamp.as_str(),
                format!("{name} must be an RFC 3339 timestamp"),
                Some(json!(value)),
            )
        })
}

/// Parse an optional enum-valued parameter with the type's own parser.
pub(crate) fn parse_optional<T>(
    value: Option<&str>,
    field: FieldName,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse(raw).map(Some).ok_or_else(|| {
            let name = field.as_str();
            invalid_field(
                name,
                ErrorCode::InvalidValue.as_str(),
                format!("{name} has an unsupported value"),
                Some(json!(raw)),
            )
        }),
    }
}

/// Parse a mandatory enum-valued field; blank input is reported as missing.
pub(crate) fn parse_required<T>(
    value: &str,
    field: FieldName,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, Error> {
    parse_optional(Some(value), field, parse)?.ok_or_else(|| {
        let name = field.as_str();
        invalid_field(name, "required", format!("{name} is required"), None)
    })
}

/// Validate `page`/`pageSize` query parameters.
pub(crate) fn page_params(page: Option<u32>, page_size: Option<u32>) -> Result<PageParams, Error> {
    PageParams::new(page, page_size).map_err(|err| {
        let field = match err {
            PageParamsError::PageOutOfRange { .. } => "page",
            PageParamsError::PageSizeOutOfRange { .. } => "pageSize",
        };
        invalid_field(field, ErrorCode::OutOfRange.as_str(), err.to_string(), None)
    })
}

/// Validate the `latitude`/`longitude`/`radiusKm` trio used by searches.
pub(crate) fn proximity(
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_km: Option<f64>,
) -> Result<Option<ProximityFilter>, Error> {
    ProximityFilter::from_query(latitude, longitude, radius_km).map_err(|err| {
        let field = match err {
            GeoError::Latitude(_) | GeoError::Incomplete => "latitude",
            GeoError::Longitude(_) => "longitude",
            GeoError::Radius => "radiusKm",
        };
        invalid_field(field, ErrorCode::OutOfRange.as_str(), err.to_string(), None)
    })
}

/// Map account value-object failures onto the offending field.
pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match &err {
        UserValidationError::InvalidId => ("id", "invalid_uuid"),
        UserValidationError::NameLength { .. } => ("name", "length"),
        UserValidationError::InvalidEmail => ("email", "invalid_email"),
        UserValidationError::InvalidPhone => ("phone", "invalid_phone"),
        UserValidationError::UnknownRole(_) => ("role", "invalid_value"),
    };
    invalid_field(field, code, err.to_string(), None)
}

pub(crate) fn map_credential_error(err: CredentialValidationError) -> Error {
    let (field, code) = match err {
        CredentialValidationError::InvalidEmail => ("email", "invalid_email"),
        CredentialValidationError::EmptyPassword => ("password", "empty_password"),
        CredentialValidationError::PasswordLength => ("password", "length"),
    };
    invalid_field(field, code, err.to_string(), None)
}
