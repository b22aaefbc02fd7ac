//! Coordinates and great-circle distances for proximity searches.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Reasons a coordinate pair is rejected.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
    #[error("latitude and longitude must be supplied together")]
    Incomplete,
    #[error("radius must be a positive number of kilometres")]
    Radius,
}

/// Validated WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Validate a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a point from optional halves. Both or neither must be present.
    pub fn from_optional(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Self>, GeoError> {
        match (latitude, longitude) {
            (Some(lat), Some(lng)) => Self::new(lat, lng).map(Some),
            (None, None) => Ok(None),
            _ => Err(GeoError::Incomplete),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Search origin with an optional cut-off radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityFilter {
    pub origin: GeoPoint,
    pub radius_km: Option<f64>,
}

impl ProximityFilter {
    /// Validate query inputs. Returns `None` when no origin was supplied.
    ///
    /// A radius without an origin is rejected since it cannot be applied.
    pub fn from_query(
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius_km: Option<f64>,
    ) -> Result<Option<Self>, GeoError> {
        if let Some(radius) = radius_km
            && (!radius.is_finite() || radius <= 0.0)
        {
            return Err(GeoError::Radius);
        }
        match GeoPoint::from_optional(latitude, longitude)? {
            Some(origin) => Ok(Some(Self { origin, radius_km })),
            None if radius_km.is_some() => Err(GeoError::Incomplete),
            None => Ok(None),
        }
    }
}

/// Attach distances to `items`, drop those outside the radius, and sort by
/// ascending distance with unknown locations last.
///
/// Items without a location are kept only when no radius applies. The sort is
/// stable, so ties keep their incoming order.
pub fn rank_by_distance<T>(
    items: Vec<T>,
    filter: ProximityFilter,
    location: impl Fn(&T) -> Option<GeoPoint>,
) -> Vec<(T, Option<f64>)> {
    let mut ranked: Vec<(T, Option<f64>)> = items
        .into_iter()
        .map(|item| {
            let distance = location(&item).map(|point| haversine_km(filter.origin, point));
            (item, distance)
        })
        .filter(|(_, distance)| match (filter.radius_km, distance) {
            (Some(radius), Some(km)) => *km <= radius,
            (Some(_), None) => false,
            (None, _) => true,
        })
        .collect();
    ranked.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    ranked
}
