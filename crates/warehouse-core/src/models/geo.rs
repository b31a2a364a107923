//! Great-circle distance helpers.
//!
//! SQLite has no trigonometric functions by default, so every geotagged image row stores
//! the sines and cosines of its coordinates. The cosine of the central angle between two
//! points is then pure arithmetic (spherical law of cosines):
//!
//! `cos c = sin φ1 · sin φ2 + cos φ1 · cos φ2 · (cos λ1 · cos λ2 + sin λ1 · sin λ2)`
//!
//! A radius filter becomes `cos c >= cos(radius / R)` and ordering by distance ascending
//! is ordering by `cos c` descending.

use crate::error::AppError;

/// Mean Earth radius used for all distance calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A coordinate pre-decomposed into the terms the SQL distance expression needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalPoint {
    pub sin_lat: f64,
    pub cos_lat: f64,
    pub sin_lon: f64,
    pub cos_lon: f64,
}

impl SphericalPoint {
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        let (phi, lambda) = (lat.to_radians(), lon.to_radians());
        Self {
            sin_lat: phi.sin(),
            cos_lat: phi.cos(),
            sin_lon: lambda.sin(),
            cos_lon: lambda.cos(),
        }
    }

    /// Cosine of the central angle between two points.
    pub fn central_cos(&self, other: &SphericalPoint) -> f64 {
        self.sin_lat * other.sin_lat
            + self.cos_lat
                * other.cos_lat
                * (self.cos_lon * other.cos_lon + self.sin_lon * other.sin_lon)
    }

    pub fn distance_km(&self, other: &SphericalPoint) -> f64 {
        cos_to_km(self.central_cos(other))
    }
}

/// Convert a central-angle cosine into kilometres along the surface.
pub fn cos_to_km(cos: f64) -> f64 {
    EARTH_RADIUS_KM * cos.clamp(-1.0, 1.0).acos()
}

/// A validated "within `radius_km` of (lat, lon)" filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFilter {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

impl GeoFilter {
    pub fn new(lat: f64, lon: f64, radius_km: f64) -> Result<Self, AppError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::InvalidInput(format!(
                "nearLat must be between -90 and 90, got {}",
                lat
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::InvalidInput(format!(
                "nearLon must be between -180 and 180, got {}",
                lon
            )));
        }
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(AppError::InvalidInput(
                "radius must be a positive number of kilometres".to_string(),
            ));
        }
        Ok(Self {
            lat,
            lon,
            radius_km,
        })
    }

    pub fn center(&self) -> SphericalPoint {
        SphericalPoint::from_degrees(self.lat, self.lon)
    }

    /// Smallest central-angle cosine a row may have to fall inside the radius.
    pub fn min_cos(&self) -> f64 {
        let angle = (self.radius_km / EARTH_RADIUS_KM).min(std::f64::consts::PI);
        angle.cos()
    }
}
