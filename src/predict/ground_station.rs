use serde::Deserialize;

use crate::geometry::{spherical_to_cart, SphericalPoint, Vector3, EARTH_RADIUS_KM};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_m: f64,
    /// Elevation mask for passes and access windows
    #[serde(default)]
    pub min_elevation_deg: f64,
}

impl Default for GroundStation {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_m: 0.0,
            min_elevation_deg: 0.0,
        }
    }
}

impl GroundStation {
    /// Parses `"lat, lon"` in degrees.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() < 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=360.0).contains(&lon) {
            return None;
        }
        Some(Self {
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_m: altitude_m.unwrap_or(0.0),
            min_elevation_deg: 0.0,
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    /// Earth-fixed position on the spherical Earth
    pub fn position_ecef_km(&self) -> Vector3 {
        spherical_to_cart(SphericalPoint::new(
            EARTH_RADIUS_KM + self.altitude_m / 1000.0,
            self.lat_rad(),
            self.lon_rad(),
        ))
    }
}
