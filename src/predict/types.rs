use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geometry::Vector3;
use crate::intervals::Interval;

/// Information about a single satellite from TLE
#[derive(Debug, Clone, Serialize)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u32,
    pub tle_source: String,
}

/// Position and velocity at one instant, in the TEME inertial frame and in
/// the Earth-fixed frame. Kilometres and km/s.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StateVector {
    pub time: DateTime<Utc>,
    pub position_teme: Vector3,
    pub velocity_teme: Vector3,
    pub position_ecef: Vector3,
    pub velocity_ecef: Vector3,
}

/// Topocentric look angles from a ground station
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LookAngles {
    pub time: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    pub range_rate_km_s: f64,
}

/// A predicted satellite pass
#[derive(Debug, Clone, Serialize)]
pub struct Pass {
    pub satellite: String,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub tca: DateTime<Utc>,
    pub max_elevation_deg: f64,
    pub aos_azimuth_deg: f64,
    pub los_azimuth_deg: f64,
    pub duration_seconds: i64,
}

/// Intervals found for one satellite
#[derive(Debug, Clone, Serialize)]
pub struct SatelliteWindows {
    pub satellite: String,
    pub windows: Vec<Interval<DateTime<Utc>>>,
}

/// Sunlit and eclipse intervals of one satellite over a search window
#[derive(Debug, Clone, Serialize)]
pub struct Lighting {
    pub satellite: String,
    pub sunlit: Vec<Interval<DateTime<Utc>>>,
    pub eclipse: Vec<Interval<DateTime<Utc>>>,
}
