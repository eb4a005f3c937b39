use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::geometry::Vector3;
use crate::predict::error::PredictError;
use crate::predict::types::{LookAngles, StateVector};
use crate::predict::GroundStation;

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

/// Greenwich mean sidereal time in radians.
pub fn gmst(timestamp: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()))
}

pub fn propagate_state(
    elements: &Elements,
    constants: &Constants,
    timestamp: DateTime<Utc>,
) -> Result<StateVector, PredictError> {
    let minutes = elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let prediction = constants
        .propagate(minutes)
        .map_err(|e| PredictError::Propagation(e.to_string()))?;

    let position_teme = Vector3::from_array(prediction.position);
    let velocity_teme = Vector3::from_array(prediction.velocity);
    let sidereal = gmst(timestamp);

    Ok(StateVector {
        time: timestamp,
        position_teme,
        velocity_teme,
        position_ecef: teme_to_ecef_position(position_teme, sidereal),
        velocity_ecef: teme_to_ecef_velocity(position_teme, velocity_teme, sidereal),
    })
}

pub fn look_angles(station: &GroundStation, state: &StateVector) -> LookAngles {
    let dr = state.position_ecef - station.position_ecef_km();
    let range_km = dr.norm();

    let (east, north, up) = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    let azimuth = east.atan2(north).to_degrees().rem_euclid(360.0);
    let elevation = if range_km > 0.0 {
        (up / range_km).clamp(-1.0, 1.0).asin().to_degrees()
    } else {
        0.0
    };
    let range_rate_km_s = if range_km > 0.0 {
        state.velocity_ecef.dot(dr) / range_km
    } else {
        0.0
    };

    LookAngles {
        time: state.time,
        azimuth_deg: azimuth,
        elevation_deg: elevation,
        range_km,
        range_rate_km_s,
    }
}

pub fn teme_to_ecef_position(pos_teme: Vector3, gmst: f64) -> Vector3 {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    Vector3::new(
        pos_teme.x * cos_gmst + pos_teme.y * sin_gmst,
        -pos_teme.x * sin_gmst + pos_teme.y * cos_gmst,
        pos_teme.z,
    )
}

pub fn ecef_to_teme_position(pos_ecef: Vector3, gmst: f64) -> Vector3 {
    teme_to_ecef_position(pos_ecef, -gmst)
}

pub fn teme_to_ecef_velocity(pos_teme: Vector3, vel_teme: Vector3, gmst: f64) -> Vector3 {
    let pos = teme_to_ecef_position(pos_teme, gmst);
    let rotated = teme_to_ecef_position(vel_teme, gmst);
    let rotation = Vector3::new(
        -EARTH_ROTATION_RAD_S * pos.y,
        EARTH_ROTATION_RAD_S * pos.x,
        0.0,
    );
    rotated - rotation
}

pub fn ecef_to_enu(dr: Vector3, lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr.x + cos_lon * dr.y;
    let north = -sin_lat * cos_lon * dr.x - sin_lat * sin_lon * dr.y + cos_lat * dr.z;
    let up = cos_lat * cos_lon * dr.x + cos_lat * sin_lon * dr.y + sin_lat * dr.z;
    (east, north, up)
}
