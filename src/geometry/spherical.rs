use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::error::GeometryError;
use super::vector::{cart_to_spherical, Vector3};

/// Mean Earth radius; the Earth is modelled as a sphere throughout.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Planar map point, radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self::new(lon_deg.to_radians(), lat_deg.to_radians())
    }

    pub fn from_vector(v: Vector3) -> Result<Self, GeometryError> {
        let p = cart_to_spherical(v)?;
        Ok(Self::new(p.lon, p.lat))
    }

    /// `[lon, lat]` in degrees.
    pub fn to_degrees(self) -> [f64; 2] {
        [self.lon.to_degrees(), self.lat.to_degrees()]
    }
}

pub fn hav(theta: f64) -> f64 {
    (1.0 - theta.cos()) / 2.0
}

/// Inverse haversine; `None` outside `[0, 1]`.
pub fn archav(value: f64) -> Option<f64> {
    if (0.0..=1.0).contains(&value) {
        Some((1.0 - 2.0 * value).acos())
    } else {
        None
    }
}

/// Central angle between two points, haversine form.
pub fn great_circle_distance(a: LonLat, b: LonLat) -> f64 {
    let h = hav(b.lat - a.lat) + a.lat.cos() * b.lat.cos() * hav(b.lon - a.lon);
    2.0 * h.clamp(0.0, 1.0).sqrt().asin()
}

fn check_outside(distance_km: f64, radius_km: f64) -> Result<(), GeometryError> {
    if !(radius_km > 0.0) || !radius_km.is_finite() {
        return Err(GeometryError::invalid("radius_km", "must be positive"));
    }
    if !(distance_km >= radius_km) || !distance_km.is_finite() {
        return Err(GeometryError::invalid(
            "distance_km",
            format!("{distance_km} is not outside the sphere of radius {radius_km}"),
        ));
    }
    Ok(())
}

/// Central angle between the sub-satellite point and the horizon, i.e. the
/// angular radius of the visible disk on the ground.
pub fn horizon_central_angle(distance_km: f64, radius_km: f64) -> Result<f64, GeometryError> {
    check_outside(distance_km, radius_km)?;
    Ok((radius_km / distance_km).acos())
}

/// Apparent angular radius of the sphere seen from `distance_km`.
pub fn limb_half_angle(distance_km: f64, radius_km: f64) -> Result<f64, GeometryError> {
    check_outside(distance_km, radius_km)?;
    Ok((radius_km / distance_km).asin())
}

/// Central angle covered by a nadir cone of `half_angle` radians.
///
/// Law of sines in the triangle centre / satellite / cone edge; `None` when
/// the cone is wider than the limb and its edge misses the sphere.
pub fn sensor_ground_radius(
    half_angle: f64,
    distance_km: f64,
    radius_km: f64,
) -> Result<Option<f64>, GeometryError> {
    check_outside(distance_km, radius_km)?;
    if !(0.0..PI).contains(&half_angle) {
        return Err(GeometryError::invalid("half_angle", "must be in [0, π)"));
    }
    let ratio = half_angle.sin() / radius_km;
    let s = ratio * distance_km;
    if s > 1.0 {
        return Ok(None);
    }
    let angle_at_ground = PI - s.asin();
    Ok(Some(PI - angle_at_ground - half_angle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archav_inverts_hav() {
        for theta in [0.0, 0.3, 1.2, 2.9, PI] {
            let back = archav(hav(theta)).unwrap();
            assert!((back - theta).abs() < 1e-7, "{} -> {}", theta, back);
        }
    }

    #[test]
    fn test_archav_domain() {
        assert!(archav(-1e-9).is_none());
        assert!(archav(1.0 + 1e-9).is_none());
        assert!(archav(f64::NAN).is_none());
        assert!(archav(f64::INFINITY).is_none());
    }

    #[test]
    fn test_great_circle_quarter() {
        let d = great_circle_distance(LonLat::from_degrees(0.0, 0.0), LonLat::from_degrees(90.0, 0.0));
        assert!((d - PI / 2.0).abs() < 1e-12);
        let d = great_circle_distance(LonLat::from_degrees(179.0, 10.0), LonLat::from_degrees(-179.0, 10.0));
        assert!(d.to_degrees() < 2.0);
    }

    #[test]
    fn test_horizon_and_limb_are_complementary() {
        let d = 6371.0 + 550.0;
        let lambda = horizon_central_angle(d, 6371.0).unwrap();
        let eta = limb_half_angle(d, 6371.0).unwrap();
        assert!((lambda + eta - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_horizon_rejects_inside_sphere() {
        assert!(horizon_central_angle(6000.0, 6371.0).is_err());
    }

    #[test]
    fn test_sensor_ground_radius() {
        let d = 6371.0 + 700.0;
        assert_eq!(sensor_ground_radius(0.0, d, 6371.0).unwrap(), Some(0.0));

        // A cone that just reaches the limb covers the visible disk
        let eta = limb_half_angle(d, 6371.0).unwrap();
        let lambda = sensor_ground_radius(eta - 1e-9, d, 6371.0).unwrap().unwrap();
        assert!((lambda - horizon_central_angle(d, 6371.0).unwrap()).abs() < 1e-4);

        assert_eq!(sensor_ground_radius(eta + 0.01, d, 6371.0).unwrap(), None);
    }
}
