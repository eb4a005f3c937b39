use std::f64::consts::FRAC_PI_2;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::error::GeometryError;
use super::frame::rotate_about_axis;

/// Cartesian vector, kilometres or dimensionless depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector along `self`; zero and non-finite vectors have no direction.
    pub fn unit(self) -> Result<Vector3, GeometryError> {
        let n = self.norm();
        if n == 0.0 || !n.is_finite() {
            return Err(GeometryError::DegenerateVector("cannot normalize"));
        }
        Ok(self * (1.0 / n))
    }

    pub fn distance(self, other: Vector3) -> f64 {
        (self - other).norm()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, k: f64) -> Vector3 {
        Vector3::new(self.x * k, self.y * k, self.z * k)
    }
}

/// Spherical coordinates with latitude measured from the equator of the
/// active frame. Angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalPoint {
    pub radius: f64,
    pub lat: f64,
    pub lon: f64,
}

impl SphericalPoint {
    pub const fn new(radius: f64, lat: f64, lon: f64) -> Self {
        Self { radius, lat, lon }
    }

    pub fn from_degrees(radius: f64, lat_deg: f64, lon_deg: f64) -> Self {
        Self::new(radius, lat_deg.to_radians(), lon_deg.to_radians())
    }
}

pub fn cart_to_spherical(v: Vector3) -> Result<SphericalPoint, GeometryError> {
    let radius = v.norm();
    if radius == 0.0 || !radius.is_finite() {
        return Err(GeometryError::DegenerateVector(
            "latitude and longitude are undefined at the origin",
        ));
    }
    // z/r can leave [-1, 1] by an ulp
    let lat = (v.z / radius).clamp(-1.0, 1.0).asin();
    let lon = v.y.atan2(v.x);
    Ok(SphericalPoint { radius, lat, lon })
}

pub fn spherical_to_cart(p: SphericalPoint) -> Vector3 {
    let colat = FRAC_PI_2 - p.lat;
    Vector3::new(
        p.radius * colat.sin() * p.lon.cos(),
        p.radius * colat.sin() * p.lon.sin(),
        p.radius * colat.cos(),
    )
}

/// Unit vector tilted `magnitude_deg` away from `start`, toward the compass
/// bearing `direction_deg`.
///
/// The tilt is first applied toward increasing latitude of the active frame,
/// then the tilted vector is revolved about `start` by `direction_deg`. With
/// a zero magnitude the result is `start` normalized, for any direction.
pub fn angle_offset_vector(
    start: Vector3,
    magnitude_deg: f64,
    direction_deg: f64,
) -> Result<Vector3, GeometryError> {
    if !magnitude_deg.is_finite() || !direction_deg.is_finite() {
        return Err(GeometryError::invalid(
            "angle_offset_vector",
            "magnitude and direction must be finite",
        ));
    }
    let axis = start.unit()?;
    let sph = cart_to_spherical(axis)?;
    let diverted = spherical_to_cart(SphericalPoint::new(
        1.0,
        sph.lat + magnitude_deg.to_radians(),
        sph.lon,
    ));
    Ok(rotate_about_axis(diverted, axis, direction_deg.to_radians()))
}
