use serde::{Deserialize, Serialize};

use crate::geometry::{angle_offset_vector, GeometryError, LonLat, Vector3, EARTH_RADIUS_KM};
use crate::raster::Polygon;

pub const DEFAULT_RAY_SAMPLES: usize = 100;

/// Tangent rays land a hair either side of zero discriminant; accept them
/// within this fraction of `b²`.
const GRAZING_TOLERANCE: f64 = 1e-9;

/// Sensor cone relative to nadir. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorPointing {
    /// Full cone angle; the half-angle is `fov_deg / 2`.
    pub fov_deg: f64,
    #[serde(default)]
    pub offaxis_mag_deg: f64,
    #[serde(default)]
    pub offaxis_dir_deg: f64,
}

impl SensorPointing {
    pub fn nadir(fov_deg: f64) -> Self {
        Self {
            fov_deg,
            offaxis_mag_deg: 0.0,
            offaxis_dir_deg: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.fov_deg > 0.0 && self.fov_deg <= 180.0) {
            return Err(GeometryError::invalid(
                "fov_deg",
                format!("{} is outside (0, 180]", self.fov_deg),
            ));
        }
        if !self.offaxis_mag_deg.is_finite() || !self.offaxis_dir_deg.is_finite() {
            return Err(GeometryError::invalid(
                "offaxis",
                "magnitude and direction must be finite",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footprint {
    /// Closed ring when every ray hit, otherwise the arc of hits.
    pub boundary: Polygon,
    pub dropped_rays: usize,
    /// Where the boresight meets the ground, if it does.
    pub boresight: Option<LonLat>,
}

/// Projects a sensor cone onto the Earth sphere by ray casting.
#[derive(Debug, Clone, Copy)]
pub struct FootprintProjector {
    ray_samples: usize,
    radius_km: f64,
}

impl Default for FootprintProjector {
    fn default() -> Self {
        Self::new(DEFAULT_RAY_SAMPLES)
    }
}

impl FootprintProjector {
    pub fn new(ray_samples: usize) -> Self {
        Self {
            ray_samples,
            radius_km: EARTH_RADIUS_KM,
        }
    }

    pub fn with_radius(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// `position` is the satellite in Earth-fixed kilometres.
    pub fn project(
        &self,
        position: Vector3,
        pointing: &SensorPointing,
    ) -> Result<Footprint, GeometryError> {
        pointing.validate()?;
        if self.ray_samples == 0 {
            return Err(GeometryError::invalid("ray_samples", "must be positive"));
        }
        if !(self.radius_km > 0.0) {
            return Err(GeometryError::invalid("radius_km", "must be positive"));
        }
        if !position.is_finite() || position.norm() <= self.radius_km {
            return Err(GeometryError::invalid(
                "position",
                format!(
                    "satellite at {:.1} km is not outside the sphere",
                    position.norm()
                ),
            ));
        }

        let boresight = angle_offset_vector(
            -position,
            pointing.offaxis_mag_deg,
            pointing.offaxis_dir_deg,
        )?;
        let half_angle = pointing.fov_deg / 2.0;

        let n = self.ray_samples;
        let mut hits = Vec::with_capacity(n);
        for i in 0..n {
            let bearing = 360.0 * i as f64 / n as f64;
            let ray = angle_offset_vector(boresight, half_angle, bearing)?;
            let hit = match intersect_sphere(position, ray, self.radius_km) {
                Some(t) => Some(LonLat::from_vector(position + ray * t)?),
                None => None,
            };
            hits.push(hit);
        }

        let dropped_rays = hits.iter().filter(|h| h.is_none()).count();
        let boundary = match hits.iter().position(Option::is_none) {
            None => Polygon::closed(hits.into_iter().flatten().collect()),
            Some(first_miss) => {
                // Start the arc at the first hit after the missing run
                let start = (first_miss..first_miss + n)
                    .map(|k| k % n)
                    .find(|&k| hits[k].is_some())
                    .unwrap_or(0);
                Polygon::open((0..n).filter_map(|k| hits[(start + k) % n]).collect())
            }
        };
        if dropped_rays > 0 {
            log::debug!("{} of {} footprint rays missed the Earth", dropped_rays, n);
        }

        let boresight = match intersect_sphere(position, boresight, self.radius_km) {
            Some(t) => Some(LonLat::from_vector(position + boresight * t)?),
            None => None,
        };

        Ok(Footprint {
            boundary,
            dropped_rays,
            boresight,
        })
    }
}

/// Distance along `direction` (in units of its length) to the first entry
/// into the sphere centred at the origin.
pub fn intersect_sphere(origin: Vector3, direction: Vector3, radius: f64) -> Option<f64> {
    let a = direction.dot(direction);
    let b = 2.0 * origin.dot(direction);
    let c = origin.dot(origin) - radius * radius;
    if a == 0.0 {
        return None;
    }
    let mut disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        if disc < -GRAZING_TOLERANCE * b * b {
            return None;
        }
        disc = 0.0;
    }
    let root = disc.sqrt();
    let near = (-b - root) / (2.0 * a);
    let far = (-b + root) / (2.0 * a);
    if near > 0.0 {
        Some(near)
    } else if far > 0.0 {
        Some(far)
    } else {
        None
    }
}
