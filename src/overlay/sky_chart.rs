use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::context::SimulationContext;
use crate::geometry::{limb_half_angle, LonLat, Vector3, EARTH_RADIUS_KM};
use crate::predict::{
    illuminated_fraction, moon_phase_deg, moon_position, sun_position, Ephemeris, PredictError,
    MOON_RADIUS_KM, SUN_RADIUS_KM,
};
use crate::raster::{CircleRasterizer, LongitudeDomain, RasterConfig, Region, SmallCircleSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Body {
    Sun,
    Moon,
    Earth,
}

/// Either a body that moves with time or a fixed `[ra, dec]` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeepoutCenter {
    Body(Body),
    Fixed([f64; 2]),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keepout {
    pub center: KeepoutCenter,
    pub radius_deg: f64,
    #[serde(default)]
    pub tag: String,
}

/// Right ascension / declination of a body as seen from the satellite.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SkyPosition {
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub apparent_radius_deg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkyChartView {
    pub satellite: String,
    pub sun: SkyPosition,
    pub moon: SkyPosition,
    pub moon_phase_deg: f64,
    pub moon_illuminated_fraction: f64,
    /// Earth disk in the satellite's sky; a ring when it straddles the seam
    /// or a cap when it covers a celestial pole
    pub earth: Region,
    pub sun_disk: Region,
    pub moon_disk: Region,
    pub keepouts: Vec<Region>,
}

/// Celestial sphere around a satellite, RA in [0, 2π).
#[derive(Debug, Clone)]
pub struct SkyChart {
    rasterizer: CircleRasterizer,
    keepouts: Vec<Keepout>,
}

impl SkyChart {
    pub fn new(raster: RasterConfig, keepouts: Vec<Keepout>) -> Self {
        Self {
            rasterizer: CircleRasterizer::new(raster, LongitudeDomain::Positive),
            keepouts,
        }
    }

    pub fn compute(&self, ctx: &SimulationContext, id: &str) -> Result<SkyChartView, PredictError> {
        let now = ctx.current_time;
        let state = ctx.satellites.state_vector(id, now)?;
        let sat = state.position_teme;

        let sun = sun_position(now).position - sat;
        let moon = moon_position(now).position - sat;
        let sun_dir = LonLat::from_vector(sun)?;
        let moon_dir = LonLat::from_vector(moon)?;

        // The Earth is straight down: opposite the satellite's own RA/Dec
        let sat_dir = LonLat::from_vector(sat)?;
        let earth_dir = LonLat::new((sat_dir.lon + PI).rem_euclid(2.0 * PI), -sat_dir.lat);
        let earth_radius = limb_half_angle(sat.norm(), EARTH_RADIUS_KM)?;

        let earth = self.disk(earth_dir, earth_radius, "earth")?;
        let sun_radius = apparent_radius(SUN_RADIUS_KM, sun);
        let moon_radius = apparent_radius(MOON_RADIUS_KM, moon);
        let sun_disk = self.disk(sun_dir, sun_radius, "sun")?;
        let moon_disk = self.disk(moon_dir, moon_radius, "moon")?;

        let mut keepouts = Vec::with_capacity(self.keepouts.len());
        for keepout in &self.keepouts {
            let center = match keepout.center {
                KeepoutCenter::Body(Body::Sun) => sun_dir,
                KeepoutCenter::Body(Body::Moon) => moon_dir,
                KeepoutCenter::Body(Body::Earth) => earth_dir,
                KeepoutCenter::Fixed([ra, dec]) => LonLat::from_degrees(ra, dec),
            };
            let tag = if keepout.tag.is_empty() {
                format!("{} keepout", center_name(&keepout.center))
            } else {
                keepout.tag.clone()
            };
            keepouts.push(self.disk(center, keepout.radius_deg.to_radians(), &tag)?);
        }

        let phase = moon_phase_deg(now);
        Ok(SkyChartView {
            satellite: id.to_string(),
            sun: sky_position(sun_dir, sun_radius),
            moon: sky_position(moon_dir, moon_radius),
            moon_phase_deg: phase,
            moon_illuminated_fraction: illuminated_fraction(phase),
            earth,
            sun_disk,
            moon_disk,
            keepouts,
        })
    }

    fn disk(&self, center: LonLat, radius: f64, tag: &str) -> Result<Region, PredictError> {
        Ok(self
            .rasterizer
            .rasterize(&SmallCircleSpec::new(center.lat, center.lon, radius, tag))?)
    }
}

fn apparent_radius(body_radius_km: f64, line_of_sight: Vector3) -> f64 {
    (body_radius_km / line_of_sight.norm()).clamp(-1.0, 1.0).asin()
}

fn sky_position(dir: LonLat, radius: f64) -> SkyPosition {
    SkyPosition {
        ra_deg: dir.lon.to_degrees().rem_euclid(360.0),
        dec_deg: dir.lat.to_degrees(),
        apparent_radius_deg: radius.to_degrees(),
    }
}

fn center_name(center: &KeepoutCenter) -> String {
    match center {
        KeepoutCenter::Body(body) => body.to_string(),
        KeepoutCenter::Fixed([ra, dec]) => format!("[{:.1}, {:.1}]", ra, dec),
    }
}
