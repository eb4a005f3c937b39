use chrono::Duration;
use serde::Serialize;

use crate::context::SimulationContext;
use crate::predict::{look_angles, Ephemeris, GroundStation, PredictError};

pub const DEFAULT_ARC_HALF_SPAN_SECONDS: i64 = 600;
pub const DEFAULT_ARC_STEP_SECONDS: i64 = 20;

/// Zenith at the origin, horizon at radius 90, north up and east right.
pub fn polar_plot_coords(elevation_deg: f64, azimuth_deg: f64) -> [f64; 2] {
    let r = 90.0 - elevation_deg;
    let theta = (90.0 - azimuth_deg).to_radians();
    [r * theta.cos(), r * theta.sin()]
}

/// Inverse of [`polar_plot_coords`], returns `(elevation, azimuth)`.
pub fn xy_to_altaz(x: f64, y: f64) -> (f64, f64) {
    let elevation = 90.0 - x.hypot(y);
    let azimuth = (90.0 - y.atan2(x).to_degrees()).rem_euclid(360.0);
    (elevation, azimuth)
}

#[derive(Debug, Clone, Serialize)]
pub struct PolarTrack {
    pub satellite: String,
    /// Current position, when above the horizon
    pub marker: Option<[f64; 2]>,
    /// Sky arc around the current time, above-horizon samples only
    pub arc: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy)]
pub struct PolarPlot {
    station: GroundStation,
    half_span: Duration,
    step: Duration,
}

impl PolarPlot {
    pub fn new(station: GroundStation) -> Self {
        Self {
            station,
            half_span: Duration::seconds(DEFAULT_ARC_HALF_SPAN_SECONDS),
            step: Duration::seconds(DEFAULT_ARC_STEP_SECONDS),
        }
    }

    pub fn compute(&self, ctx: &SimulationContext, id: &str) -> Result<PolarTrack, PredictError> {
        if self.step <= Duration::zero() {
            return Err(PredictError::InvalidSearch(
                "arc step must be positive".to_string(),
            ));
        }
        let now = ctx.current_time;
        let look = look_angles(&self.station, &ctx.satellites.state_vector(id, now)?);
        let marker = (look.elevation_deg > self.station.min_elevation_deg)
            .then(|| polar_plot_coords(look.elevation_deg, look.azimuth_deg));

        let mut arc = Vec::new();
        let mut t = now - self.half_span;
        while t < now + self.half_span {
            let look = look_angles(&self.station, &ctx.satellites.state_vector(id, t)?);
            if look.elevation_deg > self.station.min_elevation_deg {
                arc.push(polar_plot_coords(look.elevation_deg, look.azimuth_deg));
            }
            t += self.step;
        }

        Ok(PolarTrack {
            satellite: id.to_string(),
            marker,
            arc,
        })
    }
}
