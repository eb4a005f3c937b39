use chrono::Duration;
use rayon::prelude::*;
use serde::Serialize;

use crate::context::SimulationContext;
use crate::footprint::{Footprint, FootprintProjector, SensorPointing};
use crate::geometry::{horizon_central_angle, sensor_ground_radius, LonLat, EARTH_RADIUS_KM};
use crate::predict::{Ephemeris, PredictError};
use crate::raster::{
    split_at_seam, CircleRasterizer, LongitudeDomain, Polygon, RasterConfig, Region,
    SmallCircleSpec, DEFAULT_SEAM_JUMP_DEG,
};

pub const DEFAULT_TRACK_SAMPLES: usize = 100;

/// Everything the world map draws for one satellite.
#[derive(Debug, Clone, Serialize)]
pub struct GroundMapLayer {
    pub satellite: String,
    pub subsatellite: LonLat,
    pub altitude_km: f64,
    /// Area from which the satellite is above the horizon
    pub visibility: Region,
    pub footprint: Option<Footprint>,
    /// Ground seen by the sensor cone when held at nadir
    pub sensor_view: Option<SensorView>,
    /// One orbit ahead, split where it crosses the seam
    pub track_ahead: Vec<Polygon>,
    pub track_behind: Vec<Polygon>,
}

/// Nadir sensor cone as a circle about the sub-satellite point.
#[derive(Debug, Clone, Serialize)]
pub struct SensorView {
    /// Earth-central angle from the sub-satellite point to the cone edge
    pub radius_deg: f64,
    pub region: Region,
}

/// Map layer settings for one satellite.
#[derive(Debug, Clone, Default)]
pub struct MapRequest {
    pub satellite: String,
    pub pointing: Option<SensorPointing>,
    /// Display colour, carried in the region tags as `color/id`
    pub color: Option<String>,
}

impl MapRequest {
    fn render_tag(&self) -> String {
        match &self.color {
            Some(color) => format!("{}/{}", color, self.satellite),
            None => self.satellite.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GroundMap {
    rasterizer: CircleRasterizer,
    projector: FootprintProjector,
    track_samples: usize,
    seam_jump_deg: f64,
}

impl Default for GroundMap {
    fn default() -> Self {
        Self::new(RasterConfig::default(), FootprintProjector::default())
    }
}

impl GroundMap {
    pub fn new(raster: RasterConfig, projector: FootprintProjector) -> Self {
        Self {
            rasterizer: CircleRasterizer::new(raster, LongitudeDomain::Signed),
            projector,
            track_samples: DEFAULT_TRACK_SAMPLES,
            seam_jump_deg: DEFAULT_SEAM_JUMP_DEG,
        }
    }

    pub fn with_track_samples(mut self, samples: usize) -> Self {
        self.track_samples = samples;
        self
    }

    pub fn compute(
        &self,
        ctx: &SimulationContext,
        request: &MapRequest,
    ) -> Result<GroundMapLayer, PredictError> {
        let id = request.satellite.as_str();
        let now = ctx.current_time;
        let state = ctx.satellites.state_vector(id, now)?;
        let distance = state.position_ecef.norm();
        let subsatellite = LonLat::from_vector(state.position_ecef)?;

        let tag = request.render_tag();
        let radius = horizon_central_angle(distance, EARTH_RADIUS_KM)?;
        let visibility = self.rasterizer.rasterize(&SmallCircleSpec::new(
            subsatellite.lat,
            subsatellite.lon,
            radius,
            tag.clone(),
        ))?;

        let (footprint, sensor_view) = match &request.pointing {
            Some(pointing) => {
                let footprint = self.projector.project(state.position_ecef, pointing)?;
                let half_angle = (pointing.fov_deg / 2.0).to_radians();
                let sensor_view = match sensor_ground_radius(half_angle, distance, EARTH_RADIUS_KM)? {
                    Some(ground_radius) if ground_radius > 0.0 => Some(SensorView {
                        radius_deg: ground_radius.to_degrees(),
                        region: self.rasterizer.rasterize(&SmallCircleSpec::new(
                            subsatellite.lat,
                            subsatellite.lon,
                            ground_radius,
                            tag,
                        ))?,
                    }),
                    _ => {
                        log::debug!("sensor cone of {} does not reach the ground", id);
                        None
                    }
                };
                (Some(footprint), sensor_view)
            }
            None => (None, None),
        };

        let period_s = ctx.satellites.get(id)?.element_set.period_s();
        let track_ahead = self.track(ctx, id, 0.0, period_s)?;
        let track_behind = self.track(ctx, id, -period_s, 0.0)?;

        Ok(GroundMapLayer {
            satellite: id.to_string(),
            subsatellite,
            altitude_km: distance - EARTH_RADIUS_KM,
            visibility,
            footprint,
            sensor_view,
            track_ahead,
            track_behind,
        })
    }

    /// Layers for several satellites in parallel.
    pub fn compute_all(
        &self,
        ctx: &SimulationContext,
        requests: &[MapRequest],
    ) -> Result<Vec<GroundMapLayer>, PredictError> {
        requests
            .par_iter()
            .map(|request| self.compute(ctx, request))
            .collect()
    }

    fn track(
        &self,
        ctx: &SimulationContext,
        id: &str,
        from_s: f64,
        to_s: f64,
    ) -> Result<Vec<Polygon>, PredictError> {
        let n = self.track_samples.max(2);
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            let offset_s = from_s + (to_s - from_s) * i as f64 / (n - 1) as f64;
            let t = ctx.current_time + Duration::milliseconds((offset_s * 1000.0).round() as i64);
            let state = ctx.satellites.state_vector(id, t)?;
            points.push(LonLat::from_vector(state.position_ecef)?);
        }
        Ok(split_at_seam(&points, self.seam_jump_deg.to_radians()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::great_circle_distance;
    use crate::raster::Regime;
    use crate::test_support::{iss_epoch, iss_table, ISS_NAME};

    fn context() -> SimulationContext {
        SimulationContext::new(iss_epoch(), iss_table())
    }

    #[test]
    fn test_layer_for_iss() {
        let ctx = context();
        let request = MapRequest {
            satellite: ISS_NAME.to_string(),
            pointing: Some(SensorPointing::nadir(30.0)),
            color: Some("#ff8800".to_string()),
        };
        let layer = GroundMap::default().compute(&ctx, &request).unwrap();

        assert!((250.0..500.0).contains(&layer.altitude_km), "{}", layer.altitude_km);
        assert!(layer.subsatellite.lat.abs() <= 51.7_f64.to_radians());
        assert_ne!(layer.visibility.regime, Regime::Degenerate);
        assert_eq!(layer.visibility.tag, "#ff8800/ISS (ZARYA)");

        // Track pieces together hold every sample and start at the satellite
        let ahead: usize = layer.track_ahead.iter().map(Polygon::len).sum();
        assert_eq!(ahead, DEFAULT_TRACK_SAMPLES);
        let first = layer.track_ahead[0].points()[0];
        assert!(great_circle_distance(first, layer.subsatellite) < 1e-9);
        let last_behind = *layer.track_behind.last().unwrap().points().last().unwrap();
        assert!(great_circle_distance(last_behind, layer.subsatellite) < 1e-9);

        // Two orbits of track cross the seam at least once
        assert!(layer.track_ahead.len() + layer.track_behind.len() >= 3);

        let footprint = layer.footprint.unwrap();
        assert_eq!(footprint.dropped_rays, 0);
        let boresight = footprint.boresight.unwrap();
        assert!(great_circle_distance(boresight, layer.subsatellite) < 1e-9);

        // The nadir view circle passes through the projected cone edge
        let view = layer.sensor_view.unwrap();
        assert_eq!(view.region.tag, layer.visibility.tag);
        let radius = view.radius_deg.to_radians();
        for p in footprint.boundary.points() {
            let d = great_circle_distance(*p, layer.subsatellite);
            assert!((d - radius).abs() < 1e-6, "{} vs {}", d, radius);
        }
        assert!(radius < horizon_central_angle(layer.altitude_km + EARTH_RADIUS_KM, EARTH_RADIUS_KM).unwrap());
    }

    #[test]
    fn test_cone_past_the_limb_has_no_sensor_view() {
        let ctx = context();
        let request = MapRequest {
            satellite: ISS_NAME.to_string(),
            pointing: Some(SensorPointing::nadir(170.0)),
            color: None,
        };
        let layer = GroundMap::default().compute(&ctx, &request).unwrap();
        assert!(layer.sensor_view.is_none());
        assert_eq!(layer.visibility.tag, ISS_NAME);
    }

    #[test]
    fn test_compute_all_and_unknown_satellite() {
        let ctx = context();
        let map = GroundMap::default().with_track_samples(10);
        let requests = vec![MapRequest {
            satellite: ISS_NAME.to_string(),
            pointing: None,
            color: None,
        }];
        let layers = map.compute_all(&ctx, &requests).unwrap();
        assert_eq!(layers.len(), 1);
        assert!(layers[0].footprint.is_none());
        assert!(layers[0].sensor_view.is_none());

        let bad = vec![MapRequest {
            satellite: "NOPE".to_string(),
            pointing: None,
            color: None,
        }];
        assert!(matches!(
            map.compute_all(&ctx, &bad),
            Err(PredictError::UnknownSatellite(_))
        ));
    }
}
