use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::geometry::{archav, hav, GeometryError, LonLat};
use crate::raster::polygon::{LongitudeDomain, Polygon};

pub const DEFAULT_SAMPLES: usize = 1000;

/// A longitude gap wider than this between neighbours means the seam was crossed.
const WRAP_JUMP_RAD: f64 = 2.0;
/// A latitude gap wider than this fraction of the radius means an isolated ring.
const RING_JUMP_FRACTION: f64 = 0.5;
const POLE_EPSILON: f64 = 1e-12;

/// Where the bearing sort of a seam-split half is anchored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeamReference {
    /// Three times the center latitude, clamped to the pole.
    #[default]
    Empirical,
    /// Midpoint of the chord the circle cuts on the seam meridian.
    ChordMidpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RasterConfig {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default)]
    pub seam_reference: SeamReference,
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            seam_reference: SeamReference::default(),
        }
    }
}

/// How the sampled boundary was closed into polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Regime {
    /// Crosses the seam; one polygon per side.
    Wrapped,
    /// Closed ring sorted about its center.
    Ring,
    /// Encloses a pole; the boundary spans every longitude.
    PolarCap,
    /// Smaller than the row spacing; a single point at the center.
    Degenerate,
    /// The hole around the antipode is below the row spacing; the region is
    /// the whole domain.
    Sphere,
}

/// Small circle on the unit sphere. Angles in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallCircleSpec {
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius: f64,
    #[serde(default)]
    pub tag: String,
}

impl SmallCircleSpec {
    pub fn new(center_lat: f64, center_lon: f64, radius: f64, tag: impl Into<String>) -> Self {
        Self {
            center_lat,
            center_lon,
            radius,
            tag: tag.into(),
        }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64, radius_deg: f64, tag: impl Into<String>) -> Self {
        Self::new(
            lat_deg.to_radians(),
            lon_deg.to_radians(),
            radius_deg.to_radians(),
            tag,
        )
    }

    fn validate(&self) -> Result<(), GeometryError> {
        if !self.center_lat.is_finite() || self.center_lat.abs() > FRAC_PI_2 {
            return Err(GeometryError::invalid(
                "center_lat",
                format!("{} is outside [-π/2, π/2]", self.center_lat),
            ));
        }
        if !self.center_lon.is_finite() {
            return Err(GeometryError::invalid("center_lon", "must be finite"));
        }
        if !(self.radius > 0.0 && self.radius <= PI) {
            return Err(GeometryError::invalid(
                "radius",
                format!("{} is outside (0, π]", self.radius),
            ));
        }
        Ok(())
    }
}

/// Rasterized circle: one polygon, or two when split at the seam.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub tag: String,
    pub regime: Regime,
    pub polygons: Vec<Polygon>,
}

impl Region {
    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(Polygon::len).sum()
    }
}

/// Turns small circles into planar polygons that survive the longitude seam.
#[derive(Debug, Clone, Copy)]
pub struct CircleRasterizer {
    config: RasterConfig,
    domain: LongitudeDomain,
}

impl CircleRasterizer {
    pub fn new(config: RasterConfig, domain: LongitudeDomain) -> Self {
        Self { config, domain }
    }

    pub fn domain(&self) -> LongitudeDomain {
        self.domain
    }

    pub fn rasterize(&self, spec: &SmallCircleSpec) -> Result<Region, GeometryError> {
        spec.validate()?;
        if self.config.samples < 2 {
            return Err(GeometryError::invalid("samples", "need at least two rows"));
        }

        let clat = spec.center_lat;
        let clon = self.domain.wrap(spec.center_lon);
        let r = spec.radius;

        let row_step = PI / (self.config.samples - 1) as f64;
        if PI - r < row_step {
            log::debug!("circle '{}' leaves no hole above the row spacing", spec.tag);
            return Ok(self.whole_domain(spec));
        }

        if clat.cos() < POLE_EPSILON {
            return Ok(self.pole_centered(spec, clat, r));
        }

        let mut points = self.sample_boundary(clat, clon, r);
        if points.is_empty() {
            log::debug!("circle '{}' is below the row spacing", spec.tag);
            return Ok(Region {
                tag: spec.tag.clone(),
                regime: Regime::Degenerate,
                polygons: vec![Polygon::closed(vec![LonLat::new(clon, clat)])],
            });
        }

        points.sort_by(|a, b| a.lon.total_cmp(&b.lon));

        let (split, lon_jump) = largest_gap(&points, |p| p.lon);
        let (regime, polygons) = if lon_jump > WRAP_JUMP_RAD {
            let (west, east) = points.split_at(split);
            let reference = self.seam_reference_lat(clat, clon, r);
            (
                Regime::Wrapped,
                vec![
                    self.close_against_seam(west.to_vec(), self.domain.west(), reference),
                    self.close_against_seam(east.to_vec(), self.domain.east(), reference),
                ],
            )
        } else {
            let (_, lat_jump) = largest_gap(&points, |p| p.lat);
            let north_inside = FRAC_PI_2 - clat <= r;
            let south_inside = FRAC_PI_2 + clat <= r;
            if lat_jump <= RING_JUMP_FRACTION * r && north_inside != south_inside {
                (Regime::PolarCap, vec![self.close_polar_cap(points, north_inside)])
            } else {
                (Regime::Ring, vec![close_ring(points, clat, clon)])
            }
        };

        let region = Region {
            tag: spec.tag.clone(),
            regime,
            polygons,
        };
        log::debug!(
            "circle '{}' rasterized as {} ({} vertices)",
            region.tag,
            region.regime,
            region.vertex_count()
        );
        Ok(region)
    }

    /// Inverse haversine per latitude row; rows that miss the circle are skipped.
    fn sample_boundary(&self, clat: f64, clon: f64, r: f64) -> Vec<LonLat> {
        let rows = self.config.samples;
        let step = PI / (rows - 1) as f64;
        let mut points = Vec::with_capacity(2 * rows);
        for i in 0..rows {
            let lat = -FRAC_PI_2 + step * i as f64;
            let arg = (hav(r) - hav(lat - clat)) / (clat.cos() * lat.cos());
            if let Some(dlon) = archav(arg) {
                points.push(LonLat::new(self.domain.wrap(clon + dlon), lat));
                points.push(LonLat::new(self.domain.wrap(clon - dlon), lat));
            }
        }
        points
    }

    fn seam_reference_lat(&self, clat: f64, clon: f64, r: f64) -> f64 {
        match self.config.seam_reference {
            SeamReference::Empirical => (3.0 * clat).clamp(-FRAC_PI_2, FRAC_PI_2),
            SeamReference::ChordMidpoint => {
                // The seam meridian meets the circle where
                // sin(clat) sin(lat) + cos(clat) cos(dlon) cos(lat) = cos(r);
                // both roots are symmetric about atan2 of the two coefficients.
                let dlon = self.domain.east() - clon;
                let a = clat.sin();
                let b = clat.cos() * dlon.cos();
                if (a * a + b * b).sqrt() < r.cos().abs() {
                    log::debug!("seam meridian misses the circle, using the center latitude");
                    return clat;
                }
                a.atan2(b).clamp(-FRAC_PI_2, FRAC_PI_2)
            }
        }
    }

    fn close_against_seam(&self, mut points: Vec<LonLat>, edge: f64, reference: f64) -> Polygon {
        let west = edge == self.domain.west();
        let bearing = |p: &LonLat| {
            let angle = (p.lat - reference).atan2(p.lon - edge);
            if west {
                angle
            } else {
                angle.rem_euclid(TAU)
            }
        };
        points.sort_by(|a, b| bearing(a).total_cmp(&bearing(b)));
        Polygon::closed(points)
    }

    fn close_polar_cap(&self, points: Vec<LonLat>, north: bool) -> Polygon {
        let pole = if north { FRAC_PI_2 } else { -FRAC_PI_2 };
        let west = self.domain.west();
        let east = self.domain.east();
        let mut closed = Vec::with_capacity(points.len() + 4);
        closed.push(LonLat::new(east, pole));
        closed.push(LonLat::new(west, pole));
        if let Some(first) = points.first() {
            closed.push(LonLat::new(west, first.lat));
        }
        let last = points.last().copied();
        closed.extend(points);
        if let Some(last) = last {
            closed.push(LonLat::new(east, last.lat));
        }
        Polygon::closed(closed)
    }

    fn whole_domain(&self, spec: &SmallCircleSpec) -> Region {
        let west = self.domain.west();
        let east = self.domain.east();
        Region {
            tag: spec.tag.clone(),
            regime: Regime::Sphere,
            polygons: vec![Polygon::closed(vec![
                LonLat::new(west, -FRAC_PI_2),
                LonLat::new(east, -FRAC_PI_2),
                LonLat::new(east, FRAC_PI_2),
                LonLat::new(west, FRAC_PI_2),
            ])],
        }
    }

    /// A center on the pole makes every row formula divide by zero; the
    /// boundary is the parallel at `π/2 - r` from that pole.
    fn pole_centered(&self, spec: &SmallCircleSpec, clat: f64, r: f64) -> Region {
        let north = clat > 0.0;
        let lat = if north { FRAC_PI_2 - r } else { r - FRAC_PI_2 };
        let count = self.config.samples;
        let west = self.domain.west();
        let band = (0..count)
            .map(|i| LonLat::new(west + TAU * i as f64 / count as f64, lat))
            .collect();
        Region {
            tag: spec.tag.clone(),
            regime: Regime::PolarCap,
            polygons: vec![self.close_polar_cap(band, north)],
        }
    }
}

fn close_ring(mut points: Vec<LonLat>, clat: f64, clon: f64) -> Polygon {
    let angle = |p: &LonLat| (p.lat - clat).atan2(p.lon - clon);
    points.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
    Polygon::closed(points)
}

/// Index of the second point of the widest consecutive gap, and its width.
fn largest_gap(points: &[LonLat], key: impl Fn(&LonLat) -> f64) -> (usize, f64) {
    points
        .windows(2)
        .enumerate()
        .map(|(i, w)| (i + 1, (key(&w[1]) - key(&w[0])).abs()))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::great_circle_distance;

    fn signed() -> CircleRasterizer {
        CircleRasterizer::new(RasterConfig::default(), LongitudeDomain::Signed)
    }

    fn positive() -> CircleRasterizer {
        CircleRasterizer::new(RasterConfig::default(), LongitudeDomain::Positive)
    }

    #[test]
    fn test_seam_split_conserves_vertices() {
        let wrapped = signed()
            .rasterize(&SmallCircleSpec::from_degrees(0.0, 170.0, 20.0, "vis"))
            .unwrap();
        let centered = signed()
            .rasterize(&SmallCircleSpec::from_degrees(0.0, 0.0, 20.0, "vis"))
            .unwrap();

        assert_eq!(wrapped.regime, Regime::Wrapped);
        assert_eq!(wrapped.polygons.len(), 2);
        assert_eq!(centered.regime, Regime::Ring);
        assert_eq!(centered.polygons.len(), 1);
        assert_eq!(wrapped.vertex_count(), centered.vertex_count());
        assert!(wrapped.polygons.iter().all(Polygon::is_closed));
    }

    #[test]
    fn test_seam_split_sides() {
        let region = signed()
            .rasterize(&SmallCircleSpec::from_degrees(25.0, -175.0, 15.0, ""))
            .unwrap();
        assert_eq!(region.regime, Regime::Wrapped);
        assert!(region.polygons[0].points().iter().all(|p| p.lon < 0.0));
        assert!(region.polygons[1].points().iter().all(|p| p.lon >= 0.0));
    }

    #[test]
    fn test_chord_midpoint_reference_keeps_vertices() {
        let config = RasterConfig {
            seam_reference: SeamReference::ChordMidpoint,
            ..RasterConfig::default()
        };
        let spec = SmallCircleSpec::from_degrees(60.0, 178.0, 12.0, "");
        let exact = CircleRasterizer::new(config, LongitudeDomain::Signed)
            .rasterize(&spec)
            .unwrap();
        let empirical = signed().rasterize(&spec).unwrap();
        assert_eq!(exact.regime, Regime::Wrapped);
        assert_eq!(exact.vertex_count(), empirical.vertex_count());
    }

    #[test]
    fn test_tiny_radius_collapses_to_center() {
        let spec = SmallCircleSpec::new(0.3, 0.5, 1e-9, "dot");
        let region = signed().rasterize(&spec).unwrap();
        assert_eq!(region.polygons.len(), 1);
        let center = LonLat::new(0.5, 0.3);
        for p in region.polygons[0].points() {
            let d = great_circle_distance(*p, center);
            assert!(d < 1e-6, "point {:?} is {} rad from the center", p, d);
        }
    }

    #[test]
    fn test_degenerate_regime() {
        // Center between two rows, radius far below the row spacing
        let step = PI / (DEFAULT_SAMPLES - 1) as f64;
        let spec = SmallCircleSpec::new(-FRAC_PI_2 + 10.5 * step, 1.0, step * 0.01, "");
        let region = signed().rasterize(&spec).unwrap();
        assert_eq!(region.regime, Regime::Degenerate);
        assert_eq!(region.vertex_count(), 1);
    }

    #[test]
    fn test_polar_cap_adds_seam_edges_and_pole() {
        let region = signed()
            .rasterize(&SmallCircleSpec::from_degrees(70.0, 30.0, 30.0, "cap"))
            .unwrap();
        assert_eq!(region.regime, Regime::PolarCap);
        let points = region.polygons[0].points();
        assert_eq!(points[0], LonLat::new(PI, FRAC_PI_2));
        assert_eq!(points[1], LonLat::new(-PI, FRAC_PI_2));
        assert_eq!(points[2].lon, -PI);
        assert_eq!(points[points.len() - 1].lon, PI);
    }

    #[test]
    fn test_southern_polar_cap() {
        let region = positive()
            .rasterize(&SmallCircleSpec::from_degrees(-50.0, 200.0, 60.0, ""))
            .unwrap();
        assert_eq!(region.regime, Regime::PolarCap);
        let points = region.polygons[0].points();
        assert_eq!(points[0], LonLat::new(TAU, -FRAC_PI_2));
        assert_eq!(points[1], LonLat::new(0.0, -FRAC_PI_2));
    }

    #[test]
    fn test_pole_centered_band() {
        let region = signed()
            .rasterize(&SmallCircleSpec::new(FRAC_PI_2, 0.0, 10f64.to_radians(), ""))
            .unwrap();
        assert_eq!(region.regime, Regime::PolarCap);
        let points = region.polygons[0].points();
        assert_eq!(points.len(), DEFAULT_SAMPLES + 4);
        assert!((points[3].lat.to_degrees() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_radius_covers_the_domain() {
        let step = PI / (DEFAULT_SAMPLES - 1) as f64;
        for radius in [PI, PI - 0.5 * step] {
            for rasterizer in [signed(), positive()] {
                let domain = rasterizer.domain();
                let region = rasterizer
                    .rasterize(&SmallCircleSpec::new(0.0, 0.0, radius, "all"))
                    .unwrap();
                assert_eq!(region.regime, Regime::Sphere);
                assert_eq!(region.polygons.len(), 1);
                let points = region.polygons[0].points();
                assert_eq!(points.len(), 4);
                assert!(points.iter().any(|p| p.lon == domain.west() && p.lat == -FRAC_PI_2));
                assert!(points.iter().any(|p| p.lon == domain.east() && p.lat == FRAC_PI_2));
            }
        }

        // A hole wider than the row spacing is still rasterized as a circle
        let near = signed()
            .rasterize(&SmallCircleSpec::new(0.0, 0.0, PI - 5.0 * step, ""))
            .unwrap();
        assert_ne!(near.regime, Regime::Sphere);
        assert_ne!(near.regime, Regime::Degenerate);
        assert!(near.vertex_count() > 4);
    }

    #[test]
    fn test_positive_domain_wraps_at_zero() {
        let region = positive()
            .rasterize(&SmallCircleSpec::from_degrees(-10.0, 0.0, 8.0, "sun"))
            .unwrap();
        assert_eq!(region.regime, Regime::Wrapped);
        assert!(region.polygons[0].points().iter().all(|p| p.lon < PI));
        assert!(region.polygons[1].points().iter().all(|p| p.lon > PI));

        let region = positive()
            .rasterize(&SmallCircleSpec::from_degrees(-10.0, 180.0, 8.0, "sun"))
            .unwrap();
        assert_eq!(region.regime, Regime::Ring);
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let r = signed();
        assert!(r.rasterize(&SmallCircleSpec::new(0.0, 0.0, 0.0, "")).is_err());
        assert!(r.rasterize(&SmallCircleSpec::new(0.0, 0.0, -0.1, "")).is_err());
        assert!(r.rasterize(&SmallCircleSpec::new(0.0, 0.0, PI + 0.1, "")).is_err());
        assert!(r.rasterize(&SmallCircleSpec::new(1.6, 0.0, 0.1, "")).is_err());
        assert!(r.rasterize(&SmallCircleSpec::new(0.0, f64::NAN, 0.1, "")).is_err());

        let config = RasterConfig {
            samples: 1,
            ..RasterConfig::default()
        };
        let err = CircleRasterizer::new(config, LongitudeDomain::Signed)
            .rasterize(&SmallCircleSpec::new(0.0, 0.0, 0.1, ""));
        assert!(matches!(err, Err(GeometryError::InvalidParameter { name: "samples", .. })));
    }

    #[test]
    fn test_ring_points_lie_on_circle() {
        let spec = SmallCircleSpec::from_degrees(-35.0, 80.0, 22.0, "");
        let region = signed().rasterize(&spec).unwrap();
        let center = LonLat::new(spec.center_lon, spec.center_lat);
        for p in region.polygons[0].points() {
            let d = great_circle_distance(*p, center);
            assert!((d - spec.radius).abs() < 1e-9, "{} vs {}", d, spec.radius);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn test_vertex_count_independent_of_longitude(
                lat in -60.0..60.0_f64,
                lon in -180.0..180.0_f64,
                radius in 2.0..25.0_f64,
            ) {
                let rasterizer = signed();
                let moved = rasterizer.rasterize(&SmallCircleSpec::from_degrees(lat, lon, radius, ""))?;
                let centered = rasterizer.rasterize(&SmallCircleSpec::from_degrees(lat, 0.0, radius, ""))?;
                prop_assert_eq!(moved.vertex_count(), centered.vertex_count());
                prop_assert!(moved.polygons.len() <= 2);
            }

            #[test]
            fn test_boundary_points_in_domain(
                lat in -89.0..89.0_f64,
                lon in -720.0..720.0_f64,
                radius in 0.5..120.0_f64,
            ) {
                for rasterizer in [signed(), positive()] {
                    let domain = rasterizer.domain();
                    let region = rasterizer.rasterize(&SmallCircleSpec::from_degrees(lat, lon, radius, ""))?;
                    for polygon in &region.polygons {
                        for p in polygon.points() {
                            prop_assert!(p.lon >= domain.west() && p.lon <= domain.east());
                            prop_assert!(p.lat.abs() <= FRAC_PI_2 + 1e-12);
                        }
                    }
                }
            }
        }
    }
}
