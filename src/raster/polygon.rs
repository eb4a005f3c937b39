use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::geometry::LonLat;

/// Planar polygon in (lon, lat) radians.
///
/// Closure is implicit: a closed polygon does not repeat its first point, so
/// vertex counts stay comparable between split and unsplit regions. Use
/// [`Polygon::closed_ring`] for the explicit form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    points: Vec<LonLat>,
    closed: bool,
}

impl Polygon {
    pub fn closed(points: Vec<LonLat>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn open(points: Vec<LonLat>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn points(&self) -> &[LonLat] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points with the first repeated at the end when the polygon is closed.
    pub fn closed_ring(&self) -> Vec<LonLat> {
        let mut ring = self.points.clone();
        if self.closed {
            if let Some(first) = self.points.first() {
                ring.push(*first);
            }
        }
        ring
    }

    pub fn to_degrees(&self) -> DegreePolygon {
        DegreePolygon {
            points: self.points.iter().map(|p| p.to_degrees()).collect(),
            closed: self.closed,
        }
    }
}

/// Presentation form of a [`Polygon`]: `[lon, lat]` pairs in degrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreePolygon {
    pub points: Vec<[f64; 2]>,
    pub closed: bool,
}

/// Longitude range of the output plane and where its seam sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongitudeDomain {
    /// `[-π, π)`, seam on the antimeridian. Ground maps.
    #[default]
    Signed,
    /// `[0, 2π)`, seam at 0. Sky charts in right ascension.
    Positive,
}

impl LongitudeDomain {
    pub fn west(self) -> f64 {
        match self {
            LongitudeDomain::Signed => -PI,
            LongitudeDomain::Positive => 0.0,
        }
    }

    pub fn east(self) -> f64 {
        self.west() + TAU
    }

    pub fn mid(self) -> f64 {
        self.west() + PI
    }

    /// Wraps any longitude into `[west, east)`.
    pub fn wrap(self, lon: f64) -> f64 {
        let west = self.west();
        let offset = (lon - west).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if offset >= TAU {
            west
        } else {
            west + offset
        }
    }
}
