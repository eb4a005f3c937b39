use crate::geometry::LonLat;
use crate::raster::polygon::Polygon;

/// Longitude step above which consecutive track points are treated as a
/// seam crossing rather than motion.
pub const DEFAULT_SEAM_JUMP_DEG: f64 = 20.0;

/// Splits an open polyline wherever consecutive longitudes jump by more than
/// `max_jump` radians. Every returned piece is an open polygon.
pub fn split_at_seam(points: &[LonLat], max_jump: f64) -> Vec<Polygon> {
    let mut pieces = Vec::new();
    let mut current: Vec<LonLat> = Vec::new();
    for point in points {
        if let Some(prev) = current.last() {
            if (point.lon - prev.lon).abs() > max_jump {
                pieces.push(Polygon::open(std::mem::take(&mut current)));
            }
        }
        current.push(*point);
    }
    if !current.is_empty() {
        pieces.push(Polygon::open(current));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lons: &[f64]) -> Vec<LonLat> {
        lons.iter()
            .map(|lon| LonLat::from_degrees(*lon, 10.0))
            .collect()
    }

    #[test]
    fn test_split_at_antimeridian() {
        let points = track(&[170.0, 175.0, 179.5, -178.0, -172.0]);
        let pieces = split_at_seam(&points, DEFAULT_SEAM_JUMP_DEG.to_radians());
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].len(), 3);
        assert_eq!(pieces[1].len(), 2);
        assert!(pieces.iter().all(|p| !p.is_closed()));
    }

    #[test]
    fn test_no_split_for_continuous_track() {
        let points = track(&[-10.0, -5.0, 0.0, 5.0]);
        let pieces = split_at_seam(&points, DEFAULT_SEAM_JUMP_DEG.to_radians());
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].len(), 4);
    }

    #[test]
    fn test_empty_track() {
        assert!(split_at_seam(&[], 0.3).is_empty());
    }
}
