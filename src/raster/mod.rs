mod circle;
mod polygon;
mod track;

pub use circle::{
    CircleRasterizer, RasterConfig, Regime, Region, SeamReference, SmallCircleSpec,
    DEFAULT_SAMPLES,
};
pub use polygon::{DegreePolygon, LongitudeDomain, Polygon};
pub use track::{split_at_seam, DEFAULT_SEAM_JUMP_DEG};
