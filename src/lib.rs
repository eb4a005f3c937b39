//! Spherical visibility and footprint geometry for satellite operations
//! displays: small-circle rasterization across the longitude seam, sensor
//! cone projection, event-to-interval extraction and orbit-derived
//! quantities, with an SGP4-backed ephemeris provider and display adapters
//! around them.

pub mod config;
pub mod context;
pub mod footprint;
pub mod geometry;
pub mod intervals;
pub mod orbital;
pub mod overlay;
pub mod predict;
pub mod raster;

#[cfg(test)]
pub(crate) mod test_support;
