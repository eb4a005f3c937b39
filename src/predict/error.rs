use thiserror::Error;

use crate::geometry::GeometryError;
use crate::intervals::IntervalError;
use crate::orbital::ElementSetError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidTle { file: String, message: String },
    #[error("Malformed element set: {0}")]
    ElementSet(#[from] ElementSetError),
    #[error("Unknown satellite: {0}")]
    UnknownSatellite(String),
    #[error("Satellite already loaded: {0}")]
    DuplicateSatellite(String),
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("Invalid search: {0}")]
    InvalidSearch(String),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Interval error: {0}")]
    Interval(#[from] IntervalError),
}
