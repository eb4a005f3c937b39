use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },
    #[error("degenerate vector: {0}")]
    DegenerateVector(&'static str),
    #[error("degenerate frame: seed vectors are zero or parallel")]
    DegenerateFrame,
}

impl GeometryError {
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        GeometryError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
