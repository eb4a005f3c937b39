use thiserror::Error;

/// A two-line element set that cannot be read or rewritten.
#[derive(Debug, Error, PartialEq)]
pub enum ElementSetError {
    #[error("expected 2 or 3 non-empty lines, found {0}")]
    LineCount(usize),
    #[error("line {line} must start with '{line}'")]
    LineNumber { line: u8 },
    #[error("line {line} is {actual} characters wide, expected {expected}")]
    WrongWidth {
        line: u8,
        expected: usize,
        actual: usize,
    },
    #[error("line {0} contains non-ASCII characters")]
    NonAscii(u8),
    #[error("cannot parse {field} from {value:?}")]
    Field { field: &'static str, value: String },
    #[error("mean motion must be positive, got {0}")]
    NonPositiveMeanMotion(f64),
    #[error("{0} must be finite")]
    NonFinite(&'static str),
}
