use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("sample {index} is earlier than the one before it")]
    Unordered { index: usize },
    #[error("sample {index} lies outside the search window")]
    OutsideWindow { index: usize },
    #[error("search window ends before it starts")]
    InvalidWindow,
}
