mod error;
mod extractor;
mod types;

pub use error::IntervalError;
pub use extractor::{extract_events, extract_states, IntervalExtractor};
pub use types::{EventKind, EventSample, ExtractorPolicy, Interval, StateSample, Window};
