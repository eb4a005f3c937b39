use std::ops::Sub;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Rise,
    Culminate,
    Set,
}

/// A discrete event reported by an event search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventSample<T> {
    pub time: T,
    pub kind: EventKind,
}

impl<T> EventSample<T> {
    pub fn new(time: T, kind: EventKind) -> Self {
        Self { time, kind }
    }
}

/// A sampled on/off state, e.g. sunlit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateSample<T> {
    pub time: T,
    pub state: bool,
}

impl<T> StateSample<T> {
    pub fn new(time: T, state: bool) -> Self {
        Self { time, state }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Window<T> {
    pub start: T,
    pub end: T,
}

impl<T> Window<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }
}

/// Closed time interval with an optional peak value. Only the extractor
/// builds these, so `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval<T> {
    start: T,
    end: T,
    peak: Option<f64>,
}

impl<T: Copy> Interval<T> {
    pub(crate) fn new(start: T, end: T, peak: Option<f64>) -> Self {
        Self { start, end, peak }
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    pub fn peak(&self) -> Option<f64> {
        self.peak
    }

    pub fn duration<D>(&self) -> D
    where
        T: Sub<Output = D>,
    {
        self.end - self.start
    }
}

/// Data-quality filters applied while extracting intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExtractorPolicy {
    /// Drop categorical intervals that never saw a culmination.
    #[serde(default = "default_require_culmination")]
    pub require_culmination: bool,
    /// Emit an interval still open when the stream ends, closed at the window
    /// end (categorical) or at the last sample (boolean).
    #[serde(default)]
    pub emit_open_at_end: bool,
}

fn default_require_culmination() -> bool {
    true
}

impl Default for ExtractorPolicy {
    fn default() -> Self {
        Self {
            require_culmination: true,
            emit_open_at_end: false,
        }
    }
}
