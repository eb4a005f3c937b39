use chrono::{DateTime, Utc};

use crate::predict::SatelliteTable;

/// Shared state every display adapter reads: the display time and the
/// satellites in view. Passed explicitly; nothing is global.
pub struct SimulationContext {
    pub current_time: DateTime<Utc>,
    pub satellites: SatelliteTable,
}

impl SimulationContext {
    pub fn new(current_time: DateTime<Utc>, satellites: SatelliteTable) -> Self {
        Self {
            current_time,
            satellites,
        }
    }
}
