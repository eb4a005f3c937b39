use chrono::{DateTime, Utc};

use crate::intervals::EventSample;
use crate::predict::bodies::{is_sunlit, sun_position};
use crate::predict::error::PredictError;
use crate::predict::propagation::look_angles;
use crate::predict::tle_loader::SatelliteTable;
use crate::predict::types::StateVector;
use crate::predict::GroundStation;

/// Source of satellite states and observation events.
pub trait Ephemeris {
    fn state_vector(&self, id: &str, time: DateTime<Utc>) -> Result<StateVector, PredictError>;

    /// Rise/culminate/set events over the station's elevation mask, ordered
    /// by time and inside `[start, end]`.
    fn observed_events(
        &self,
        station: &GroundStation,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EventSample<DateTime<Utc>>>, PredictError>;

    fn is_sunlit(&self, id: &str, times: &[DateTime<Utc>]) -> Result<Vec<bool>, PredictError>;
}

impl Ephemeris for SatelliteTable {
    fn state_vector(&self, id: &str, time: DateTime<Utc>) -> Result<StateVector, PredictError> {
        self.get(id)?.state_at(time)
    }

    fn observed_events(
        &self,
        station: &GroundStation,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EventSample<DateTime<Utc>>>, PredictError> {
        let entry = self.get(id)?;
        let mut search = self.search();
        search.horizon_deg = station.min_elevation_deg;
        search.find(start, end, |t| {
            let state = entry.state_at(t)?;
            Ok(look_angles(station, &state).elevation_deg)
        })
    }

    fn is_sunlit(&self, id: &str, times: &[DateTime<Utc>]) -> Result<Vec<bool>, PredictError> {
        let entry = self.get(id)?;
        times
            .iter()
            .map(|&t| -> Result<bool, PredictError> {
                let state = entry.state_at(t)?;
                Ok(is_sunlit(state.position_teme, sun_position(t).position))
            })
            .collect()
    }
}
