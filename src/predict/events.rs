use chrono::{DateTime, Duration, Utc};

use crate::intervals::{EventKind, EventSample};
use crate::predict::error::PredictError;

pub const DEFAULT_COARSE_STEP_SECONDS: i64 = 60;
const FINE_STEP_SECONDS: i64 = 1;

/// Coarse scan parameters for rise/culminate/set searches.
#[derive(Debug, Clone, Copy)]
pub struct EventSearch {
    pub step: Duration,
    pub horizon_deg: f64,
}

impl Default for EventSearch {
    fn default() -> Self {
        Self {
            step: Duration::seconds(DEFAULT_COARSE_STEP_SECONDS),
            horizon_deg: 0.0,
        }
    }
}

impl EventSearch {
    pub fn new(step: Duration, horizon_deg: f64) -> Self {
        Self { step, horizon_deg }
    }

    /// Scans `[start, end]` and returns time-ordered events. Crossings are
    /// refined by bisection and culminations by ternary search, both to one
    /// second. A satellite already above the horizon at `start` yields no
    /// rise; one still above at `end` yields no set.
    pub fn find<F>(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mut elevation_at: F,
    ) -> Result<Vec<EventSample<DateTime<Utc>>>, PredictError>
    where
        F: FnMut(DateTime<Utc>) -> Result<f64, PredictError>,
    {
        if end < start {
            return Err(PredictError::InvalidSearch(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        if self.step < Duration::seconds(FINE_STEP_SECONDS) {
            return Err(PredictError::InvalidSearch(
                "coarse step must be at least one second".to_string(),
            ));
        }

        let mut grid = Vec::new();
        let mut cursor = start;
        while cursor < end {
            grid.push((cursor, elevation_at(cursor)?));
            cursor += self.step;
        }
        grid.push((end, elevation_at(end)?));

        let mut events = Vec::new();
        for i in 1..grid.len() {
            let (t_prev, el_prev) = grid[i - 1];
            let (t, el) = grid[i];
            let was_above = el_prev >= self.horizon_deg;
            let above = el >= self.horizon_deg;

            if above && !was_above {
                let rise = self.refine_crossing(t_prev, t, true, &mut elevation_at)?;
                events.push(EventSample::new(rise, EventKind::Rise));
            } else if !above && was_above {
                let set = self.refine_crossing(t_prev, t, false, &mut elevation_at)?;
                events.push(EventSample::new(set, EventKind::Set));
            }

            if above && i + 1 < grid.len() {
                let el_next = grid[i + 1].1;
                if el >= el_prev && el > el_next {
                    let tca = refine_culmination(t_prev, grid[i + 1].0, &mut elevation_at)?;
                    events.push(EventSample::new(tca, EventKind::Culminate));
                }
            }
        }

        events.sort_by_key(|e| e.time);
        Ok(events)
    }

    /// Binary search for the horizon crossing between two samples
    fn refine_crossing<F>(
        &self,
        before: DateTime<Utc>,
        after: DateTime<Utc>,
        rising: bool,
        elevation_at: &mut F,
    ) -> Result<DateTime<Utc>, PredictError>
    where
        F: FnMut(DateTime<Utc>) -> Result<f64, PredictError>,
    {
        let mut low = before;
        let mut high = after;

        while (high - low).num_seconds() > FINE_STEP_SECONDS {
            let mid = low + (high - low) / 2;
            let above = elevation_at(mid)? >= self.horizon_deg;
            if above == rising {
                high = mid;
            } else {
                low = mid;
            }
        }

        // Rise reports the first instant above, set the last instant above
        Ok(if rising { high } else { low })
    }
}

/// Ternary search for the elevation maximum inside `[low, high]`
fn refine_culmination<F>(
    mut low: DateTime<Utc>,
    mut high: DateTime<Utc>,
    elevation_at: &mut F,
) -> Result<DateTime<Utc>, PredictError>
where
    F: FnMut(DateTime<Utc>) -> Result<f64, PredictError>,
{
    while (high - low).num_seconds() > 2 * FINE_STEP_SECONDS {
        let third = (high - low) / 3;
        let m1 = low + third;
        let m2 = high - third;
        if elevation_at(m1)? < elevation_at(m2)? {
            low = m1;
        } else {
            high = m2;
        }
    }
    Ok(low + (high - low) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    /// Elevation with a 600 s wide pass peaking at `peak_s` to `peak_deg`
    fn pass_at(peak_s: i64, peak_deg: f64) -> impl FnMut(DateTime<Utc>) -> Result<f64, PredictError> {
        move |t| {
            let dt = (t - epoch()).num_milliseconds() as f64 / 1000.0 - peak_s as f64;
            Ok(if dt.abs() < 600.0 {
                peak_deg * (1.0 - (dt / 300.0).powi(2))
            } else {
                -30.0
            })
        }
    }

    #[test]
    fn test_single_pass_events() {
        let events = EventSearch::default()
            .find(epoch(), epoch() + Duration::hours(1), pass_at(1800, 40.0))
            .unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Rise, EventKind::Culminate, EventKind::Set]
        );

        let offset = |e: &EventSample<DateTime<Utc>>| (e.time - epoch()).num_seconds();
        assert!((offset(&events[0]) - 1500).abs() <= 1, "{}", offset(&events[0]));
        assert!((offset(&events[1]) - 1800).abs() <= 2, "{}", offset(&events[1]));
        assert!((offset(&events[2]) - 2100).abs() <= 1, "{}", offset(&events[2]));
    }

    #[test]
    fn test_horizon_mask_shortens_pass() {
        let search = EventSearch::new(Duration::seconds(60), 30.0);
        let events = search
            .find(epoch(), epoch() + Duration::hours(1), pass_at(1800, 40.0))
            .unwrap();
        assert_eq!(events.len(), 3);
        // 40 (1 - x²) = 30 at x = 0.5, i.e. 150 s either side of the peak
        let rise = (events[0].time - epoch()).num_seconds();
        assert!((rise - 1650).abs() <= 1, "{}", rise);
    }

    #[test]
    fn test_pass_open_at_window_edges() {
        // Window starts after one culmination and ends before the next
        let mut first = pass_at(-200, 40.0);
        let mut second = pass_at(3800, 40.0);
        let elevation = move |t: DateTime<Utc>| -> Result<f64, PredictError> {
            Ok(first(t)?.max(second(t)?))
        };
        let events = EventSearch::default()
            .find(epoch(), epoch() + Duration::hours(1), elevation)
            .unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Set, EventKind::Rise]);
    }

    #[test]
    fn test_no_pass() {
        let events = EventSearch::default()
            .find(epoch(), epoch() + Duration::hours(1), |_| Ok(-10.0))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_invalid_search() {
        let search = EventSearch::default();
        assert!(search
            .find(epoch(), epoch() - Duration::seconds(1), |_| Ok(0.0))
            .is_err());
        let zero_step = EventSearch::new(Duration::zero(), 0.0);
        assert!(zero_step
            .find(epoch(), epoch() + Duration::hours(1), |_| Ok(0.0))
            .is_err());
    }

    #[test]
    fn test_errors_propagate() {
        let result = EventSearch::default().find(epoch(), epoch() + Duration::hours(1), |_| {
            Err(PredictError::Propagation("decayed".to_string()))
        });
        assert!(matches!(result, Err(PredictError::Propagation(_))));
    }
}
