use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;

use crate::intervals::{EventKind, ExtractorPolicy, IntervalExtractor, StateSample, Window};
use crate::predict::ephemeris::Ephemeris;
use crate::predict::error::PredictError;
use crate::predict::propagation::look_angles;
use crate::predict::types::{Lighting, Pass, SatelliteWindows};
use crate::predict::GroundStation;

/// Find all passes for a satellite within a time range. Passes whose
/// culmination stays below `min_elevation` are dropped.
pub fn predict_passes<E: Ephemeris>(
    ephemeris: &E,
    station: &GroundStation,
    id: &str,
    window: Window<DateTime<Utc>>,
    extractor: &IntervalExtractor,
    min_elevation: f64,
) -> Result<Vec<Pass>, PredictError> {
    let elevation_at = |t: DateTime<Utc>| -> Result<f64, PredictError> {
        let state = ephemeris.state_vector(id, t)?;
        Ok(look_angles(station, &state).elevation_deg)
    };

    let events = ephemeris.observed_events(station, id, window.start, window.end)?;
    let mut culminations = BTreeMap::new();
    for event in events.iter().filter(|e| e.kind == EventKind::Culminate) {
        culminations.insert(event.time, elevation_at(event.time)?);
    }

    let intervals = extractor.extract_events(&events, &window, |t| {
        culminations.get(&t).copied().unwrap_or(f64::NEG_INFINITY)
    })?;

    let mut passes = Vec::new();
    for interval in intervals {
        let (aos, los) = (interval.start(), interval.end());
        let tca = culminations
            .range(aos..=los)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(t, _)| *t);
        let (tca, max_el) = match (tca, interval.peak()) {
            (Some(t), Some(peak)) => (t, peak),
            // Window edge cut the culmination off: report the higher end
            _ => {
                let (el_aos, el_los) = (elevation_at(aos)?, elevation_at(los)?);
                if el_aos >= el_los {
                    (aos, el_aos)
                } else {
                    (los, el_los)
                }
            }
        };
        if max_el < min_elevation {
            continue;
        }

        let aos_look = look_angles(station, &ephemeris.state_vector(id, aos)?);
        let los_look = look_angles(station, &ephemeris.state_vector(id, los)?);

        passes.push(Pass {
            satellite: id.to_string(),
            aos,
            los,
            tca,
            max_elevation_deg: round2(max_el),
            aos_azimuth_deg: round2(aos_look.azimuth_deg),
            los_azimuth_deg: round2(los_look.azimuth_deg),
            duration_seconds: interval.duration::<Duration>().num_seconds(),
        });
    }

    Ok(passes)
}

/// Ground-station access windows for every listed satellite, computed in
/// parallel. Culmination is not required and windows open at either end of
/// the search are kept.
pub fn access_windows<E: Ephemeris + Sync>(
    ephemeris: &E,
    station: &GroundStation,
    ids: &[String],
    window: Window<DateTime<Utc>>,
) -> Result<Vec<SatelliteWindows>, PredictError> {
    let extractor = IntervalExtractor::new(ExtractorPolicy {
        require_culmination: false,
        emit_open_at_end: true,
    });

    ids.par_iter()
        .map(|id| -> Result<SatelliteWindows, PredictError> {
            let events = ephemeris.observed_events(station, id, window.start, window.end)?;
            let windows = extractor.extract_events(&events, &window, |_| f64::NAN)?;
            log::debug!("{}: {} access windows", id, windows.len());
            Ok(SatelliteWindows {
                satellite: id.clone(),
                windows,
            })
        })
        .collect()
}

/// Sunlit and eclipse intervals sampled every `step`.
pub fn lighting<E: Ephemeris>(
    ephemeris: &E,
    id: &str,
    window: Window<DateTime<Utc>>,
    step: Duration,
    extractor: &IntervalExtractor,
) -> Result<Lighting, PredictError> {
    if step <= Duration::zero() {
        return Err(PredictError::InvalidSearch(
            "sampling step must be positive".to_string(),
        ));
    }

    let mut times = Vec::new();
    let mut cursor = window.start;
    while cursor < window.end {
        times.push(cursor);
        cursor += step;
    }
    times.push(window.end);

    let sunlit = ephemeris.is_sunlit(id, &times)?;
    let samples: Vec<_> = times
        .iter()
        .zip(&sunlit)
        .map(|(&t, &lit)| StateSample::new(t, lit))
        .collect();
    let shadow: Vec<_> = samples
        .iter()
        .map(|s| StateSample::new(s.time, !s.state))
        .collect();

    Ok(Lighting {
        satellite: id.to_string(),
        sunlit: extractor.extract_states(&samples)?,
        eclipse: extractor.extract_states(&shadow)?,
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::EventSample;
    use crate::predict::types::StateVector;
    use crate::test_support::{iss_epoch as epoch, iss_table, munich, ISS_NAME};

    /// Lighting pattern fixed per sample index
    struct Pattern(Vec<bool>);

    impl Ephemeris for Pattern {
        fn state_vector(&self, id: &str, _: DateTime<Utc>) -> Result<StateVector, PredictError> {
            Err(PredictError::UnknownSatellite(id.to_string()))
        }

        fn observed_events(
            &self,
            _: &GroundStation,
            _: &str,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> Result<Vec<EventSample<DateTime<Utc>>>, PredictError> {
            Ok(Vec::new())
        }

        fn is_sunlit(&self, _: &str, times: &[DateTime<Utc>]) -> Result<Vec<bool>, PredictError> {
            Ok(times
                .iter()
                .enumerate()
                .map(|(i, _)| self.0.get(i).copied().unwrap_or(false))
                .collect())
        }
    }

    #[test]
    fn test_iss_passes_over_a_day() {
        let table = iss_table();
        let window = Window::new(epoch(), epoch() + Duration::days(1));
        let passes = predict_passes(
            &table,
            &munich(),
            ISS_NAME,
            window,
            &IntervalExtractor::default(),
            0.0,
        )
        .unwrap();

        // A 51.6 degree orbit is seen from 48 N several times a day
        assert!(!passes.is_empty());
        for pair in passes.windows(2) {
            assert!(pair[0].los <= pair[1].aos);
        }
        for pass in &passes {
            assert!(pass.aos <= pass.tca && pass.tca <= pass.los, "{:?}", pass);
            assert!(pass.max_elevation_deg >= 0.0 && pass.max_elevation_deg <= 90.0);
            assert!(pass.duration_seconds > 0 && pass.duration_seconds < 15 * 60);
            assert!((0.0..360.0).contains(&pass.aos_azimuth_deg));
        }

        let high = predict_passes(
            &table,
            &munich(),
            ISS_NAME,
            window,
            &IntervalExtractor::default(),
            30.0,
        )
        .unwrap();
        assert!(high.len() <= passes.len());
        assert!(high.iter().all(|p| p.max_elevation_deg >= 30.0));
    }

    #[test]
    fn test_access_windows_cover_passes() {
        let table = iss_table();
        let window = Window::new(epoch(), epoch() + Duration::days(1));
        let ids = vec![ISS_NAME.to_string()];
        let access = access_windows(&table, &munich(), &ids, window).unwrap();
        assert_eq!(access.len(), 1);

        let passes = predict_passes(
            &table,
            &munich(),
            ISS_NAME,
            window,
            &IntervalExtractor::default(),
            0.0,
        )
        .unwrap();
        for pass in &passes {
            assert!(access[0]
                .windows
                .iter()
                .any(|w| w.start() <= pass.aos && pass.los <= w.end()));
        }
    }

    #[test]
    fn test_unknown_satellite() {
        let table = iss_table();
        let window = Window::new(epoch(), epoch() + Duration::hours(1));
        let ids = vec!["NOPE".to_string()];
        assert!(access_windows(&table, &munich(), &ids, window).is_err());
    }

    #[test]
    fn test_lighting_splits_sunlit_and_eclipse() {
        let pattern = Pattern(vec![true, true, false, false, true]);
        let step = Duration::minutes(10);
        let window = Window::new(epoch(), epoch() + Duration::minutes(40));
        let lighting = lighting(&pattern, "SAT", window, step, &IntervalExtractor::default())
            .unwrap();

        let minutes = |t: DateTime<Utc>| (t - epoch()).num_minutes();
        assert_eq!(lighting.sunlit.len(), 1);
        assert_eq!(minutes(lighting.sunlit[0].start()), 0);
        assert_eq!(minutes(lighting.sunlit[0].end()), 20);
        assert_eq!(lighting.eclipse.len(), 1);
        assert_eq!(minutes(lighting.eclipse[0].start()), 20);
        assert_eq!(minutes(lighting.eclipse[0].end()), 40);
    }

    #[test]
    fn test_iss_sees_eclipse_each_orbit() {
        let table = iss_table();
        let window = Window::new(epoch(), epoch() + Duration::hours(3));
        let lit = lighting(
            &table,
            ISS_NAME,
            window,
            Duration::seconds(30),
            &IntervalExtractor::default(),
        )
        .unwrap();
        assert!(!lit.eclipse.is_empty());
        for eclipse in &lit.eclipse {
            let minutes = eclipse.duration::<Duration>().num_minutes();
            assert!(minutes <= 40, "eclipse of {} min", minutes);
        }
    }
}
