use crate::intervals::error::IntervalError;
use crate::intervals::types::{
    EventKind, EventSample, ExtractorPolicy, Interval, StateSample, Window,
};

struct Pending<T> {
    start: T,
    peak: Option<f64>,
}

/// Turns time-ordered event or state streams into intervals.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalExtractor {
    policy: ExtractorPolicy,
}

impl IntervalExtractor {
    pub fn new(policy: ExtractorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ExtractorPolicy {
        self.policy
    }

    /// Rise/culminate/set stream to intervals.
    ///
    /// `peak_metric` is evaluated at each culmination that falls inside an
    /// open interval; the largest value is kept.
    pub fn extract_events<T, F>(
        &self,
        samples: &[EventSample<T>],
        window: &Window<T>,
        mut peak_metric: F,
    ) -> Result<Vec<Interval<T>>, IntervalError>
    where
        T: PartialOrd + Copy,
        F: FnMut(T) -> f64,
    {
        if window.end < window.start {
            return Err(IntervalError::InvalidWindow);
        }
        check_ordered(samples.iter().map(|s| s.time))?;
        check_in_window(samples.iter().map(|s| s.time), window)?;

        let mut intervals = Vec::new();
        let mut pending: Option<Pending<T>> = None;
        let mut opened_any = false;

        for (index, sample) in samples.iter().enumerate() {
            match sample.kind {
                EventKind::Rise => {
                    if pending.is_some() {
                        log::debug!("rise at sample {} restarts an open interval", index);
                    }
                    pending = Some(Pending {
                        start: sample.time,
                        peak: None,
                    });
                    opened_any = true;
                }
                EventKind::Culminate => match pending.as_mut() {
                    Some(open) => {
                        let value = peak_metric(sample.time);
                        open.peak = Some(open.peak.map_or(value, |p| p.max(value)));
                    }
                    None => {
                        log::debug!("culmination at sample {} has no rise, discarded", index);
                    }
                },
                EventKind::Set => match pending.take() {
                    Some(open) => self.emit(&mut intervals, open.start, sample.time, open.peak),
                    None if !opened_any => {
                        // Already up when the window opened
                        opened_any = true;
                        self.emit(&mut intervals, window.start, sample.time, None);
                    }
                    None => {
                        log::debug!("set at sample {} has no rise, discarded", index);
                    }
                },
            }
        }

        if let Some(open) = pending {
            if self.policy.emit_open_at_end {
                self.emit(&mut intervals, open.start, window.end, open.peak);
            } else {
                log::debug!("interval still open at the end of the window, dropped");
            }
        }

        Ok(intervals)
    }

    /// Boolean state stream to intervals where the state was true.
    pub fn extract_states<T>(
        &self,
        samples: &[StateSample<T>],
    ) -> Result<Vec<Interval<T>>, IntervalError>
    where
        T: PartialOrd + Copy,
    {
        check_ordered(samples.iter().map(|s| s.time))?;

        let mut intervals = Vec::new();
        let mut pending: Option<T> = None;
        let mut previous = false;

        for sample in samples {
            match (previous, sample.state) {
                // Covers a true first sample too: it opens at its own time
                (false, true) => pending = Some(sample.time),
                (true, false) => {
                    if let Some(start) = pending.take() {
                        intervals.push(Interval::new(start, sample.time, None));
                    }
                }
                _ => {}
            }
            previous = sample.state;
        }

        if let (Some(start), Some(last)) = (pending, samples.last()) {
            if self.policy.emit_open_at_end {
                intervals.push(Interval::new(start, last.time, None));
            } else {
                log::debug!("state still true at the last sample, interval dropped");
            }
        }

        Ok(intervals)
    }

    fn emit<T: Copy>(&self, out: &mut Vec<Interval<T>>, start: T, end: T, peak: Option<f64>) {
        if self.policy.require_culmination && peak.is_none() {
            log::debug!("interval without culmination dropped");
            return;
        }
        out.push(Interval::new(start, end, peak));
    }
}

/// [`IntervalExtractor::extract_events`] with the default policy.
pub fn extract_events<T, F>(
    samples: &[EventSample<T>],
    window: &Window<T>,
    peak_metric: F,
) -> Result<Vec<Interval<T>>, IntervalError>
where
    T: PartialOrd + Copy,
    F: FnMut(T) -> f64,
{
    IntervalExtractor::default().extract_events(samples, window, peak_metric)
}

/// [`IntervalExtractor::extract_states`] with the default policy.
pub fn extract_states<T>(samples: &[StateSample<T>]) -> Result<Vec<Interval<T>>, IntervalError>
where
    T: PartialOrd + Copy,
{
    IntervalExtractor::default().extract_states(samples)
}

fn check_ordered<T: PartialOrd>(times: impl Iterator<Item = T>) -> Result<(), IntervalError> {
    let mut previous: Option<T> = None;
    for (index, time) in times.enumerate() {
        if let Some(prev) = previous {
            // Also rejects incomparable values such as NaN
            if !(prev <= time) {
                return Err(IntervalError::Unordered { index });
            }
        }
        previous = Some(time);
    }
    Ok(())
}

fn check_in_window<T: PartialOrd>(
    times: impl Iterator<Item = T>,
    window: &Window<T>,
) -> Result<(), IntervalError> {
    for (index, time) in times.enumerate() {
        if time < window.start || time > window.end {
            return Err(IntervalError::OutsideWindow { index });
        }
    }
    Ok(())
}
