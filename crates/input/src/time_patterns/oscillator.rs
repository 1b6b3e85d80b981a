// Rust guideline compliant 2026-02-16

//! Oscillator transform (spec §4.1.1 step 1): partitions `[start, end]`
//! into equal periods of duration `period * unit`.

use chrono::{DateTime, TimeDelta, Utc};

/// Unit a period's duration is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

/// Validated configuration for an [`Oscillator`].
#[derive(Debug, Clone, Copy)]
pub struct OscillatorConfig {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period: i64,
    pub unit: TimeUnit,
}

#[derive(Debug, Clone, Copy)]
pub struct Oscillator {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    period_duration: TimeDelta,
}

impl Oscillator {
    #[must_use]
    pub fn new(config: OscillatorConfig) -> Self {
        let period_duration = match config.unit {
            TimeUnit::Seconds => TimeDelta::seconds(config.period),
            TimeUnit::Minutes => TimeDelta::minutes(config.period),
            TimeUnit::Hours => TimeDelta::hours(config.period),
            TimeUnit::Days => TimeDelta::days(config.period),
        };
        Self { start: config.start, end: config.end, period_duration }
    }

    #[must_use]
    pub fn period_duration(&self) -> TimeDelta {
        self.period_duration
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Iterate over every period's start instant, from `start` to `end`
    /// exclusive of the first period whose start is `>= end`.
    pub fn periods(&self) -> impl Iterator<Item = DateTime<Utc>> {
        let mut current = self.start;
        let end = self.end;
        let step = self.period_duration;
        std::iter::from_fn(move || {
            if current >= end {
                None
            } else {
                let this = current;
                current += step;
                Some(this)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Oscillator, OscillatorConfig, TimeUnit};
    use chrono::{TimeZone, Utc};

    #[test]
    fn periods_cover_the_whole_range() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = start + chrono::Duration::hours(3);
        let oscillator =
            Oscillator::new(OscillatorConfig { start, end, period: 1, unit: TimeUnit::Hours });
        let periods: Vec<_> = oscillator.periods().collect();
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0], start);
        assert_eq!(periods[2], start + chrono::Duration::hours(2));
    }
}
