// Rust guideline compliant 2026-02-16

//! `cron` input producer (spec §4.1): emits `count` identical timestamps at
//! every moment matching a cron expression within `[start, end]`.

use crate::Clock;
use chrono::{DateTime, Utc};
use domain::{InitError, InputPlugin, ProducerId, Tags, Timestamp};
use std::collections::VecDeque;
use std::str::FromStr;

/// Validated configuration for a [`CronProducer`].
#[derive(Debug, Clone)]
pub struct CronConfig {
    pub expression: String,
    pub count: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Produces `count` copies of every timestamp matching `expression` in
/// `[start, end]`, inclusive of both endpoints.
pub struct CronProducer {
    id: ProducerId,
    tags: Tags,
    pending: VecDeque<DateTime<Utc>>,
    remaining: Box<dyn Iterator<Item = DateTime<Utc>> + Send>,
    exhausted: bool,
}

impl std::fmt::Debug for CronProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronProducer").field("id", &self.id).field("exhausted", &self.exhausted).finish()
    }
}

impl CronProducer {
    /// Parse `config.expression` and position the iterator at `config.start`
    /// (or at `clock.now()` when `skip_past` is set and that's later).
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] if `expression` fails to parse.
    pub fn new(
        config: CronConfig,
        id: ProducerId,
        tags: Tags,
        clock: &impl Clock,
        skip_past: bool,
    ) -> Result<Self, InitError> {
        let schedule = cron::Schedule::from_str(&config.expression).map_err(|e| InitError {
            reason: format!("invalid cron expression: {e}"),
            context: domain::errors::context([("expression", config.expression.as_str())]),
        })?;

        let effective_start = if skip_past && clock.now() > config.start {
            clock.now()
        } else {
            config.start
        };

        let end = config.end;
        let count = config.count;
        // `.after` yields strictly-greater matches; step back a second so a
        // match exactly at `effective_start` is still included.
        let anchor = effective_start - chrono::Duration::seconds(1);
        let moments = schedule
            .after(&anchor)
            .take_while(move |dt| *dt <= end)
            .flat_map(move |dt| std::iter::repeat(dt).take(count));

        Ok(Self { id, tags, pending: VecDeque::new(), remaining: Box::new(moments), exhausted: false })
    }
}

impl InputPlugin for CronProducer {
    fn id(&self) -> ProducerId {
        self.id
    }

    fn tags(&self) -> Tags {
        self.tags.clone()
    }

    fn next_array(&mut self, size: usize) -> Option<Vec<Timestamp>> {
        if self.exhausted && self.pending.is_empty() {
            return None;
        }
        while self.pending.len() < size {
            match self.remaining.next() {
                Some(dt) => self.pending.push_back(dt),
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }
        if self.pending.is_empty() {
            return None;
        }
        let take = size.min(self.pending.len());
        Some(self.pending.drain(..take).map(|dt| Timestamp::from_naive(dt.naive_utc())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{CronConfig, CronProducer};
    use crate::FixedClock;
    use chrono::{TimeZone, Utc};
    use domain::{InputPlugin, ProducerId, Tags};

    fn tags() -> Tags {
        Tags::from(vec!["cron".to_owned()])
    }

    #[test]
    fn every_minute_over_one_day_yields_1440_times_count() {
        let config = CronConfig {
            expression: "* * * * *".to_owned(),
            count: 2,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
        };
        let clock = FixedClock(config.start);
        let mut producer =
            CronProducer::new(config, ProducerId::new(0), tags(), &clock, false).unwrap();

        let mut all = Vec::new();
        while let Some(batch) = producer.next_array(500) {
            all.extend(batch);
        }
        assert_eq!(all.len(), 1440 * 2);
        assert_eq!(all.first().unwrap().to_naive(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().naive_utc());
        assert_eq!(
            all.last().unwrap().to_naive(),
            Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 0).unwrap().naive_utc()
        );
    }

    #[test]
    fn skip_past_advances_to_now() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();
        let config = CronConfig { expression: "* * * * *".to_owned(), count: 1, start, end };
        let clock = FixedClock(now);
        let mut producer =
            CronProducer::new(config, ProducerId::new(0), tags(), &clock, true).unwrap();
        let first = producer.next_array(1).unwrap();
        assert_eq!(first[0].to_naive(), now.naive_utc());
    }
}
