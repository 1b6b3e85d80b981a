// Rust guideline compliant 2026-02-16

//! `static` input producer (spec §4.1): emits `count` copies of "now at
//! start" -- a single instant, repeated.

use crate::Clock;
use chrono::{DateTime, Utc};
use domain::{InputPlugin, ProducerId, Tags, Timestamp};

/// Validated configuration for a [`StaticProducer`].
#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub start: DateTime<Utc>,
    pub count: usize,
}

#[derive(Debug)]
pub struct StaticProducer {
    id: ProducerId,
    tags: Tags,
    timestamp: Option<Timestamp>,
    remaining: usize,
}

impl StaticProducer {
    #[must_use]
    pub fn new(
        config: StaticConfig,
        id: ProducerId,
        tags: Tags,
        clock: &impl Clock,
        skip_past: bool,
    ) -> Self {
        let skipped = skip_past && config.start < clock.now();
        let timestamp =
            if skipped { None } else { Some(Timestamp::from_naive(config.start.naive_utc())) };
        Self { id, tags, timestamp, remaining: config.count }
    }
}

impl InputPlugin for StaticProducer {
    fn id(&self) -> ProducerId {
        self.id
    }

    fn tags(&self) -> Tags {
        self.tags.clone()
    }

    fn next_array(&mut self, size: usize) -> Option<Vec<Timestamp>> {
        let timestamp = self.timestamp?;
        if self.remaining == 0 {
            return None;
        }
        let take = size.min(self.remaining);
        self.remaining -= take;
        Some(vec![timestamp; take])
    }
}

#[cfg(test)]
mod tests {
    use super::{StaticConfig, StaticProducer};
    use crate::FixedClock;
    use chrono::{TimeZone, Utc};
    use domain::{InputPlugin, ProducerId, Tags};

    #[test]
    fn emits_count_identical_timestamps() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let config = StaticConfig { start, count: 3 };
        let clock = FixedClock(start);
        let mut producer =
            StaticProducer::new(config, ProducerId::new(0), Tags::from(vec![]), &clock, false);
        let batch = producer.next_array(10).unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|t| *t == batch[0]));
        assert_eq!(producer.next_array(10), None);
    }

    #[test]
    fn skip_past_with_start_before_now_yields_nothing() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = start + chrono::Duration::seconds(1);
        let config = StaticConfig { start, count: 3 };
        let clock = FixedClock(now);
        let mut producer =
            StaticProducer::new(config, ProducerId::new(0), Tags::from(vec![]), &clock, true);
        assert_eq!(producer.next_array(10), None);
    }
}
