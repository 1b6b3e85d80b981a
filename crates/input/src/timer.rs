// Rust guideline compliant 2026-02-16

//! `timer` input producer (spec §4.1): after an initial `start`, emits
//! `count` timestamps every `seconds`, repeating `repeat` times or forever.

use crate::Clock;
use chrono::{DateTime, TimeDelta, Utc};
use domain::{InputPlugin, ProducerId, Tags, Timestamp};
use std::collections::VecDeque;

/// Validated configuration for a [`TimerProducer`].
#[derive(Debug, Clone)]
pub struct TimerConfig {
    pub start: DateTime<Utc>,
    pub seconds: f64,
    pub count: usize,
    /// `None` means repeat forever.
    pub repeat: Option<u64>,
}

pub struct TimerProducer {
    id: ProducerId,
    tags: Tags,
    tick: u64,
    next_tick_at: DateTime<Utc>,
    step: TimeDelta,
    count: usize,
    repeat: Option<u64>,
    pending: VecDeque<DateTime<Utc>>,
    exhausted: bool,
}

impl std::fmt::Debug for TimerProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerProducer").field("id", &self.id).field("tick", &self.tick).finish()
    }
}

impl TimerProducer {
    #[must_use]
    pub fn new(
        config: TimerConfig,
        id: ProducerId,
        tags: Tags,
        clock: &impl Clock,
        skip_past: bool,
    ) -> Self {
        let step = TimeDelta::milliseconds((config.seconds * 1000.0).round() as i64);
        let mut tick = 0u64;
        let mut next_tick_at = config.start;

        if skip_past && step > TimeDelta::zero() {
            let now = clock.now();
            while next_tick_at < now && config.repeat.is_none_or(|r| tick < r) {
                tick += 1;
                next_tick_at += step;
            }
        }

        let exhausted = config.repeat.is_some_and(|r| tick >= r);

        Self {
            id,
            tags,
            tick,
            next_tick_at,
            step,
            count: config.count,
            repeat: config.repeat,
            pending: VecDeque::new(),
            exhausted,
        }
    }

    fn refill(&mut self) {
        if self.exhausted {
            return;
        }
        if let Some(repeat) = self.repeat
            && self.tick >= repeat
        {
            self.exhausted = true;
            return;
        }
        for _ in 0..self.count {
            self.pending.push_back(self.next_tick_at);
        }
        self.tick += 1;
        self.next_tick_at += self.step;
    }
}

impl InputPlugin for TimerProducer {
    fn id(&self) -> ProducerId {
        self.id
    }

    fn tags(&self) -> Tags {
        self.tags.clone()
    }

    fn next_array(&mut self, size: usize) -> Option<Vec<Timestamp>> {
        while self.pending.len() < size && !self.exhausted {
            self.refill();
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
    use super::{TimerConfig, TimerProducer};
    use crate::FixedClock;
    use chrono::{TimeZone, Utc};
    use domain::{InputPlugin, ProducerId, Tags};

    fn tags() -> Tags {
        Tags::from(vec!["timer".to_owned()])
    }

    #[test]
    fn finite_repeat_emits_exact_count() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let config = TimerConfig { start, seconds: 10.0, count: 3, repeat: Some(4) };
        let clock = FixedClock(start);
        let mut producer = TimerProducer::new(config, ProducerId::new(0), tags(), &clock, false);
        let mut total = 0;
        while let Some(batch) = producer.next_array(5) {
            total += batch.len();
        }
        assert_eq!(total, 12);
    }

    #[test]
    fn skip_past_all_in_past_yields_nothing() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        let config = TimerConfig { start, seconds: 10.0, count: 1, repeat: Some(2) };
        let clock = FixedClock(now);
        let mut producer = TimerProducer::new(config, ProducerId::new(0), tags(), &clock, true);
        assert_eq!(producer.next_array(5), None);
    }
}
