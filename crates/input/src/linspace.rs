// Rust guideline compliant 2026-02-16

//! `linspace` input producer (spec §4.1): emits exactly `count` timestamps
//! linearly spaced in `[start, end]`, inclusive/exclusive of `end` per
//! `endpoint`.

use crate::Clock;
use chrono::{DateTime, Utc};
use domain::{InitError, InputPlugin, ProducerId, Tags, Timestamp};

/// Validated configuration for a [`LinspaceProducer`].
#[derive(Debug, Clone)]
pub struct LinspaceConfig {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub count: usize,
    /// When `true`, the last sample lands exactly on `end`.
    pub endpoint: bool,
}

pub struct LinspaceProducer {
    id: ProducerId,
    tags: Tags,
    points: std::vec::IntoIter<DateTime<Utc>>,
}

impl std::fmt::Debug for LinspaceProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinspaceProducer").field("id", &self.id).finish()
    }
}

impl LinspaceProducer {
    /// # Errors
    ///
    /// Returns [`InitError`] when `count == 0`.
    pub fn new(
        config: LinspaceConfig,
        id: ProducerId,
        tags: Tags,
        clock: &impl Clock,
        skip_past: bool,
    ) -> Result<Self, InitError> {
        if config.count == 0 {
            return Err(InitError {
                reason: "linspace count must be >= 1".to_owned(),
                context: domain::errors::context([]),
            });
        }

        let span_micros = (config.end - config.start).num_microseconds().unwrap_or(0);
        let denom = if config.endpoint {
            (config.count - 1).max(1) as f64
        } else {
            config.count as f64
        };
        let mut points: Vec<DateTime<Utc>> = (0..config.count)
            .map(|i| {
                let offset = (span_micros as f64 * i as f64 / denom).round() as i64;
                config.start + chrono::Duration::microseconds(offset)
            })
            .collect();

        if skip_past {
            let now = clock.now();
            points.retain(|p| *p >= now);
        }

        Ok(Self { id, tags, points: points.into_iter() })
    }
}

impl InputPlugin for LinspaceProducer {
    fn id(&self) -> ProducerId {
        self.id
    }

    fn tags(&self) -> Tags {
        self.tags.clone()
    }

    fn next_array(&mut self, size: usize) -> Option<Vec<Timestamp>> {
        let batch: Vec<Timestamp> =
            (&mut self.points).take(size).map(|dt| Timestamp::from_naive(dt.naive_utc())).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LinspaceConfig, LinspaceProducer};
    use crate::FixedClock;
    use chrono::{TimeZone, Utc};
    use domain::{InputPlugin, ProducerId, Tags};

    #[test]
    fn five_points_with_endpoint() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = start + chrono::Duration::seconds(1);
        let config = LinspaceConfig { start, end, count: 5, endpoint: true };
        let clock = FixedClock(start);
        let mut producer = LinspaceProducer::new(
            config,
            ProducerId::new(0),
            Tags::from(vec![]),
            &clock,
            false,
        )
        .unwrap();
        let all = producer.next_array(100).unwrap();
        let start_ts = domain::Timestamp::from_naive(start.naive_utc());
        let offsets: Vec<i64> = all.iter().map(|t| t.micros_since(start_ts)).collect();
        assert_eq!(offsets, vec![0, 250_000, 500_000, 750_000, 1_000_000]);
    }
}
