// Rust guideline compliant 2026-02-16

//! `timestamps` input producer (spec §4.1): emits timestamps read verbatim
//! from a list or a newline-separated file.

use crate::Clock;
use chrono::{DateTime, Utc};
use domain::{InitError, InputPlugin, ProducerId, Tags, Timestamp};

/// Validated configuration for a [`TimestampsProducer`].
#[derive(Debug, Clone)]
pub enum TimestampsSource {
    List(Vec<DateTime<Utc>>),
    File(std::path::PathBuf),
}

#[derive(Debug)]
pub struct TimestampsProducer {
    id: ProducerId,
    tags: Tags,
    items: std::vec::IntoIter<Timestamp>,
}

impl TimestampsProducer {
    /// # Errors
    ///
    /// Returns [`InitError`] if the source file cannot be read, or any line
    /// fails to parse as an RFC 3339 timestamp.
    pub fn new(
        source: TimestampsSource,
        id: ProducerId,
        tags: Tags,
        clock: &impl Clock,
        skip_past: bool,
    ) -> Result<Self, InitError> {
        let raw: Vec<DateTime<Utc>> = match source {
            TimestampsSource::List(items) => items,
            TimestampsSource::File(path) => {
                let text = std::fs::read_to_string(&path).map_err(|e| InitError {
                    reason: format!("failed to read timestamps file: {e}"),
                    context: domain::errors::context([("path", &path.to_string_lossy())]),
                })?;
                text.lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| {
                        DateTime::parse_from_rfc3339(line.trim())
                            .map(|dt| dt.with_timezone(&Utc))
                            .map_err(|e| InitError {
                                reason: format!("invalid timestamp line: {e}"),
                                context: domain::errors::context([("line", line)]),
                            })
                    })
                    .collect::<Result<_, _>>()?
            }
        };

        let mut items = raw;
        if skip_past {
            let now = clock.now();
            items.retain(|ts| *ts >= now);
        }

        let items = items.into_iter().map(|dt| Timestamp::from_naive(dt.naive_utc())).collect::<Vec<_>>();
        Ok(Self { id, tags, items: items.into_iter() })
    }
}

impl InputPlugin for TimestampsProducer {
    fn id(&self) -> ProducerId {
        self.id
    }

    fn tags(&self) -> Tags {
        self.tags.clone()
    }

    fn next_array(&mut self, size: usize) -> Option<Vec<Timestamp>> {
        let batch: Vec<Timestamp> = (&mut self.items).take(size).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TimestampsProducer, TimestampsSource};
    use crate::FixedClock;
    use chrono::{TimeZone, Utc};
    use domain::{InputPlugin, ProducerId, Tags};

    #[test]
    fn list_source_emits_in_order() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        let clock = FixedClock(t1);
        let mut producer = TimestampsProducer::new(
            TimestampsSource::List(vec![t1, t2]),
            ProducerId::new(0),
            Tags::from(vec![]),
            &clock,
            false,
        )
        .unwrap();
        let batch = producer.next_array(10).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch[0] < batch[1]);
    }

    #[test]
    fn skip_past_filters_earlier_entries() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock(now);
        let mut producer = TimestampsProducer::new(
            TimestampsSource::List(vec![t1, t2]),
            ProducerId::new(0),
            Tags::from(vec![]),
            &clock,
            true,
        )
        .unwrap();
        let batch = producer.next_array(10).unwrap();
        assert_eq!(batch.len(), 1);
    }
}
