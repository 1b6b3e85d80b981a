// Rust guideline compliant 2026-02-16

//! Single time-pattern producer: oscillator -> multiplier -> randomizer ->
//! spreader, composed exactly in that order (spec §4.1.1).

use super::oscillator::Oscillator;
use super::randomizer::Randomizer;
use super::spreader::Spreader;
use crate::Clock;
use chrono::{DateTime, Utc};
use domain::{InputPlugin, ProducerId, Tags, Timestamp};
use rand::{rngs::StdRng, SeedableRng};
use std::collections::VecDeque;

/// The multiplier step is a single integer ratio: signals per period
/// before randomization.
#[derive(Debug, Clone, Copy)]
pub struct Multiplier {
    pub ratio: u32,
}

pub struct TimePatternProducer {
    id: ProducerId,
    tags: Tags,
    oscillator: Oscillator,
    multiplier: Multiplier,
    randomizer: Randomizer,
    spreader: Spreader,
    rng: StdRng,
    periods: Box<dyn Iterator<Item = DateTime<Utc>> + Send>,
    pending: VecDeque<DateTime<Utc>>,
    skip_past: bool,
}

impl std::fmt::Debug for TimePatternProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimePatternProducer").field("id", &self.id).finish()
    }
}

impl TimePatternProducer {
    #[must_use]
    pub fn new(
        id: ProducerId,
        tags: Tags,
        oscillator: Oscillator,
        multiplier: Multiplier,
        randomizer: Randomizer,
        spreader: Spreader,
        _clock: &impl Clock,
        skip_past: bool,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let periods: Vec<DateTime<Utc>> = oscillator.periods().collect();
        Self {
            id,
            tags,
            oscillator,
            multiplier,
            randomizer,
            spreader,
            rng,
            periods: Box::new(periods.into_iter()),
            pending: VecDeque::new(),
            skip_past,
        }
    }

    fn refill_one_period(&mut self) -> bool {
        let Some(period_start) = self.periods.next() else {
            return false;
        };
        let factor = self.randomizer.next_factor(&mut self.rng);
        let size = ((self.multiplier.ratio as f64) * factor).round().max(0.0) as usize;
        if size == 0 {
            return true;
        }
        let fractions = self.spreader.sample(size, &mut self.rng);
        let duration = self.oscillator.period_duration();
        for fraction in fractions {
            let offset_micros = (duration.num_microseconds().unwrap_or(0) as f64 * fraction) as i64;
            self.pending.push_back(period_start + chrono::Duration::microseconds(offset_micros));
        }
        true
    }
}

impl InputPlugin for TimePatternProducer {
    fn id(&self) -> ProducerId {
        self.id
    }

    fn tags(&self) -> Tags {
        self.tags.clone()
    }

    fn next_array(&mut self, size: usize) -> Option<Vec<Timestamp>> {
        loop {
            while self.pending.len() < size {
                if !self.refill_one_period() {
                    break;
                }
            }
            if self.pending.is_empty() {
                return None;
            }
            let take = size.min(self.pending.len());
            let mut batch: Vec<DateTime<Utc>> = self.pending.drain(..take).collect();
            if self.skip_past {
                let now = chrono::Utc::now();
                batch.retain(|t| *t >= now);
            }
            if !batch.is_empty() {
                return Some(batch.into_iter().map(|dt| Timestamp::from_naive(dt.naive_utc())).collect());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Multiplier, TimePatternProducer};
    use crate::time_patterns::oscillator::{Oscillator, OscillatorConfig, TimeUnit};
    use crate::time_patterns::randomizer::{Randomizer, RandomizerConfig};
    use crate::time_patterns::spreader::Spreader;
    use crate::FixedClock;
    use chrono::{TimeZone, Utc};
    use domain::{InputPlugin, ProducerId, Tags};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn emits_roughly_ratio_events_per_period() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = start + chrono::Duration::hours(4);
        let oscillator =
            Oscillator::new(OscillatorConfig { start, end, period: 1, unit: TimeUnit::Hours });
        let mut seed_rng = StdRng::seed_from_u64(9);
        let randomizer = Randomizer::new(
            RandomizerConfig { deviation: 0.0, sampling: 8, ..RandomizerConfig::default() },
            &mut seed_rng,
        );
        let spreader = Spreader::Uniform { low: 0.0, high: 1.0 };
        let clock = FixedClock(start);
        let mut producer = TimePatternProducer::new(
            ProducerId::new(0),
            Tags::from(vec![]),
            oscillator,
            Multiplier { ratio: 5 },
            randomizer,
            spreader,
            &clock,
            false,
            Some(9),
        );
        let mut total = 0;
        while let Some(batch) = producer.next_array(1000) {
            total += batch.len();
        }
        // Deviation 0 -> factor always 1.0 -> exactly ratio per period.
        assert_eq!(total, 5 * 4);
    }
}
