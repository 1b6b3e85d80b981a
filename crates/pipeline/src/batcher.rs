// Rust guideline compliant 2026-02-16

//! Batcher: enforces `batch_size` and `batch_delay` ceilings over a stream
//! of [`IdentifiedTimestamp`] slices (spec §4.3).

use domain::{ConfigError, IdentifiedTimestamp, TimestampBatch};

/// `batch_delay` below this is rejected at construction (spec §4.3).
pub const MIN_BATCH_DELAY_SECONDS: f64 = 0.1;
/// `batch_size` below this is rejected at construction (spec §4.3).
pub const MIN_BATCH_SIZE: usize = 1;

/// Validated configuration for a [`Batcher`].
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    pub size: Option<usize>,
    pub delay: Option<f64>,
}

impl BatchConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError`] when neither ceiling is set, when `size` is
    /// below [`MIN_BATCH_SIZE`], or `delay` below [`MIN_BATCH_DELAY_SECONDS`].
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.size.is_none() && self.delay.is_none() {
            return Err(ConfigError {
                reason: "at least one of batch.size or batch.delay must be set".to_owned(),
                context: domain::errors::context([]),
            });
        }
        if let Some(size) = self.size
            && size < MIN_BATCH_SIZE
        {
            return Err(ConfigError {
                reason: format!("batch.size must be >= {MIN_BATCH_SIZE}"),
                context: domain::errors::context([]),
            });
        }
        if let Some(delay) = self.delay
            && delay < MIN_BATCH_DELAY_SECONDS
        {
            return Err(ConfigError {
                reason: format!("batch.delay must be >= {MIN_BATCH_DELAY_SECONDS}s"),
                context: domain::errors::context([]),
            });
        }
        Ok(self)
    }
}

/// Accumulates merger output into batches respecting `batch_size` and
/// `batch_delay`.
#[derive(Debug)]
pub struct Batcher {
    config: BatchConfig,
    accumulated: Vec<IdentifiedTimestamp>,
    cutoff_micros: Option<i64>,
}

impl Batcher {
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self { config, accumulated: Vec::new(), cutoff_micros: None }
    }

    /// Feed one merger slice, returning zero or more ready batches.
    ///
    /// An incoming slice can both complete the current batch and seed the
    /// next, so this may return more than one batch per call.
    pub fn push(&mut self, mut array: Vec<IdentifiedTimestamp>) -> Vec<TimestampBatch> {
        let mut ready = Vec::new();

        while !array.is_empty() {
            if self.accumulated.is_empty() {
                if let Some(delay) = self.config.delay {
                    let first = array[0].timestamp.as_micros();
                    self.cutoff_micros = Some(first + (delay * 1_000_000.0).round() as i64);
                }
            }

            let delay_index = match self.cutoff_micros {
                Some(cutoff) => array.iter().position(|it| it.timestamp.as_micros() > cutoff).unwrap_or(array.len()),
                None => array.len(),
            };
            let size_index = match self.config.size {
                Some(size) => size.saturating_sub(self.accumulated.len()),
                None => array.len(),
            };
            let cut = delay_index.min(size_index).min(array.len());

            if cut == array.len() {
                self.accumulated.append(&mut array);
                break;
            }

            let remainder = array.split_off(cut);
            self.accumulated.append(&mut array);
            ready.push(TimestampBatch::new(std::mem::take(&mut self.accumulated)));
            self.cutoff_micros = None;
            array = remainder;
        }

        ready
    }

    /// Flush any partially accumulated batch at end-of-stream.
    #[must_use]
    pub fn flush(&mut self) -> Option<TimestampBatch> {
        if self.accumulated.is_empty() {
            None
        } else {
            self.cutoff_micros = None;
            Some(TimestampBatch::new(std::mem::take(&mut self.accumulated)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchConfig, Batcher};
    use domain::{IdentifiedTimestamp, ProducerId, Timestamp};

    fn it(micros: i64) -> IdentifiedTimestamp {
        IdentifiedTimestamp { timestamp: Timestamp::from_micros(micros), producer_id: ProducerId::new(0) }
    }

    #[test]
    fn size_only_emits_on_exact_count() {
        let config = BatchConfig { size: Some(3), delay: None }.validate().unwrap();
        let mut batcher = Batcher::new(config);
        let ready = batcher.push(vec![it(1), it(2), it(3), it(4)]);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].len(), 3);
        let flushed = batcher.flush().unwrap();
        assert_eq!(flushed.len(), 1);
    }

    #[test]
    fn delay_only_emits_on_span_cutoff() {
        let config = BatchConfig { size: None, delay: Some(1.0) }.validate().unwrap();
        let mut batcher = Batcher::new(config);
        // span 0..1_500_000us = 1.5s > 1s delay -> cut before the 1.5s item.
        let ready = batcher.push(vec![it(0), it(500_000), it(1_500_000)]);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].len(), 2);
        let flushed = batcher.flush().unwrap();
        assert_eq!(flushed.len(), 1);
    }

    #[test]
    fn rejects_config_with_neither_ceiling() {
        let err = BatchConfig { size: None, delay: None }.validate();
        assert!(err.is_err());
    }

    #[test]
    fn rejects_delay_below_minimum() {
        let err = BatchConfig { size: None, delay: Some(0.01) }.validate();
        assert!(err.is_err());
    }

    #[test]
    fn both_ceilings_whichever_fires_first_wins() {
        let config = BatchConfig { size: Some(10), delay: Some(1.0) }.validate().unwrap();
        let mut batcher = Batcher::new(config);
        let ready = batcher.push(vec![it(0), it(500_000), it(2_000_000)]);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].len(), 2);
    }
}
