// Rust guideline compliant 2026-02-16

//! Live-mode scheduler: paces batch emission against the wall clock
//! (spec §4.4). Sample mode skips this stage entirely.

use chrono::{DateTime, Utc};
use domain::TimestampBatch;
use std::time::Duration;

/// Wall-clock source and sleep primitive, injected for deterministic tests.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the real OS clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Gates each batch so it is released no earlier than its last timestamp.
#[derive(Debug)]
pub struct Scheduler<C> {
    clock: C,
}

impl<C: Clock> Scheduler<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Block, if necessary, until `batch`'s last timestamp has arrived, then
    /// return it unchanged.
    #[must_use]
    pub fn release(&self, batch: TimestampBatch) -> TimestampBatch {
        if let Some(last) = batch.as_slice().last() {
            let target = last.timestamp.to_naive().and_utc();
            let now = self.clock.now();
            if target > now {
                let delay = (target - now).to_std().unwrap_or(Duration::ZERO);
                self.clock.sleep(delay);
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, Scheduler};
    use chrono::{DateTime, TimeZone, Utc};
    use domain::{IdentifiedTimestamp, ProducerId, Timestamp, TimestampBatch};
    use std::cell::RefCell;
    use std::time::Duration;

    struct RecordingClock {
        now: DateTime<Utc>,
        slept: RefCell<Vec<Duration>>,
    }

    impl Clock for RecordingClock {
        fn now(&self) -> DateTime<Utc> {
            self.now
        }

        fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
        }
    }

    #[test]
    fn sleeps_for_the_gap_to_the_last_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let future = now + chrono::Duration::seconds(5);
        let clock = RecordingClock { now, slept: RefCell::new(vec![]) };
        let scheduler = Scheduler::new(clock);
        let batch = TimestampBatch::new(vec![IdentifiedTimestamp {
            timestamp: Timestamp::from_naive(future.naive_utc()),
            producer_id: ProducerId::new(0),
        }]);
        let released = scheduler.release(batch);
        assert_eq!(released.len(), 1);
        assert_eq!(scheduler.clock.slept.borrow().len(), 1);
        assert!(scheduler.clock.slept.borrow()[0] >= Duration::from_secs(4));
    }

    #[test]
    fn does_not_sleep_when_batch_is_already_past() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let past = now - chrono::Duration::seconds(5);
        let clock = RecordingClock { now, slept: RefCell::new(vec![]) };
        let scheduler = Scheduler::new(clock);
        let batch = TimestampBatch::new(vec![IdentifiedTimestamp {
            timestamp: Timestamp::from_naive(past.naive_utc()),
            producer_id: ProducerId::new(0),
        }]);
        scheduler.release(batch);
        assert!(scheduler.clock.slept.borrow().is_empty());
    }
}
