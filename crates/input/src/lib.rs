// Rust guideline compliant 2026-02-16

//! Input producers for the Eventum generation pipeline.
//!
//! Each producer kind implements `domain::InputPlugin`: a pull-based source
//! of timestamp arrays, consumed by the merger in `pipeline`. Most producers
//! depend only on `domain`; the composite `time_patterns` producer also
//! depends on `pipeline` to merge its sub-patterns.

pub mod cron_producer;
pub mod http;
pub mod linspace;
pub mod static_producer;
pub mod time_patterns;
pub mod timer;
pub mod timestamps;

pub use cron_producer::{CronConfig, CronProducer};
pub use http::{HttpConfig, HttpProducer};
pub use linspace::{LinspaceConfig, LinspaceProducer};
pub use static_producer::{StaticConfig, StaticProducer};
pub use time_patterns::{PatternSpec, TimePatternsProducer};
pub use timer::{TimerConfig, TimerProducer};
pub use timestamps::{TimestampsProducer, TimestampsSource};

use chrono::{DateTime, Utc};

/// Wall-clock source, injected so producers are deterministically testable.
///
/// Mirrors the teacher's pattern of injecting every external dependency
/// (RNG, buffer, model) rather than reading global state directly.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
