// Rust guideline compliant 2026-02-16

//! Timestamp production pipeline: merger, batcher, and the live-mode
//! scheduler (spec §4.2-4.4). Depends only on `domain`.

pub mod batcher;
pub mod merger;
pub mod scheduler;

pub use batcher::{BatchConfig, Batcher, MIN_BATCH_DELAY_SECONDS, MIN_BATCH_SIZE};
pub use merger::Merger;
pub use scheduler::{Clock, Scheduler, SystemClock};
