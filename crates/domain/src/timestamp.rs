// Rust guideline compliant 2026-02-16

//! Timestamp and batch types shared by every pipeline stage.

use std::sync::Arc;

/// Microsecond-precision instant, naive (no attached time zone).
///
/// Producers generate timestamps in the generator's configured time zone;
/// conversion to a time-zone-aware value happens only at the boundaries
/// (e.g. when a template reads `timestamp` or a writer logs wall time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Build a timestamp from a raw microsecond count.
    #[must_use]
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Raw microsecond count since the Unix epoch.
    #[must_use]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Interpret `self` as a naive datetime for rendering or display.
    #[must_use]
    pub fn to_naive(self) -> chrono::NaiveDateTime {
        chrono::DateTime::from_timestamp_micros(self.0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH)
            .naive_utc()
    }

    /// Build a timestamp from a naive datetime.
    #[must_use]
    pub fn from_naive(naive: chrono::NaiveDateTime) -> Self {
        Self(naive.and_utc().timestamp_micros())
    }

    /// Duration between two timestamps, in microseconds. May be negative.
    #[must_use]
    pub fn micros_since(self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}

/// Small integer identifying one producer within a single generator.
///
/// Dense over `[0, N)`: the merger and renderer rely on this to index
/// directly into a `Vec` of per-producer tag sets without a hash lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProducerId(u16);

impl ProducerId {
    #[must_use]
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Small strings attached by a producer to every timestamp it emits.
///
/// `Arc<[String]>` because the same tag set is shared by every timestamp
/// from one producer; cloning it per-event must stay cheap.
pub type Tags = Arc<[String]>;

/// A single timestamp paired with the id of the producer that emitted it.
///
/// Downstream of the merger, this is the unit the renderer consumes: it
/// looks up `producer_id` to find the tags to attach to the rendered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentifiedTimestamp {
    pub timestamp: Timestamp,
    pub producer_id: ProducerId,
}

/// Ordered sequence of [`IdentifiedTimestamp`], non-empty once it leaves
/// the merger.
///
/// Within a batch the sequence is non-decreasing by timestamp when the
/// "keep order" merge policy is in effect (the default -- see
/// `pipeline::merger`).
#[derive(Debug, Clone, Default)]
pub struct TimestampBatch {
    items: Vec<IdentifiedTimestamp>,
}

impl TimestampBatch {
    #[must_use]
    pub fn new(items: Vec<IdentifiedTimestamp>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[IdentifiedTimestamp] {
        &self.items
    }

    pub fn into_inner(self) -> Vec<IdentifiedTimestamp> {
        self.items
    }

    /// `last.timestamp - first.timestamp`, in microseconds. Zero for a
    /// single-item batch.
    ///
    /// # Panics
    ///
    /// Panics if the batch is empty -- batches are non-empty by
    /// construction everywhere past the merger.
    #[must_use]
    pub fn span_micros(&self) -> i64 {
        let first = self.items.first().expect("batch must be non-empty").timestamp;
        let last = self.items.last().expect("batch must be non-empty").timestamp;
        last.micros_since(first)
    }
}

/// Ordered sequence of rendered event strings, produced by the renderer
/// and consumed by the output fan-out subsystem.
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    events: Vec<String>,
}

impl EventBatch {
    #[must_use]
    pub fn new(events: Vec<String>) -> Self {
        Self { events }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.events
    }

    pub fn into_inner(self) -> Vec<String> {
        self.events
    }
}
