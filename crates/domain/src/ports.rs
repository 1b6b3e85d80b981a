// Rust guideline compliant 2026-02-16

//! Plugin-facing hexagonal ports.
//!
//! `input`, `renderer`, and `output` depend exclusively on these traits --
//! never on a concrete adapter -- mirroring the teacher's `Buffer1`/`Buffer2`
//! split between a port trait in `domain` and its implementations elsewhere.

use crate::errors::{RendererRuntimeError, WriterRuntimeError};
use crate::state::State;
use crate::timestamp::{EventBatch, ProducerId, Tags, Timestamp};

/// A source of timestamps: one instance per configured `input` entry.
///
/// Pull-based, matching the merger's "refill empty peek buffers" loop
/// (spec §4.2): each call asks for at most `size` timestamps and returns
/// `None` once the producer is exhausted, or `Some(Err(_))` on a runtime
/// failure that should drop this producer from the merge.
pub trait InputPlugin {
    /// This producer's dense `[0, N)` identifier within the generator.
    fn id(&self) -> ProducerId;

    /// Tags attached to every timestamp this producer emits.
    fn tags(&self) -> Tags;

    /// Pull up to `size` further timestamps.
    ///
    /// Returns `None` when the producer has nothing left to emit: past its
    /// configured end, `skip_past` determined all remaining timestamps are
    /// in the past, or an expected runtime failure made it give up. Either
    /// way the merger just drops the producer from the merge.
    fn next_array(&mut self, size: usize) -> Option<Vec<Timestamp>>;
}

/// Read-only view of the context a template is rendered against (spec §4.5).
#[expect(missing_debug_implementations, reason = "holds trait object references, not meaningfully printable")]
pub struct EventContext<'a> {
    pub timestamp: Timestamp,
    pub tags: Tags,
    pub locals: &'a dyn State,
    pub shared: &'a dyn State,
    pub globals: &'a dyn State,
}

/// The event plugin: picks template aliases for a timestamp, then renders
/// each picked alias (spec §4.5).
pub trait EventPlugin {
    /// Select one or more declared template aliases for this context.
    ///
    /// Never returns an empty vector on success -- pickers always choose at
    /// least one alias.
    ///
    /// # Errors
    ///
    /// Returns [`RendererRuntimeError`] if the picker's transition condition
    /// fails to evaluate (`fsm` mode).
    fn pick(&self, ctx: &EventContext<'_>) -> Result<Vec<String>, RendererRuntimeError>;

    /// Render the template named `alias` against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`RendererRuntimeError`] with `alias` in its context map on
    /// any template error (spec §4.5 rendering failure).
    fn render(&self, alias: &str, ctx: &EventContext<'_>) -> Result<String, RendererRuntimeError>;
}

/// A write destination: one instance per configured `output` entry.
///
/// Implementations live outside `domain` and `output` (concrete adapters in
/// the binary crate), matching `Buffer1`/`Buffer2`'s split in the teacher.
#[expect(async_fn_in_trait, reason = "no dyn dispatch needed; internal workspace only")]
pub trait OutputSink {
    /// Write one already-formatted batch.
    ///
    /// # Errors
    ///
    /// Returns [`WriterRuntimeError`] on a non-success response or I/O
    /// failure. The batch is considered failed as a whole; writes are not
    /// retried (spec §4.6.2).
    async fn write(&self, batch: &EventBatch) -> Result<(), WriterRuntimeError>;
}

#[cfg(test)]
mod tests {
    use super::{EventContext, EventPlugin, InputPlugin, OutputSink};
    use crate::errors::{RendererRuntimeError, WriterRuntimeError};
    use crate::state::{State, StateError};
    use crate::timestamp::{EventBatch, ProducerId, Tags, Timestamp};
    use serde_json::Value;

    struct NullState;

    impl State for NullState {
        fn get(&self, _key: &str) -> Result<Option<Value>, StateError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: Value) -> Result<(), StateError> {
            Ok(())
        }

        fn update(&self, _entries: &[(String, Value)]) -> Result<(), StateError> {
            Ok(())
        }

        fn clear(&self) -> Result<(), StateError> {
            Ok(())
        }

        fn as_map(&self) -> Result<serde_json::Map<String, Value>, StateError> {
            Ok(serde_json::Map::new())
        }
    }

    struct CountingProducer {
        id: ProducerId,
        remaining: u32,
    }

    impl InputPlugin for CountingProducer {
        fn id(&self) -> ProducerId {
            self.id
        }

        fn tags(&self) -> Tags {
            Tags::from(vec!["test".to_owned()])
        }

        fn next_array(&mut self, size: usize) -> Option<Vec<Timestamp>> {
            if self.remaining == 0 {
                return None;
            }
            let n = (self.remaining as usize).min(size);
            self.remaining -= n as u32;
            Some((0..n).map(|i| Timestamp::from_micros(i as i64)).collect())
        }
    }

    #[test]
    fn producer_stops_after_remaining_exhausted() {
        let mut producer = CountingProducer { id: ProducerId::new(0), remaining: 3 };
        assert_eq!(producer.next_array(2).map(|v| v.len()), Some(2));
        assert_eq!(producer.next_array(2).map(|v| v.len()), Some(1));
        assert_eq!(producer.next_array(2), None);
    }

    struct FixedPicker;

    impl EventPlugin for FixedPicker {
        fn pick(&self, _ctx: &EventContext<'_>) -> Result<Vec<String>, RendererRuntimeError> {
            Ok(vec!["only".to_owned()])
        }

        fn render(&self, alias: &str, _ctx: &EventContext<'_>) -> Result<String, RendererRuntimeError> {
            Ok(format!("rendered:{alias}"))
        }
    }

    #[test]
    fn fixed_picker_picks_and_renders() {
        let state = NullState;
        let ctx = EventContext {
            timestamp: Timestamp::from_micros(0),
            tags: Tags::from(vec![]),
            locals: &state,
            shared: &state,
            globals: &state,
        };
        let picker = FixedPicker;
        let aliases = picker.pick(&ctx).unwrap();
        assert_eq!(aliases, vec!["only".to_owned()]);
        assert_eq!(picker.render(&aliases[0], &ctx).unwrap(), "rendered:only");
    }

    struct CollectingSink {
        seen: std::cell::RefCell<Vec<usize>>,
    }

    impl OutputSink for CollectingSink {
        async fn write(&self, batch: &EventBatch) -> Result<(), WriterRuntimeError> {
            self.seen.borrow_mut().push(batch.len());
            Ok(())
        }
    }

    #[tokio::test]
    async fn sink_records_batch_sizes() {
        let sink = CollectingSink { seen: std::cell::RefCell::new(vec![]) };
        let batch = EventBatch::new(vec!["a".to_owned(), "b".to_owned()]);
        sink.write(&batch).await.unwrap();
        assert_eq!(*sink.seen.borrow(), vec![2]);
    }
}
