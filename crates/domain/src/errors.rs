// Rust guideline compliant 2026-02-16

//! Error taxonomy shared by every pipeline component.
//!
//! Each variant carries a [`Context`] map rather than folding its fields
//! into the message string, so a logging sink can emit the structured
//! fields verbatim (spec: error propagation, context maps logged as-is).

use std::collections::BTreeMap;
use std::fmt;

/// Free-form context attached to an error: plugin name/id/type, file
/// path, URL, reason, etc. Logged verbatim, never interpolated into a
/// free-form message.
pub type Context = BTreeMap<String, String>;

/// Build a [`Context`] from `key, value` pairs.
///
/// ```
/// # use domain::errors::context;
/// let ctx = context([("plugin", "cron"), ("id", "3")]);
/// assert_eq!(ctx.get("plugin").map(String::as_str), Some("cron"));
/// ```
#[must_use]
pub fn context<const N: usize>(pairs: [(&str, &str); N]) -> Context {
    pairs.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect()
}

fn fmt_context(ctx: &Context, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, (k, v)) in ctx.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{k}={v}")?;
    }
    Ok(())
}

/// Structural or semantic problem detected before or during plugin
/// construction. Fatal for the affected generator (exit code 2).
#[derive(Debug, Clone, thiserror::Error)]
#[error("configuration error: {reason} ({context})", context = ContextDisplay(&self.context))]
pub struct ConfigError {
    pub reason: String,
    pub context: Context,
}

/// Plugin construction failed (bad template path, unreachable socket at
/// bind time). Fatal for the affected generator (exit code 3).
#[derive(Debug, Clone, thiserror::Error)]
#[error("initialization error: {reason} ({context})", context = ContextDisplay(&self.context))]
pub struct InitError {
    pub reason: String,
    pub context: Context,
}

/// Expected runtime failure in an input producer (network I/O, overflow,
/// timeout). Terminates the affected producer; the pipeline continues
/// with whatever producers remain.
#[derive(Debug, Clone, thiserror::Error)]
#[error("producer runtime error: {reason} ({context})", context = ContextDisplay(&self.context))]
pub struct ProducerRuntimeError {
    pub reason: String,
    pub context: Context,
}

/// Per-template, per-batch rendering failure. Drops the affected events
/// for that alias; subsequent batches continue.
#[derive(Debug, Clone, thiserror::Error)]
#[error("renderer runtime error: {reason} ({context})", context = ContextDisplay(&self.context))]
pub struct RendererRuntimeError {
    pub reason: String,
    pub context: Context,
}

/// Per-batch, per-sink write failure (non-success HTTP status, bulk item
/// error). Counted and logged; other sinks are unaffected.
#[derive(Debug, Clone, thiserror::Error)]
#[error("writer runtime error: {reason} ({context})", context = ContextDisplay(&self.context))]
pub struct WriterRuntimeError {
    pub reason: String,
    pub context: Context,
}

/// Anything not covered by the other variants. Logged with stack context
/// and treated as fatal (exit code 1).
#[derive(Debug, Clone, thiserror::Error)]
#[error("unexpected error: {reason} ({context})", context = ContextDisplay(&self.context))]
pub struct UnexpectedError {
    pub reason: String,
    pub context: Context,
}

struct ContextDisplay<'a>(&'a Context);

impl fmt::Display for ContextDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_context(self.0, f)
    }
}

/// Process exit code, matching spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Unexpected = 1,
    Configuration = 2,
    Initialization = 3,
    Execution = 4,
}

impl ExitCode {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::{context, ConfigError, ExitCode};

    #[test]
    fn context_builds_a_map() {
        let ctx = context([("plugin", "cron"), ("id", "3")]);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("id").map(String::as_str), Some("3"));
    }

    #[test]
    fn display_includes_reason_and_context() {
        let err = ConfigError { reason: "bad mode".to_owned(), context: context([("plugin", "fsm")]) };
        let rendered = err.to_string();
        assert!(rendered.contains("bad mode"));
        assert!(rendered.contains("plugin=fsm"));
    }

    #[test]
    fn exit_codes_match_spec() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::Unexpected.code(), 1);
        assert_eq!(ExitCode::Configuration.code(), 2);
        assert_eq!(ExitCode::Initialization.code(), 3);
        assert_eq!(ExitCode::Execution.code(), 4);
    }
}
