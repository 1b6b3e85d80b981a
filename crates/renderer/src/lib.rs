// Rust guideline compliant 2026-02-23

//! The event plugin (spec §4.5): picks which declared template alias(es)
//! render a given timestamp, then renders them against a jinja-flavored
//! template environment carrying `params`, `samples`, the bundled module
//! provider, the subprocess runner, and the three state scopes.

pub mod env;
pub mod fsm;
pub mod module_provider;
pub mod picker;
pub mod plugin;
pub mod samples;
pub mod subprocess;

pub use env::TemplateEnv;
pub use fsm::Condition;
pub use picker::{FsmState, FsmTransition, Picker};
pub use plugin::{JinjaEventPlugin, PickingConfig, TemplateSpec};
pub use samples::{Sample, SampleConfig, Samples};
pub use subprocess::{SubprocessResult, SubprocessRunner};
