// Rust guideline compliant 2026-02-23

//! Template picker state machines (spec §4.5): given the full event context,
//! choose which declared template alias(es) render this event.

use crate::fsm::Condition;
use domain::errors::context;
use domain::{ConfigError, EventContext, RendererRuntimeError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::{Cell, RefCell};

/// One state of an `fsm` picker: its alias, whether it is the FSM's initial
/// state, and its optional outgoing transition.
#[derive(Debug, Clone)]
pub struct FsmState {
    pub alias: String,
    pub initial: bool,
    pub transition: Option<FsmTransition>,
}

/// An `fsm` state's outgoing transition: switch to `to` when `when` fires.
#[derive(Debug, Clone)]
pub struct FsmTransition {
    pub to: String,
    pub when: Condition,
}

/// A template-picking state machine (spec §4.5 table).
#[derive(Debug)]
pub enum Picker {
    All { aliases: Vec<String> },
    Any { aliases: Vec<String>, rng: RefCell<StdRng> },
    Chance { aliases: Vec<String>, weights: Vec<f64>, rng: RefCell<StdRng> },
    Spin { aliases: Vec<String>, index: Cell<usize> },
    Fsm { states: Vec<FsmState>, current: Cell<usize> },
    Chain { aliases: Vec<String>, chain: Vec<String>, index: Cell<usize> },
}

impl Picker {
    #[must_use]
    pub fn all(aliases: Vec<String>) -> Self {
        Self::All { aliases }
    }

    #[must_use]
    pub fn any(aliases: Vec<String>, seed: Option<u64>) -> Self {
        Self::Any { aliases, rng: RefCell::new(seeded_rng(seed)) }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if `aliases` and `weights` differ in length,
    /// any weight is not positive, or the weights sum to zero.
    pub fn chance(aliases: Vec<String>, weights: Vec<f64>, seed: Option<u64>) -> Result<Self, ConfigError> {
        if aliases.len() != weights.len() {
            return Err(ConfigError {
                reason: "chance picker needs one weight per template".to_owned(),
                context: context([]),
            });
        }
        if weights.iter().any(|w| *w <= 0.0) {
            return Err(ConfigError { reason: "chance weights must be positive".to_owned(), context: context([]) });
        }
        Ok(Self::Chance { aliases, weights, rng: RefCell::new(seeded_rng(seed)) })
    }

    #[must_use]
    pub fn spin(aliases: Vec<String>) -> Self {
        Self::Spin { aliases, index: Cell::new(0) }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if zero or more than one state is marked
    /// `initial`, or a transition targets an alias not among `states`.
    pub fn fsm(states: Vec<FsmState>) -> Result<Self, ConfigError> {
        let initial_count = states.iter().filter(|s| s.initial).count();
        if initial_count != 1 {
            return Err(ConfigError {
                reason: format!("fsm picker needs exactly one initial state, found {initial_count}"),
                context: context([]),
            });
        }
        let known: std::collections::HashSet<&str> = states.iter().map(|s| s.alias.as_str()).collect();
        for state in &states {
            if let Some(transition) = &state.transition {
                if !known.contains(transition.to.as_str()) {
                    return Err(ConfigError {
                        reason: format!("fsm transition targets unknown alias `{}`", transition.to),
                        context: context([("from", &state.alias)]),
                    });
                }
            }
        }
        let current = states.iter().position(|s| s.initial).unwrap_or(0);
        Ok(Self::Fsm { states, current: Cell::new(current) })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if `chain` references an alias not in
    /// `aliases`.
    pub fn chain(aliases: Vec<String>, chain: Vec<String>) -> Result<Self, ConfigError> {
        let known: std::collections::HashSet<&str> = aliases.iter().map(String::as_str).collect();
        if let Some(unknown) = chain.iter().find(|a| !known.contains(a.as_str())) {
            return Err(ConfigError {
                reason: format!("chain references unknown template alias `{unknown}`"),
                context: context([]),
            });
        }
        Ok(Self::Chain { aliases, chain, index: Cell::new(0) })
    }

    /// Pick the template alias(es) to render for one event.
    ///
    /// # Errors
    ///
    /// Returns [`RendererRuntimeError`] if an `fsm` transition condition
    /// fails to evaluate (a malformed state path or a backing state-store
    /// failure).
    pub fn pick(&self, ctx: &EventContext<'_>) -> Result<Vec<String>, RendererRuntimeError> {
        match self {
            Self::All { aliases } => Ok(aliases.clone()),
            Self::Any { aliases, rng } => {
                let i = rng.borrow_mut().random_range(0..aliases.len());
                Ok(vec![aliases[i].clone()])
            }
            Self::Chance { aliases, weights, rng } => {
                let total: f64 = weights.iter().sum();
                let mut draw = rng.borrow_mut().random_range(0.0..total);
                for (alias, weight) in aliases.iter().zip(weights) {
                    if draw < *weight {
                        return Ok(vec![alias.clone()]);
                    }
                    draw -= weight;
                }
                Ok(vec![aliases.last().expect("non-empty by construction").clone()])
            }
            Self::Spin { aliases, index } => {
                let i = index.get();
                index.set((i + 1) % aliases.len());
                Ok(vec![aliases[i].clone()])
            }
            Self::Fsm { states, current } => {
                let state = &states[current.get()];
                if let Some(transition) = &state.transition {
                    if transition.when.evaluate(ctx)? {
                        let next = states
                            .iter()
                            .position(|s| s.alias == transition.to)
                            .expect("transition targets are validated at construction");
                        current.set(next);
                    }
                }
                Ok(vec![states[current.get()].alias.clone()])
            }
            Self::Chain { chain, index, .. } => {
                let i = index.get();
                index.set((i + 1) % chain.len());
                Ok(vec![chain[i].clone()])
            }
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FsmState, FsmTransition, Picker};
    use crate::fsm::Condition;
    use domain::EventContext;
    use serde_json::json;
    use std::collections::BTreeMap;

    struct MapState(std::cell::RefCell<BTreeMap<String, serde_json::Value>>);

    impl domain::State for MapState {
        fn get(&self, key: &str) -> Result<Option<serde_json::Value>, domain::StateError> {
            Ok(self.0.borrow().get(key).cloned())
        }
        fn set(&self, key: &str, value: serde_json::Value) -> Result<(), domain::StateError> {
            self.0.borrow_mut().insert(key.to_owned(), value);
            Ok(())
        }
        fn update(&self, entries: &[(String, serde_json::Value)]) -> Result<(), domain::StateError> {
            for (k, v) in entries {
                self.0.borrow_mut().insert(k.clone(), v.clone());
            }
            Ok(())
        }
        fn clear(&self) -> Result<(), domain::StateError> {
            self.0.borrow_mut().clear();
            Ok(())
        }
        fn as_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, domain::StateError> {
            Ok(self.0.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        }
    }

    fn ctx<'a>(locals: &'a MapState, shared: &'a MapState, globals: &'a MapState) -> EventContext<'a> {
        EventContext {
            timestamp: domain::Timestamp::from_naive(chrono::Utc::now().naive_utc()),
            tags: domain::Tags::from(vec![]),
            locals,
            shared,
            globals,
        }
    }

    #[test]
    fn all_picker_returns_every_alias_in_order() {
        let picker = Picker::all(vec!["a".to_owned(), "b".to_owned()]);
        let (l, s, g) = (MapState::default_new(), MapState::default_new(), MapState::default_new());
        let picked = picker.pick(&ctx(&l, &s, &g)).unwrap();
        assert_eq!(picked, vec!["a", "b"]);
    }

    #[test]
    fn spin_picker_cycles_through_aliases() {
        let picker = Picker::spin(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]);
        let (l, s, g) = (MapState::default_new(), MapState::default_new(), MapState::default_new());
        let c = ctx(&l, &s, &g);
        assert_eq!(picker.pick(&c).unwrap(), vec!["a"]);
        assert_eq!(picker.pick(&c).unwrap(), vec!["b"]);
        assert_eq!(picker.pick(&c).unwrap(), vec!["c"]);
        assert_eq!(picker.pick(&c).unwrap(), vec!["a"]);
    }

    #[test]
    fn chain_picker_follows_the_declared_sequence() {
        let picker = Picker::chain(
            vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            vec!["a".to_owned(), "a".to_owned(), "c".to_owned(), "b".to_owned()],
        )
        .unwrap();
        let (l, s, g) = (MapState::default_new(), MapState::default_new(), MapState::default_new());
        let c = ctx(&l, &s, &g);
        assert_eq!(picker.pick(&c).unwrap(), vec!["a"]);
        assert_eq!(picker.pick(&c).unwrap(), vec!["a"]);
        assert_eq!(picker.pick(&c).unwrap(), vec!["c"]);
        assert_eq!(picker.pick(&c).unwrap(), vec!["b"]);
        assert_eq!(picker.pick(&c).unwrap(), vec!["a"]);
    }

    #[test]
    fn fsm_picker_transitions_on_shared_flag() {
        use domain::State as _;
        let states = vec![
            FsmState {
                alias: "template1".to_owned(),
                initial: true,
                transition: Some(FsmTransition {
                    to: "template2".to_owned(),
                    when: Condition::Eq { path: "shared.some_flag".to_owned(), value: json!(true) },
                }),
            },
            FsmState {
                alias: "template2".to_owned(),
                initial: false,
                transition: Some(FsmTransition {
                    to: "template1".to_owned(),
                    when: Condition::Eq { path: "shared.some_flag".to_owned(), value: json!(false) },
                }),
            },
        ];
        let picker = Picker::fsm(states).unwrap();
        let (l, s, g) = (MapState::default_new(), MapState::default_new(), MapState::default_new());
        s.set("some_flag", json!(false)).unwrap();
        let c = ctx(&l, &s, &g);
        assert_eq!(picker.pick(&c).unwrap(), vec!["template1"]);
        assert_eq!(picker.pick(&c).unwrap(), vec!["template1"]);
        s.set("some_flag", json!(true)).unwrap();
        assert_eq!(picker.pick(&c).unwrap(), vec!["template2"]);
        assert_eq!(picker.pick(&c).unwrap(), vec!["template2"]);
    }

    #[test]
    fn fsm_rejects_more_than_one_initial_state() {
        let states = vec![
            FsmState { alias: "a".to_owned(), initial: true, transition: None },
            FsmState { alias: "b".to_owned(), initial: true, transition: None },
        ];
        assert!(Picker::fsm(states).is_err());
    }

    impl MapState {
        fn default_new() -> Self {
            Self(std::cell::RefCell::new(BTreeMap::new()))
        }
    }
}
