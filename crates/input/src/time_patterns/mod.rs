// Rust guideline compliant 2026-02-16

//! `time_patterns` input producer (spec §4.1.1): composes many [`TimePatternProducer`]
//! sub-producers, one per pattern file, and runs them through a [`pipeline::Merger`].

pub mod oscillator;
pub mod pattern;
pub mod randomizer;
pub mod spreader;

pub use oscillator::{Oscillator, OscillatorConfig, TimeUnit};
pub use pattern::{Multiplier, TimePatternProducer};
pub use randomizer::{Randomizer, RandomizerConfig, RandomizerDirection};
pub use spreader::Spreader;

use domain::{InputPlugin, ProducerId, Tags, Timestamp};
use pipeline::Merger;
use rand::SeedableRng;

/// A single pattern's fully-assembled configuration, as loaded from one
/// pattern file.
#[derive(Debug, Clone, Copy)]
pub struct PatternSpec {
    pub oscillator: OscillatorConfig,
    pub multiplier: Multiplier,
    pub randomizer: RandomizerConfig,
    pub spreader: Spreader,
}

/// Merges timestamps produced by several [`TimePatternProducer`]s into one
/// stream, discarding the sub-pattern identities (the composite producer
/// presents a single id to its own parent).
pub struct TimePatternsProducer {
    id: ProducerId,
    tags: Tags,
    merger: Merger,
}

impl std::fmt::Debug for TimePatternsProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimePatternsProducer").field("id", &self.id).finish()
    }
}

impl TimePatternsProducer {
    #[must_use]
    pub fn new(
        id: ProducerId,
        tags: Tags,
        patterns: Vec<PatternSpec>,
        skip_past: bool,
        seed: Option<u64>,
    ) -> Self {
        let clock = crate::SystemClock;
        let sub_producers: Vec<Box<dyn InputPlugin + Send>> = patterns
            .into_iter()
            .enumerate()
            .map(|(i, spec)| {
                let pattern_seed = seed.map(|s| s.wrapping_add(i as u64));
                let mut seeding_rng = match pattern_seed {
                    Some(s) => rand::rngs::StdRng::seed_from_u64(s),
                    None => rand::rngs::StdRng::from_os_rng(),
                };
                let randomizer = Randomizer::new(spec.randomizer, &mut seeding_rng);
                let producer = TimePatternProducer::new(
                    ProducerId::new(i as u16),
                    Tags::from(vec![]),
                    Oscillator::new(spec.oscillator),
                    spec.multiplier,
                    randomizer,
                    spec.spreader,
                    &clock,
                    skip_past,
                    pattern_seed,
                );
                Box::new(producer) as Box<dyn InputPlugin + Send>
            })
            .collect();

        Self { id, tags, merger: Merger::new(sub_producers) }
    }
}

impl InputPlugin for TimePatternsProducer {
    fn id(&self) -> ProducerId {
        self.id
    }

    fn tags(&self) -> Tags {
        self.tags.clone()
    }

    fn next_array(&mut self, size: usize) -> Option<Vec<Timestamp>> {
        let slice = self.merger.next_slice(size)?;
        Some(slice.into_iter().map(|it| it.timestamp).collect())
    }
}
