//! Synthesis strategy registry.
//!
//! A strategy is a plain function with one shared signature, registered under
//! a name together with the response-count window it supports. Choosing a
//! strategy is a plain function over the registry: filter by window, score by
//! [`StrategyScoring`], keep the best.

use super::response::{AgentResponse, DetailLevel, ResponseFormat, ResponseSource, SynthesisContext, UserPreferences};
use super::strategies;
use serde::{Deserialize, Serialize};

/// What a strategy produces before the synthesizer adds metadata
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    pub content: String,
    pub confidence: f64,
    pub sources: Vec<ResponseSource>,
}

/// Shared signature of every synthesis strategy
pub type StrategyFn = fn(&[AgentResponse], &SynthesisContext) -> StrategyOutput;

/// Inclusive window of response counts a strategy supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRequirements {
    pub min_responses: usize,
    pub max_responses: usize,
}

impl StrategyRequirements {
    pub const fn new(min_responses: usize, max_responses: usize) -> Self {
        Self {
            min_responses,
            max_responses,
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        (self.min_responses..=self.max_responses).contains(&count)
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_responses + self.max_responses) as f64 / 2.0
    }
}

/// The kind of answer a strategy produces, matched against user preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyCharacter {
    Agreement,
    Layered,
    Comprehensive,
    Narrative,
    Structured,
}

impl StrategyCharacter {
    /// Whether the caller's stated preferences ask for this character
    pub fn suits(&self, prefs: &UserPreferences) -> bool {
        match self {
            StrategyCharacter::Narrative => prefs.format == Some(ResponseFormat::Narrative),
            StrategyCharacter::Structured => prefs.format == Some(ResponseFormat::Structured),
            StrategyCharacter::Comprehensive => {
                prefs.detail_level == Some(DetailLevel::Comprehensive)
            }
            StrategyCharacter::Agreement | StrategyCharacter::Layered => false,
        }
    }
}

/// Heuristic weights used when no strategy is named
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyScoring {
    /// Score every compatible strategy starts from
    pub base: f64,
    /// Added when the strategy's character suits the user preferences
    pub preference_bonus: f64,
    /// Subtracted per response away from the strategy's window midpoint
    pub distance_penalty: f64,
}

impl Default for StrategyScoring {
    fn default() -> Self {
        Self {
            base: 0.5,
            preference_bonus: 0.3,
            distance_penalty: 0.05,
        }
    }
}

/// A registered strategy
#[derive(Debug, Clone)]
pub struct SynthesisStrategy {
    pub name: &'static str,
    pub description: &'static str,
    pub requirements: StrategyRequirements,
    pub character: StrategyCharacter,
    pub run: StrategyFn,
}

impl SynthesisStrategy {
    /// Heuristic fitness for `count` responses under `prefs`.
    pub fn score(&self, count: usize, prefs: &UserPreferences, scoring: &StrategyScoring) -> f64 {
        let bonus = if self.character.suits(prefs) {
            scoring.preference_bonus
        } else {
            0.0
        };
        let distance = (count as f64 - self.requirements.midpoint()).abs();
        scoring.base + bonus - scoring.distance_penalty * distance
    }
}

/// Name-keyed set of strategies, read-only once built
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: Vec<SynthesisStrategy>,
}

impl StrategyRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// The five built-in strategies, in tie-break order.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(SynthesisStrategy {
            name: "consensus",
            description: "Merge answers in sequence, highlighting shared ground",
            requirements: StrategyRequirements::new(2, 10),
            character: StrategyCharacter::Agreement,
            run: strategies::consensus,
        });
        registry.register(SynthesisStrategy {
            name: "hierarchical",
            description: "Lead with the most confident answer, add the rest as specialist input",
            requirements: StrategyRequirements::new(2, 8),
            character: StrategyCharacter::Layered,
            run: strategies::hierarchical,
        });
        registry.register(SynthesisStrategy {
            name: "weighted",
            description: "Weight each answer by its share of total confidence",
            requirements: StrategyRequirements::new(2, 12),
            character: StrategyCharacter::Comprehensive,
            run: strategies::weighted,
        });
        registry.register(SynthesisStrategy {
            name: "narrative",
            description: "Chain every answer into one prose paragraph",
            requirements: StrategyRequirements::new(1, 6),
            character: StrategyCharacter::Narrative,
            run: strategies::narrative,
        });
        registry.register(SynthesisStrategy {
            name: "structured",
            description: "One titled section per agent with a confidence footer",
            requirements: StrategyRequirements::new(1, 10),
            character: StrategyCharacter::Structured,
            run: strategies::structured,
        });
        registry
    }

    /// Add a strategy, replacing any existing one with the same name in place.
    pub fn register(&mut self, strategy: SynthesisStrategy) {
        match self.strategies.iter_mut().find(|s| s.name == strategy.name) {
            Some(existing) => *existing = strategy,
            None => self.strategies.push(strategy),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SynthesisStrategy> {
        self.strategies
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SynthesisStrategy> {
        self.strategies.iter()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Best-scoring strategy whose window contains `count`; the earliest
    /// registered wins ties. `None` when no window fits.
    pub fn select(
        &self,
        count: usize,
        prefs: &UserPreferences,
        scoring: &StrategyScoring,
    ) -> Option<&SynthesisStrategy> {
        let mut best: Option<(&SynthesisStrategy, f64)> = None;
        for strategy in self.strategies.iter().filter(|s| s.requirements.accepts(count)) {
            let score = strategy.score(count, prefs, scoring);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((strategy, score));
            }
        }
        best.map(|(strategy, _)| strategy)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
