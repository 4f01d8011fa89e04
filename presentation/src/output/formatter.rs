//! Output formatter trait

use panel_application::{AgentSelection, PanelOutcome};
use panel_domain::{StrategyRegistry, SynthesizedResponse};

/// Trait for rendering command results
pub trait OutputFormatter {
    /// Format the outcome of `select`
    fn format_selection(&self, selection: &AgentSelection) -> String;

    /// Format the outcome of `panel`
    fn format_panel(&self, outcome: &PanelOutcome) -> String;

    /// Format the outcome of `synthesize`
    fn format_synthesis(&self, response: &SynthesizedResponse) -> String;

    /// Format the strategy listing
    fn format_strategies(&self, registry: &StrategyRegistry) -> String;
}
