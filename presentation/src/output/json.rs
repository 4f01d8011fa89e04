//! JSON output formatter

use crate::output::formatter::OutputFormatter;
use panel_application::{AgentSelection, PanelOutcome};
use panel_domain::{StrategyRegistry, SynthesizedResponse};
use serde::Serialize;
use serde_json::json;

/// Formats results as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    fn render<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_selection(&self, selection: &AgentSelection) -> String {
        Self::render(selection)
    }

    fn format_panel(&self, outcome: &PanelOutcome) -> String {
        Self::render(outcome)
    }

    fn format_synthesis(&self, response: &SynthesizedResponse) -> String {
        Self::render(response)
    }

    fn format_strategies(&self, registry: &StrategyRegistry) -> String {
        let strategies: Vec<_> = registry
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "description": s.description,
                    "minResponses": s.requirements.min_responses,
                    "maxResponses": s.requirements.max_responses,
                    "character": s.character,
                })
            })
            .collect();
        Self::render(&strategies)
    }
}
