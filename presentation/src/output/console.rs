//! Console output formatter for selection and synthesis results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use panel_application::{AgentSelection, PanelOutcome};
use panel_domain::{StrategyRegistry, SynthesizedResponse};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the selected agent, its alternates and the query analysis
    pub fn format_selection(selection: &AgentSelection) -> String {
        let result = &selection.selection;
        let mut output = String::new();

        output.push_str(&Self::header("Agent Selection"));
        output.push('\n');

        output.push_str(&format!(
            "{} {} {}\n",
            "Selected:".cyan().bold(),
            result.selected_agent.display_name.bold(),
            format!("({})", result.selected_agent.id).dimmed()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Confidence:".cyan().bold(),
            Self::percent(result.confidence)
        ));
        output.push_str(&format!("{} {}\n", "Reasoning:".cyan().bold(), result.reasoning));

        let method = selection.search_method.to_string();
        match &selection.fallback_reason {
            Some(reason) => output.push_str(&format!(
                "{} {} {}\n",
                "Retrieval:".cyan().bold(),
                method.yellow(),
                format!("({})", reason).dimmed()
            )),
            None => output.push_str(&format!("{} {}\n", "Retrieval:".cyan().bold(), method)),
        }

        let analysis = &result.analysis;
        output.push_str(&Self::section_header("Query Analysis"));
        output.push_str(&format!("  Intent:     {}\n", analysis.intent));
        output.push_str(&format!("  Complexity: {}\n", analysis.complexity));
        if !analysis.domains.is_empty() {
            output.push_str(&format!("  Domains:    {}\n", analysis.domains.join(", ")));
        }
        if !analysis.medical_terms.is_empty() {
            output.push_str(&format!("  Terms:      {}\n", analysis.medical_terms.join(", ")));
        }

        if !result.alternate_agents.is_empty() {
            output.push_str(&Self::section_header("Alternates"));
            for ranking in &result.alternate_agents {
                output.push_str(&format!(
                    "  * {} {}\n",
                    ranking.agent.display_name,
                    Self::percent(ranking.score).dimmed()
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format every panel answer followed by the merged response
    pub fn format_panel(outcome: &PanelOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Expert Panel Results"));
        output.push('\n');

        let analysis = &outcome.selection.selection.analysis;
        output.push_str(&format!("{} {}\n", "Intent:".cyan().bold(), analysis.intent));
        output.push_str(&format!(
            "{} {}\n",
            "Panel:".cyan().bold(),
            outcome
                .responses
                .iter()
                .map(|r| r.agent_name().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        output.push_str(&Self::section_header("Panel Answers"));
        for response in &outcome.responses {
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {} ──", response.agent_name()).yellow().bold(),
                response.content
            ));
        }

        output.push_str(&Self::section_header("Synthesis"));
        output.push_str(&Self::synthesis_body(&outcome.synthesis));
        output.push_str(&Self::footer());
        output
    }

    /// Format a merged response with its sources and conflicts
    pub fn format_synthesis(response: &SynthesizedResponse) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Synthesized Response"));
        output.push('\n');
        output.push_str(&Self::synthesis_body(response));
        output.push_str(&Self::footer());
        output
    }

    /// List strategies with their response-count windows
    pub fn format_strategies(registry: &StrategyRegistry) -> String {
        let mut output = format!("{}\n", "Synthesis strategies:".cyan().bold());
        for strategy in registry.iter() {
            output.push_str(&format!(
                "  {:<14} {:>2}-{:<2} {}\n",
                strategy.name.bold(),
                strategy.requirements.min_responses,
                strategy.requirements.max_responses,
                strategy.description.dimmed()
            ));
        }
        output
    }

    fn synthesis_body(response: &SynthesizedResponse) -> String {
        let meta = &response.metadata;
        let mut output = String::new();

        output.push_str(&format!(
            "\n{}\n\n{}\n",
            format!("Strategy: {}", meta.strategy).yellow().bold(),
            response.content
        ));

        output.push_str(&format!(
            "\n{} {}   {} {}   {} {}\n",
            "Confidence:".cyan().bold(),
            Self::percent(response.confidence),
            "Quality:".cyan().bold(),
            Self::percent(meta.quality_score),
            "Agents:".cyan().bold(),
            meta.participant_count
        ));

        if !response.sources.is_empty() {
            output.push_str(&format!("\n{}\n", "Sources:".cyan().bold()));
            for source in &response.sources {
                output.push_str(&format!(
                    "  * {} {} relevance {}\n",
                    source.agent_name,
                    Self::percent(source.confidence).dimmed(),
                    Self::percent(source.relevance)
                ));
            }
        }

        if !meta.conflicts.is_empty() {
            output.push_str(&format!("\n{}\n", "Conflicts:".yellow().bold()));
            for conflict in &meta.conflicts {
                output.push_str(&format!(
                    "  * [{}] {} vs {}: {}\n",
                    conflict.conflict_type,
                    conflict.participants[0],
                    conflict.participants[1],
                    conflict.resolution
                ));
            }
        }

        output
    }

    fn percent(value: f64) -> String {
        format!("{:.0}%", value * 100.0)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_selection(&self, selection: &AgentSelection) -> String {
        Self::format_selection(selection)
    }

    fn format_panel(&self, outcome: &PanelOutcome) -> String {
        Self::format_panel(outcome)
    }

    fn format_synthesis(&self, response: &SynthesizedResponse) -> String {
        Self::format_synthesis(response)
    }

    fn format_strategies(&self, registry: &StrategyRegistry) -> String {
        Self::format_strategies(registry)
    }
}
