//! CLI entrypoint for Expert Panel
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use panel_application::{
    AgentSearchPort, AgentStorePort, AnalyzeQueryUseCase, BehaviorConfig, FindCandidatesUseCase,
    MetricsSink, NoMetrics, NoProgress, ProgressNotifier, RetrievalConfig, RunPanelError,
    RunPanelInput, RunPanelUseCase, SelectAgentError, SelectAgentUseCase,
    SynthesizeResponsesUseCase,
};
use panel_domain::{
    AgentResponse, ResponseSynthesizer, StrategyRegistry, SynthesisContext, SynthesisError,
    UserPreferences,
};
use panel_infrastructure::{
    CircuitBreakerConfig, CircuitBreakerStore, ConfigLoader, FileConfig, InMemoryAgentCatalog,
    JsonlMetricsSink, OpenAiLlmGateway, SupabaseAgentSearch, SupabaseAgentStore, SupabaseClient,
};
use panel_presentation::{
    Cli, Command, ConsoleFormatter, DetailArg, FormatArg, JsonFormatter, OutputFormat,
    OutputFormatter, ProgressReporter,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const NO_AGENTS: &str = "No agents available for this question right now. Please try again later.";
const CANNOT_COMBINE: &str = "Could not combine the answers, please rephrase your question.";
const EMPTY_QUESTION: &str = "Please enter a question.";
const PANEL_UNAVAILABLE: &str = "None of the experts could answer right now. Please try again later.";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting Expert Panel");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("Invalid configuration: {e}"))?
    };
    config.validate().context("Invalid configuration")?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    let output = cli
        .output
        .or_else(|| config.output.format.map(OutputFormat::from))
        .unwrap_or(OutputFormat::Text);
    let formatter: Box<dyn OutputFormatter> = match output {
        OutputFormat::Text => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    };

    match &cli.command {
        Command::Strategies => {
            println!("{}", formatter.format_strategies(&StrategyRegistry::with_defaults()));
            Ok(())
        }
        Command::Config => {
            for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
                println!("{}", line);
            }
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Synthesize {
            file,
            query,
            strategy,
            format,
            detail,
        } => {
            let responses = read_responses(file)?;
            let context = SynthesisContext {
                query: query.clone(),
                user_preferences: preferences(*format, *detail),
            };
            let use_case = synthesizer(&config, metrics_sink(&config));
            let strategy = strategy.as_deref().or(config.panel.strategy.as_deref());
            let response = use_case
                .execute(&responses, &context, strategy)
                .map_err(|e| user_facing_synthesis(&e))?;
            println!("{}", formatter.format_synthesis(&response));
            Ok(())
        }
        Command::Select { .. } | Command::Panel { .. } => {
            let show_progress = !cli.quiet && output == OutputFormat::Text;
            run_with_backend(&cli, &config, formatter.as_ref(), show_progress).await
        }
    }
}

/// Install the tracing subscriber; the returned guard flushes the log file on drop.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log file path has no file name: {}", path.display()))?;
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn metrics_sink(config: &FileConfig) -> Arc<dyn MetricsSink> {
    match &config.metrics.jsonl_path {
        Some(path) => match JsonlMetricsSink::new(path) {
            Some(sink) => Arc::new(sink),
            None => {
                warn!("Metrics disabled: could not open {}", path.display());
                Arc::new(NoMetrics)
            }
        },
        None => Arc::new(NoMetrics),
    }
}

fn synthesizer(config: &FileConfig, metrics: Arc<dyn MetricsSink>) -> SynthesizeResponsesUseCase {
    let synthesizer =
        ResponseSynthesizer::new(StrategyRegistry::with_defaults()).with_scoring(config.synthesis);
    SynthesizeResponsesUseCase::new(synthesizer).with_metrics(metrics)
}

fn preferences(format: Option<FormatArg>, detail: Option<DetailArg>) -> UserPreferences {
    UserPreferences {
        format: format.map(Into::into),
        detail_level: detail.map(Into::into),
    }
}

fn read_responses(path: &Path) -> Result<Vec<AgentResponse>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of agent responses", path.display()))
}

/// Build the agent source from config and run `select` or `panel` against it.
///
/// A local catalog takes precedence over Supabase. The relational tier goes
/// through the circuit breaker; the emergency tier queries the raw store.
async fn run_with_backend(
    cli: &Cli,
    config: &FileConfig,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let behavior = BehaviorConfig::from_timeout_seconds(config.behavior.timeout_seconds);
    let breaker = CircuitBreakerConfig::from(&config.circuit_breaker);

    if let Some(path) = &config.catalog.path {
        let catalog = InMemoryAgentCatalog::from_file(path)?;
        info!("Using local agent catalog with {} agents", catalog.len());
        let emergency: Arc<dyn AgentStorePort> = Arc::new(catalog.clone());
        let store = Arc::new(
            CircuitBreakerStore::new(catalog.clone(), breaker).with_timeout(behavior.timeout),
        );
        return run_pipeline(cli, config, Arc::new(catalog), store, emergency, formatter, show_progress)
            .await;
    }

    let url = config
        .search
        .supabase_url
        .clone()
        .ok_or_else(|| anyhow!("No agent source configured: set [search] supabase_url or [catalog] path"))?;
    let key = config
        .search
        .api_key()
        .ok_or_else(|| anyhow!("Environment variable {} is not set", config.search.api_key_env))?;
    let client = SupabaseClient::new(url, key, behavior.timeout)?;

    let search = Arc::new(SupabaseAgentSearch::new(
        client.clone(),
        &config.search.rpc_function,
    ));
    let raw_store = SupabaseAgentStore::new(client);
    let emergency: Arc<dyn AgentStorePort> = Arc::new(raw_store.clone());
    let store = Arc::new(CircuitBreakerStore::new(raw_store, breaker).with_timeout(behavior.timeout));
    run_pipeline(cli, config, search, store, emergency, formatter, show_progress).await
}

async fn run_pipeline<S, F>(
    cli: &Cli,
    config: &FileConfig,
    search: Arc<S>,
    store: Arc<F>,
    emergency: Arc<dyn AgentStorePort>,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()>
where
    S: AgentSearchPort + 'static,
    F: AgentStorePort + 'static,
{
    let behavior = BehaviorConfig::from_timeout_seconds(config.behavior.timeout_seconds);
    let metrics = metrics_sink(config);

    // === Dependency Injection ===
    let gateway = Arc::new(
        OpenAiLlmGateway::from_config(&config.llm, behavior.timeout)
            .context("Could not set up the LLM gateway")?,
    );

    let analyzer = AnalyzeQueryUseCase::new(Arc::clone(&gateway), config.llm.model.clone())
        .with_behavior(behavior.clone())
        .with_metrics(Arc::clone(&metrics));
    let retrieval = RetrievalConfig::default()
        .with_top_k(config.search.top_k)
        .with_min_similarity(config.search.min_similarity)
        .with_emergency_limit(config.search.emergency_limit);
    let retriever = FindCandidatesUseCase::new(search, store)
        .with_emergency_store(emergency)
        .with_config(retrieval)
        .with_behavior(behavior.clone())
        .with_metrics(Arc::clone(&metrics));
    let selector = SelectAgentUseCase::new(analyzer, retriever)
        .with_weights(config.ranking)
        .with_metrics(Arc::clone(&metrics));

    let progress: Box<dyn ProgressNotifier> = if show_progress {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(NoProgress)
    };

    match &cli.command {
        Command::Panel {
            query,
            size,
            strategy,
            format,
            detail,
        } => {
            let mut input = RunPanelInput::new(query.clone())
                .with_panel_size(size.unwrap_or(config.panel.size))
                .with_preferences(preferences(*format, *detail));
            if let Some(name) = strategy.as_ref().or(config.panel.strategy.as_ref()) {
                input = input.with_strategy(name.clone());
            }

            let use_case = RunPanelUseCase::new(
                gateway,
                config.llm.panel_model(),
                selector,
                synthesizer(config, metrics),
            )
            .with_behavior(behavior);
            let outcome = use_case
                .execute_with_progress(input, progress.as_ref())
                .await
                .map_err(|e| user_facing_panel(&e))?;
            println!("{}", formatter.format_panel(&outcome));
        }
        Command::Select { query } => {
            let selection = selector
                .execute_with_progress(query, progress.as_ref())
                .await
                .map_err(|e| user_facing_selection(&e))?;
            println!("{}", formatter.format_selection(&selection));
        }
        _ => {}
    }

    Ok(())
}

fn user_facing_selection(e: &SelectAgentError) -> anyhow::Error {
    error!(error = %e, "Agent selection failed");
    match e {
        SelectAgentError::InvalidQuery(_) => anyhow!(EMPTY_QUESTION),
        SelectAgentError::Selection(_) => anyhow!(NO_AGENTS),
    }
}

fn user_facing_synthesis(e: &SynthesisError) -> anyhow::Error {
    error!(error = %e, "Response synthesis failed");
    anyhow!(CANNOT_COMBINE)
}

fn user_facing_panel(e: &RunPanelError) -> anyhow::Error {
    match e {
        RunPanelError::Selection(e) => user_facing_selection(e),
        RunPanelError::Synthesis(e) => user_facing_synthesis(e),
        RunPanelError::AllAgentsFailed(_) => {
            error!(error = %e, "Panel run failed");
            anyhow!(PANEL_UNAVAILABLE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_domain::{AgentSelectionError, DomainError};

    #[test]
    fn test_user_facing_messages_hide_internals() {
        let e = SelectAgentError::Selection(AgentSelectionError::NoCandidates);
        assert_eq!(user_facing_selection(&e).to_string(), NO_AGENTS);

        let e = SelectAgentError::InvalidQuery(DomainError::InvalidQuery("blank".to_string()));
        assert_eq!(user_facing_selection(&e).to_string(), EMPTY_QUESTION);

        let e = RunPanelError::Synthesis(SynthesisError::NoValidResponses);
        assert_eq!(user_facing_panel(&e).to_string(), CANNOT_COMBINE);

        let e = RunPanelError::AllAgentsFailed(3);
        assert_eq!(user_facing_panel(&e).to_string(), PANEL_UNAVAILABLE);
    }

    #[test]
    fn test_read_responses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(
            &path,
            r#"[{"agentId": "cardio", "content": "Lower your salt intake.", "confidence": 0.8}]"#,
        )
        .unwrap();

        let responses = read_responses(&path).unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].agent_id, "cardio");
    }

    #[test]
    fn test_read_responses_rejects_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, r#"{"agentId": "cardio"}"#).unwrap();
        assert!(read_responses(&path).is_err());
    }

    #[test]
    fn test_preferences_map_cli_args() {
        let prefs = preferences(Some(FormatArg::Structured), None);
        assert_eq!(prefs.format, Some(panel_domain::ResponseFormat::Structured));
        assert_eq!(prefs.detail_level, None);
    }
}
