//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use panel_domain::{DetailLevel, ResponseFormat};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored text
    Text,
    /// JSON output
    Json,
}

impl From<panel_domain::OutputFormat> for OutputFormat {
    fn from(format: panel_domain::OutputFormat) -> Self {
        match format {
            panel_domain::OutputFormat::Text => OutputFormat::Text,
            panel_domain::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Preferred shape of a merged answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Narrative,
    Structured,
    Summary,
}

impl From<FormatArg> for ResponseFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Narrative => ResponseFormat::Narrative,
            FormatArg::Structured => ResponseFormat::Structured,
            FormatArg::Summary => ResponseFormat::Summary,
        }
    }
}

/// Preferred depth of a merged answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetailArg {
    Brief,
    Standard,
    Comprehensive,
}

impl From<DetailArg> for DetailLevel {
    fn from(arg: DetailArg) -> Self {
        match arg {
            DetailArg::Brief => DetailLevel::Brief,
            DetailArg::Standard => DetailLevel::Standard,
            DetailArg::Comprehensive => DetailLevel::Comprehensive,
        }
    }
}

/// CLI arguments for expert-panel
#[derive(Parser, Debug)]
#[command(name = "expert-panel")]
#[command(author, version, about = "Route health questions to the best-suited expert agents")]
#[command(long_about = r#"
Expert Panel picks the best expert agent for a health question and can merge
the answers of several agents into one response.

The pipeline has four stages:
1. Query Analysis: an LLM classifies the question (intent, domains, complexity)
2. Candidate Retrieval: GraphRAG search, then relational and emergency fallbacks
3. Ranking: candidates are scored on similarity, domain, tier and capabilities
4. Selection: the top candidate is chosen, with alternates

Configuration files are loaded from (in priority order):
1. PANEL_* environment variables
2. --config <path>     Explicit config file
3. ./panel.toml        Project-level config
4. ~/.config/expert-panel/config.toml   Global config

Example:
  expert-panel select "What are the warning signs of a heart attack?"
  expert-panel panel --size 3 --format structured "Managing type 2 diabetes and blood pressure"
  expert-panel synthesize answers.json --strategy consensus
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format (defaults to the [output] config section, then text)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick the single best agent for a question
    Select {
        /// The question to route
        query: String,
    },

    /// Ask a panel of agents and merge their answers
    Panel {
        /// The question to ask
        query: String,

        /// Number of agents on the panel (defaults to the [panel] config section)
        #[arg(short, long, value_name = "N")]
        size: Option<usize>,

        /// Synthesis strategy to use instead of automatic selection
        #[arg(long, value_name = "NAME")]
        strategy: Option<String>,

        /// Preferred shape of the merged answer
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Preferred depth of the merged answer
        #[arg(short, long, value_enum)]
        detail: Option<DetailArg>,
    },

    /// Merge agent answers read from a JSON file
    Synthesize {
        /// JSON array of agent responses
        file: PathBuf,

        /// The question the responses answer
        #[arg(long)]
        query: Option<String>,

        /// Synthesis strategy to use instead of automatic selection
        #[arg(long, value_name = "NAME")]
        strategy: Option<String>,

        /// Preferred shape of the merged answer
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Preferred depth of the merged answer
        #[arg(short, long, value_enum)]
        detail: Option<DetailArg>,
    },

    /// List the registered synthesis strategies
    Strategies,

    /// Show configuration file locations and the effective configuration
    Config,
}
