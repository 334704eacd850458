use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::replay::replay_model::{PreconditionMode, ReplayConfig};
use crate::segment::segmenter::SegmenterConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "workflow-extractor",
    version,
    about = "Compile recorded browser events into replayable flows"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: workflow-extractor.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile an events.json recording into flow, script and input template
    Compile {
        /// Path to the recorded events (JSON array)
        events: String,

        /// Output directory
        #[arg(long = "out", default_value = "out")]
        out_dir: String,

        /// Keep generic step types (no LOGIN / FILL_FORM / CLICK_SLOT / DISMISS_POPUP)
        #[arg(long)]
        no_classify: bool,

        /// When the replay script checks step preconditions
        #[arg(long, value_enum)]
        precondition_mode: Option<PreconditionMode>,

        /// Optional script rewrite service
        #[arg(long, value_enum)]
        rewrite: Option<RewriteProvider>,

        /// Write a JSONL segmentation trace to this path
        #[arg(long)]
        trace: Option<String>,
    },

    /// Print the input override template for a compiled flow
    Template {
        /// Path to flow.json
        flow: String,
    },

    /// Show what a replay of a flow would do, with overrides applied
    Plan {
        /// Path to flow.json
        flow: String,

        /// Input override file (default: data.json next to the flow)
        #[arg(long)]
        data: Option<String>,

        /// When preconditions are checked
        #[arg(long, value_enum)]
        precondition_mode: Option<PreconditionMode>,
    },

    /// Regenerate the replay script for a compiled flow
    Script {
        /// Path to flow.json
        flow: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// When the replay script checks step preconditions
        #[arg(long, value_enum)]
        precondition_mode: Option<PreconditionMode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RewriteProvider {
    #[default]
    None,
    Openai,
    Ollama,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `workflow-extractor.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub segment: SegmenterConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub rewrite: RewriteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    #[serde(default)]
    pub provider: RewriteProvider,

    pub endpoint: Option<String>,
    pub model: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            provider: RewriteProvider::None,
            endpoint: None,
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 { 20 }

// ============================================================================
// Config File Loading
// ============================================================================

pub const DEFAULT_CONFIG_FILE: &str = "workflow-extractor.yaml";

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

pub fn build_segmenter_config(config: &AppConfig, no_classify: bool) -> SegmenterConfig {
    SegmenterConfig {
        classify: config.segment.classify && !no_classify,
        ..config.segment.clone()
    }
}

pub fn build_replay_config(config: &AppConfig, mode: Option<PreconditionMode>) -> ReplayConfig {
    ReplayConfig {
        precondition_mode: mode.unwrap_or(config.replay.precondition_mode),
        ..config.replay.clone()
    }
}

pub fn resolve_rewrite_provider(config: &AppConfig, cli: Option<RewriteProvider>) -> RewriteProvider {
    cli.unwrap_or(config.rewrite.provider)
}
