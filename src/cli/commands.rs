use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::config::{
    AppConfig, RewriteProvider, build_replay_config, build_segmenter_config,
    resolve_rewrite_provider,
};
use crate::flow::input_template::{build_input_template, load_overrides};
use crate::replay::generator::generate_replay_script;
use crate::replay::plan::build_replay_plan;
use crate::replay::replay_model::PreconditionMode;
use crate::report::console::format_replay_plan;
use crate::rewrite::rewriter::{NoRewriter, OllamaRewriter, OpenAiRewriter, ScriptRewriter};
use crate::trace::logger::TraceLogger;
use crate::{CompileOptions, compile_events, load_flow};

// ============================================================================
// compile subcommand
// ============================================================================

pub fn cmd_compile(
    events: &str,
    out_dir: &str,
    no_classify: bool,
    precondition_mode: Option<PreconditionMode>,
    rewrite: Option<RewriteProvider>,
    trace: Option<&str>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let rewriter = build_rewriter(resolve_rewrite_provider(config, rewrite), config);
    let tracer = match trace {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    let options = CompileOptions {
        out_dir: PathBuf::from(out_dir),
        segmenter: build_segmenter_config(config, no_classify),
        replay: build_replay_config(config, precondition_mode),
        rewriter: rewriter.as_ref(),
        tracer: &tracer,
    };

    let result = compile_events(Path::new(events), &options)?;

    println!("Loaded {} events.", result.events.len());
    println!(
        "Compiled flow '{}' with {} steps (digest {}).",
        result.flow.name,
        result.flow.steps.len(),
        result.digest
    );
    if result.rewritten {
        println!("Rewritten script written.");
    }
    if let Some(error) = &result.rewrite_error {
        eprintln!("Script rewrite skipped: {}", error);
    }
    println!("Wrote output to {}", result.output_directory.display());

    Ok(())
}

// ============================================================================
// template subcommand
// ============================================================================

pub fn cmd_template(flow_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let flow = load_flow(Path::new(flow_path))?;
    let template = build_input_template(&flow.steps);
    println!("{}", template.to_json()?);
    Ok(())
}

// ============================================================================
// plan subcommand
// ============================================================================

pub fn cmd_plan(
    flow_path: &str,
    data: Option<&str>,
    precondition_mode: Option<PreconditionMode>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let flow_path = Path::new(flow_path);
    let flow = load_flow(flow_path)?;

    let replay = build_replay_config(config, precondition_mode);
    let data_path = match data {
        Some(path) => PathBuf::from(path),
        None => default_data_path(flow_path, &replay.data_file),
    };
    let overrides = load_overrides(&data_path);

    let plan = build_replay_plan(&flow, &overrides, &replay);
    print!("{}", format_replay_plan(&plan));
    Ok(())
}

// ============================================================================
// script subcommand
// ============================================================================

pub fn cmd_script(
    flow_path: &str,
    output: Option<&str>,
    precondition_mode: Option<PreconditionMode>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let flow = load_flow(Path::new(flow_path))?;
    let script = generate_replay_script(&flow, &build_replay_config(config, precondition_mode))?;

    match output {
        Some(path) => std::fs::write(path, &script)?,
        None => print!("{}", script),
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the rewrite collaborator for the resolved provider.
pub fn build_rewriter(provider: RewriteProvider, config: &AppConfig) -> Box<dyn ScriptRewriter> {
    let timeout = Duration::from_secs(config.rewrite.timeout_secs);
    match provider {
        RewriteProvider::None => Box::new(NoRewriter),
        RewriteProvider::Openai => {
            let defaults = OpenAiRewriter::default();
            Box::new(OpenAiRewriter {
                endpoint: config.rewrite.endpoint.clone().unwrap_or(defaults.endpoint),
                model: config.rewrite.model.clone().unwrap_or(defaults.model),
                api_key: defaults.api_key,
                timeout,
            })
        }
        RewriteProvider::Ollama => {
            let defaults = OllamaRewriter::default();
            Box::new(OllamaRewriter {
                endpoint: config.rewrite.endpoint.clone().unwrap_or(defaults.endpoint),
                model: config.rewrite.model.clone().unwrap_or(defaults.model),
                timeout,
            })
        }
    }
}

/// Override file next to `flow.json`, where the replay script looks for it.
pub fn default_data_path(flow_path: &Path, file_name: &str) -> PathBuf {
    flow_path
        .parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}
