use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::{
    error::CompileError,
    evidence::{evidence_model::EvidenceEvent, loader::load_events},
    flow::{
        flow_builder::build_flow_traced,
        flow_model::Flow,
        input_template::build_input_template,
    },
    replay::{generator::generate_replay_script, replay_model::ReplayConfig},
    rewrite::rewriter::ScriptRewriter,
    segment::segmenter::SegmenterConfig,
    trace::logger::TraceLogger,
};

pub mod cli;
pub mod error;
pub mod evidence;
pub mod flow;
pub mod replay;
pub mod report;
pub mod rewrite;
pub mod segment;
pub mod selector;
pub mod trace;

pub const EVENTS_FILE: &str = "events.json";
pub const FLOW_FILE: &str = "flow.json";
pub const SCRIPT_FILE: &str = "run.ts";
pub const REWRITTEN_SCRIPT_FILE: &str = "llm-run.ts";

/// Everything the compile pipeline needs besides the input path.
pub struct CompileOptions<'a> {
    pub out_dir: PathBuf,
    pub segmenter: SegmenterConfig,
    pub replay: ReplayConfig,
    pub rewriter: &'a dyn ScriptRewriter,
    pub tracer: &'a TraceLogger,
}

/// Result of a compile run.
#[derive(Debug)]
pub struct CompileOutput {
    pub events: Vec<EvidenceEvent>,
    pub flow: Flow,
    pub digest: String,
    pub output_directory: PathBuf,

    /// Whether the rewrite collaborator produced `llm-run.ts`
    pub rewritten: bool,

    /// Rewrite failure, if any. Baseline artifacts are written regardless.
    pub rewrite_error: Option<String>,
}

/// Load events, compile them, and write all artifacts to the output dir:
/// `events.json`, `flow.json`, `run.ts`, the input template (`data.json` by
/// default) and, when the rewrite collaborator answers, `llm-run.ts`.
pub fn compile_events(events_path: &Path, options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let events = load_events(events_path)?;
    let flow = build_flow_traced(&events, &options.segmenter, options.tracer)?;
    let script = generate_replay_script(&flow, &options.replay)?;
    let template = build_input_template(&flow.steps);
    let digest = flow.digest()?;

    let out_dir = &options.out_dir;
    std::fs::create_dir_all(out_dir).map_err(|e| CompileError::io(out_dir, e))?;

    let events_json =
        serde_json::to_string_pretty(&events).map_err(|e| CompileError::JsonSerialize {
            context: "evidence events".into(),
            source: e,
        })?;
    write_artifact(out_dir, EVENTS_FILE, &events_json)?;
    write_artifact(out_dir, FLOW_FILE, &flow.to_json()?)?;
    write_artifact(out_dir, SCRIPT_FILE, &script)?;
    write_artifact(out_dir, &options.replay.data_file, &template.to_json()?)?;

    info!(
        flow = %flow.name,
        steps = flow.steps.len(),
        digest = %digest,
        "wrote baseline artifacts"
    );

    let (rewritten, rewrite_error) = match options.rewriter.rewrite(&flow, &script) {
        Ok(Some(body)) => {
            write_artifact(out_dir, REWRITTEN_SCRIPT_FILE, &body)?;
            (true, None)
        }
        Ok(None) => (false, None),
        Err(e) => {
            let e = CompileError::from(e);
            error!("{}", e);
            (false, Some(e.to_string()))
        }
    };

    Ok(CompileOutput {
        events,
        flow,
        digest,
        output_directory: out_dir.clone(),
        rewritten,
        rewrite_error,
    })
}

fn write_artifact(dir: &Path, name: &str, contents: &str) -> Result<(), CompileError> {
    let path = dir.join(name);
    std::fs::write(&path, contents).map_err(|e| CompileError::io(&path, e))
}

/// Read a compiled `flow.json`.
pub fn load_flow(path: &Path) -> Result<Flow, CompileError> {
    let raw = std::fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
    Flow::from_json(&raw)
}
