use std::path::{Path, PathBuf};

use clap::Parser;
use workflow_extractor::{
    cli::{
        commands::default_data_path,
        config::{
            AppConfig, Cli, Commands, RewriteProvider, build_replay_config,
            build_segmenter_config, load_config, resolve_rewrite_provider,
        },
    },
    replay::replay_model::PreconditionMode,
};

// =========================================================================
// Argument parsing
// =========================================================================

#[test]
fn compile_defaults() {
    let cli = Cli::try_parse_from(["workflow-extractor", "compile", "events.json"]).unwrap();

    assert_eq!(cli.verbose, 0);
    assert_eq!(cli.config, None);
    match cli.command {
        Commands::Compile {
            events,
            out_dir,
            no_classify,
            precondition_mode,
            rewrite,
            trace,
        } => {
            assert_eq!(events, "events.json");
            assert_eq!(out_dir, "out");
            assert!(!no_classify);
            assert_eq!(precondition_mode, None);
            assert_eq!(rewrite, None);
            assert_eq!(trace, None);
        }
        other => panic!("Expected compile, got {:?}", other),
    }
}

#[test]
fn compile_with_all_flags() {
    let cli = Cli::try_parse_from([
        "workflow-extractor",
        "-vv",
        "compile",
        "rec.json",
        "--out",
        "build",
        "--no-classify",
        "--precondition-mode",
        "per-step",
        "--rewrite",
        "ollama",
        "--trace",
        "trace.jsonl",
        "--config",
        "custom.yaml",
    ])
    .unwrap();

    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
    match cli.command {
        Commands::Compile {
            out_dir,
            no_classify,
            precondition_mode,
            rewrite,
            trace,
            ..
        } => {
            assert_eq!(out_dir, "build");
            assert!(no_classify);
            assert_eq!(precondition_mode, Some(PreconditionMode::PerStep));
            assert_eq!(rewrite, Some(RewriteProvider::Ollama));
            assert_eq!(trace.as_deref(), Some("trace.jsonl"));
        }
        other => panic!("Expected compile, got {:?}", other),
    }
}

#[test]
fn other_subcommands_parse() {
    let cli = Cli::try_parse_from(["workflow-extractor", "template", "out/flow.json"]).unwrap();
    assert!(matches!(cli.command, Commands::Template { ref flow } if flow == "out/flow.json"));

    let cli = Cli::try_parse_from([
        "workflow-extractor",
        "plan",
        "out/flow.json",
        "--data",
        "inputs.json",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Plan { ref data, precondition_mode: None, .. } if data.as_deref() == Some("inputs.json")
    ));

    let cli = Cli::try_parse_from(["workflow-extractor", "script", "out/flow.json", "-o", "run.ts"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Script { ref output, .. } if output.as_deref() == Some("run.ts")
    ));
}

#[test]
fn invalid_values_are_rejected() {
    assert!(Cli::try_parse_from(["workflow-extractor"]).is_err());
    assert!(
        Cli::try_parse_from([
            "workflow-extractor",
            "compile",
            "e.json",
            "--precondition-mode",
            "sometimes"
        ])
        .is_err()
    );
    assert!(
        Cli::try_parse_from(["workflow-extractor", "compile", "e.json", "--rewrite", "gemini"])
            .is_err()
    );
}

// =========================================================================
// Config file
// =========================================================================

fn write_config(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("workflow-extractor.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
segment:
  classify: false
  window_size: 4
replay:
  precondition_mode: per-step
  step_delay_ms: 250
rewrite:
  provider: openai
  model: gpt-4o
"#,
    );

    let config = load_config(path.to_str());

    assert!(!config.segment.classify);
    assert_eq!(config.segment.window_size, 4);
    assert_eq!(config.replay.precondition_mode, PreconditionMode::PerStep);
    assert_eq!(config.replay.step_delay_ms, 250);
    assert_eq!(config.replay.locator_timeout_ms, 8000, "Unset keys keep defaults");
    assert_eq!(config.replay.data_file, "data.json");
    assert_eq!(config.rewrite.provider, RewriteProvider::Openai);
    assert_eq!(config.rewrite.model.as_deref(), Some("gpt-4o"));
    assert_eq!(config.rewrite.timeout_secs, 20);
}

#[test]
fn missing_or_malformed_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let missing = load_config(dir.path().join("nope.yaml").to_str());
    assert!(missing.segment.classify);
    assert_eq!(missing.replay.precondition_mode, PreconditionMode::StartOnly);

    let path = write_config(dir.path(), "segment: [not, a, map");
    let malformed = load_config(path.to_str());
    assert!(malformed.segment.classify);
    assert_eq!(malformed.rewrite.provider, RewriteProvider::None);
}

#[test]
fn cli_flags_take_precedence_over_config() {
    let mut config = AppConfig::default();
    config.replay.precondition_mode = PreconditionMode::PerStep;
    config.rewrite.provider = RewriteProvider::Openai;

    assert_eq!(
        build_replay_config(&config, None).precondition_mode,
        PreconditionMode::PerStep
    );
    assert_eq!(
        build_replay_config(&config, Some(PreconditionMode::StartOnly)).precondition_mode,
        PreconditionMode::StartOnly
    );

    assert!(build_segmenter_config(&config, false).classify);
    assert!(!build_segmenter_config(&config, true).classify);

    assert_eq!(resolve_rewrite_provider(&config, None), RewriteProvider::Openai);
    assert_eq!(
        resolve_rewrite_provider(&config, Some(RewriteProvider::None)),
        RewriteProvider::None
    );
}

#[test]
fn data_file_defaults_next_to_flow() {
    assert_eq!(
        default_data_path(Path::new("out/flow.json"), "data.json"),
        PathBuf::from("out/data.json")
    );
    assert_eq!(
        default_data_path(Path::new("flow.json"), "inputs.json"),
        PathBuf::from("inputs.json")
    );
}
