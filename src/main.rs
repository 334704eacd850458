use clap::Parser;
use tracing_subscriber::EnvFilter;
use workflow_extractor::cli::commands::{cmd_compile, cmd_plan, cmd_script, cmd_template};
use workflow_extractor::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Compile {
            events,
            out_dir,
            no_classify,
            precondition_mode,
            rewrite,
            trace,
        } => {
            cmd_compile(
                &events,
                &out_dir,
                no_classify,
                precondition_mode,
                rewrite,
                trace.as_deref(),
                &config,
            )?;
        }
        Commands::Template { flow } => cmd_template(&flow)?,
        Commands::Plan {
            flow,
            data,
            precondition_mode,
        } => cmd_plan(&flow, data.as_deref(), precondition_mode, &config)?,
        Commands::Script {
            flow,
            output,
            precondition_mode,
        } => cmd_script(&flow, output.as_deref(), precondition_mode, &config)?,
    }

    Ok(())
}

/// RUST_LOG wins; otherwise -v/-vv/-vvv raise the level from warn.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
