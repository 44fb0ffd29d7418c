use anyhow::Result;
use bddsniff::cli::{Cli, Commands};
use bddsniff::commands::{self, AnalyzeConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            features,
            step_definitions,
            config,
            format,
            output,
            top,
            jobs,
            ignore,
            no_color,
        } => {
            let good = commands::handle_analyze(AnalyzeConfig {
                features,
                step_definitions,
                config,
                format,
                output,
                top,
                jobs,
                ignore,
                no_color,
            })?;
            if !good {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Init { force } => commands::init_config(force),
    }
}

/// `BDDSNIFF_LOG` wins over `RUST_LOG`; warnings only by default. Logs go to
/// stderr so JSON on stdout stays clean.
fn init_logging() {
    let filter = EnvFilter::try_from_env("BDDSNIFF_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
