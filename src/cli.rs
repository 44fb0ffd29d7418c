use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bddsniff")]
#[command(about = "Quality linter for Cucumber-style BDD suites", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze feature files and step definitions
    Analyze {
        /// Directory (or single file) holding the .feature files
        #[arg(long, default_value = "features")]
        features: PathBuf,

        /// Directory (or single file) holding step definitions and hooks
        #[arg(long = "step-definitions", default_value = "features")]
        step_definitions: PathBuf,

        /// Configuration file (defaults to searching for .bddsniff.toml)
        #[arg(short, long, env = "BDDSNIFF_CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of worst offenders listed in terminal output
        #[arg(long, default_value = "5")]
        top: usize,

        /// Number of worker threads (0 = one per core)
        #[arg(short, long, default_value = "0")]
        jobs: usize,

        /// Skip files matching a glob (repeatable)
        #[arg(long, value_name = "GLOB")]
        ignore: Vec<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Write a default .bddsniff.toml to the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["bddsniff", "analyze"]).unwrap();
        match cli.command {
            Commands::Analyze {
                features,
                step_definitions,
                format,
                jobs,
                top,
                ..
            } => {
                assert_eq!(features, PathBuf::from("features"));
                assert_eq!(step_definitions, PathBuf::from("features"));
                assert_eq!(format, OutputFormat::Terminal);
                assert_eq!(jobs, 0);
                assert_eq!(top, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_analyze_json_format() {
        let cli = Cli::try_parse_from([
            "bddsniff",
            "analyze",
            "--features",
            "acceptance/features",
            "--format",
            "json",
            "-o",
            "report.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                features,
                format,
                output,
                ..
            } => {
                assert_eq!(features, PathBuf::from("acceptance/features"));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(output, Some(PathBuf::from("report.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_repeated_ignore_globs() {
        let cli = Cli::try_parse_from([
            "bddsniff",
            "analyze",
            "--ignore",
            "vendor/**",
            "--ignore",
            "**/wip_*.feature",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze { ignore, .. } => {
                assert_eq!(ignore, vec!["vendor/**", "**/wip_*.feature"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_init_force() {
        let cli = Cli::try_parse_from(["bddsniff", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }
}
