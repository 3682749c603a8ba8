//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for simulation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Transcript, outcome, and proposal
    Full,
    /// Outcome and proposal only
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for accord
#[derive(Parser, Debug)]
#[command(name = "accord")]
#[command(author, version, about = "Consensus negotiation between representative agents")]
#[command(long_about = r#"
Accord lets representative agents, each acting for one principal, negotiate a
topic until they reach consensus.

A negotiation moves through three stages:
1. Perspective pass: each agent restates the other side's viewpoint
2. Option generation: agents table tagged options (OPT-A, OPT-B, ...)
3. Consensus check: agents answer CONSENT:YES or CONSENT:NO

Configuration files are loaded from (in priority order):
1. --config <path>              Explicit config file
2. ./accord.toml                Project-level config
3. ~/.config/accord/config.toml Global config

Example:
  accord simulate --topic "Q3 offsite budget" --agents team.toml
  accord simulate --topic "Hiring plan" --agents team.json --rounds 20 -o json
  accord show-config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a negotiation between the agents of a roster file
    Simulate(SimulateArgs),
    /// Show configuration file locations and exit
    ShowConfig,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Topic to negotiate
    #[arg(short, long)]
    pub topic: String,

    /// Optional longer description of the topic
    #[arg(short, long)]
    pub description: Option<String>,

    /// Roster of agents (.json or .toml) with optional preference profiles
    #[arg(short, long, value_name = "PATH")]
    pub agents: PathBuf,

    /// Maximum number of generated turns
    #[arg(short, long, default_value_t = 12)]
    pub rounds: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Seed for reproducible respondent selection
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_arguments() {
        let cli = Cli::try_parse_from([
            "accord",
            "-vv",
            "simulate",
            "--topic",
            "Offsite budget",
            "--agents",
            "team.toml",
            "--rounds",
            "6",
            "-o",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.topic, "Offsite budget");
        assert_eq!(args.agents, PathBuf::from("team.toml"));
        assert_eq!(args.rounds, 6);
        assert_eq!(args.output, OutputFormat::Json);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_defaults_and_global_flags() {
        let cli = Cli::try_parse_from([
            "accord",
            "simulate",
            "-t",
            "Hiring plan",
            "-a",
            "team.json",
            "--quiet",
            "--no-config",
        ])
        .unwrap();

        assert!(cli.quiet);
        assert!(cli.no_config);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.rounds, 12);
        assert_eq!(args.output, OutputFormat::Full);
    }

    #[test]
    fn test_show_config() {
        let cli = Cli::try_parse_from(["accord", "show-config", "--config", "x.toml"]).unwrap();
        assert!(matches!(cli.command, Command::ShowConfig));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_simulate_requires_agents() {
        assert!(Cli::try_parse_from(["accord", "simulate", "--topic", "x"]).is_err());
    }
}
