//! CLI for the petprobe test harness.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use petprobe_core::config;
use std::path::PathBuf;

use commands::{run_check, run_full, run_lifecycle, run_negative, run_stability};

/// Top-level CLI for the petprobe test harness.
#[derive(Debug, Parser)]
#[command(name = "petprobe")]
#[command(about = "petprobe: retry-aware functional test harness for the Pet Store API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run every scenario suite and write a summary report.
    Run {
        /// Number of sampled reads in the stability scenario.
        #[arg(long, default_value = "10", value_name = "N")]
        iterations: u32,
        /// Directory the summary report is written into.
        #[arg(long, default_value = "reports", value_name = "DIR")]
        report_dir: PathBuf,
        /// Print the summary but skip writing the report file.
        #[arg(long)]
        no_report: bool,
        /// Leave created pets on the backend (skip cleanup).
        #[arg(long)]
        keep_pets: bool,
    },

    /// Run only the create/read/update lifecycle scenario.
    Lifecycle {
        /// Leave created pets on the backend (skip cleanup).
        #[arg(long)]
        keep_pets: bool,
    },

    /// Run only the invalid-input scenario.
    Negative {
        /// Leave created pets on the backend (skip cleanup).
        #[arg(long)]
        keep_pets: bool,
    },

    /// Run only the repeated-read stability scenario.
    Stability {
        /// Number of sampled reads.
        #[arg(long, default_value = "10", value_name = "N")]
        iterations: u32,
        /// Leave created pets on the backend (skip cleanup).
        #[arg(long)]
        keep_pets: bool,
    },

    /// Check that the configured backend is reachable.
    Check,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                iterations,
                report_dir,
                no_report,
                keep_pets,
            } => run_full(&cfg, iterations, &report_dir, no_report, keep_pets)?,
            CliCommand::Lifecycle { keep_pets } => run_lifecycle(&cfg, keep_pets)?,
            CliCommand::Negative { keep_pets } => run_negative(&cfg, keep_pets)?,
            CliCommand::Stability {
                iterations,
                keep_pets,
            } => run_stability(&cfg, iterations, keep_pets)?,
            CliCommand::Check => run_check(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
