//! CLI command handlers. Each command is in its own file.

mod check;
mod lifecycle;
mod negative;
mod run;
mod stability;

pub use check::run_check;
pub use lifecycle::run_lifecycle;
pub use negative::run_negative;
pub use run::run_full;
pub use stability::run_stability;

use std::path::Path;

use anyhow::{bail, Result};
use petprobe_core::client::PetStoreClient;
use petprobe_core::config::HarnessConfig;
use petprobe_core::report::{RunReport, ScenarioOutcome};
use petprobe_core::scenario::Session;

/// Build the client and refuse to start scenarios against a dead backend.
pub(crate) fn connect(cfg: &HarnessConfig) -> Result<PetStoreClient> {
    let client = PetStoreClient::new(cfg)?;
    if !client.health_check() {
        bail!("backend {} is not reachable", client.base_url());
    }
    Ok(client)
}

pub(crate) fn print_outcome(outcome: &ScenarioOutcome) {
    println!(
        "{:<12} {:<6} {:>8.2}",
        outcome.name,
        if outcome.passed { "pass" } else { "FAIL" },
        outcome.duration.as_secs_f64()
    );
    for failure in &outcome.failures {
        println!("    {}", failure);
    }
}

/// Common tail of every scenario command: clean up (unless asked not to),
/// print the summary, optionally write it to disk, and exit nonzero when
/// any scenario failed.
pub(crate) fn finish(
    mut session: Session<'_>,
    mut report: RunReport,
    keep_pets: bool,
    report_dir: Option<&Path>,
) -> Result<()> {
    if keep_pets {
        println!(
            "Keeping {} created pets on the backend.",
            session.created_ids().len()
        );
    } else {
        let stats = session.cleanup(&mut report);
        println!(
            "Cleanup: {} deleted, {} already gone, {} failed",
            stats.deleted, stats.not_found, stats.failed
        );
    }

    println!();
    print!("{}", report.render());

    if let Some(dir) = report_dir {
        let path = report.write_to(dir)?;
        println!("Summary written to {}", path.display());
    }

    if !report.all_passed() {
        bail!(
            "{} of {} scenarios failed",
            report.failed_count(),
            report.total()
        );
    }
    Ok(())
}
