//! `petprobe run` – run every scenario suite and write a summary report.

use std::path::Path;

use anyhow::Result;
use petprobe_core::config::HarnessConfig;
use petprobe_core::report::RunReport;
use petprobe_core::scenario::Session;

use super::{connect, finish, print_outcome};

pub fn run_full(
    cfg: &HarnessConfig,
    iterations: u32,
    report_dir: &Path,
    no_report: bool,
    keep_pets: bool,
) -> Result<()> {
    let client = connect(cfg)?;
    let mut report = RunReport::new();
    let mut session = Session::new(&client, cfg.retry_policy(), cfg.stability_thresholds());

    print_outcome(&session.lifecycle(&mut report));
    print_outcome(&session.negative(&mut report));
    print_outcome(&session.stability(&mut report, iterations));

    let report_dir = if no_report { None } else { Some(report_dir) };
    finish(session, report, keep_pets, report_dir)
}
