//! `petprobe lifecycle` – run only the create/read/update scenario.

use anyhow::Result;
use petprobe_core::config::HarnessConfig;
use petprobe_core::report::RunReport;
use petprobe_core::scenario::Session;

use super::{connect, finish, print_outcome};

pub fn run_lifecycle(cfg: &HarnessConfig, keep_pets: bool) -> Result<()> {
    let client = connect(cfg)?;
    let mut report = RunReport::new();
    let mut session = Session::new(&client, cfg.retry_policy(), cfg.stability_thresholds());

    print_outcome(&session.lifecycle(&mut report));
    finish(session, report, keep_pets, None)
}
