//! `petprobe check` – verify the configured backend answers.

use anyhow::{bail, Result};
use petprobe_core::client::PetStoreClient;
use petprobe_core::config::HarnessConfig;

pub fn run_check(cfg: &HarnessConfig) -> Result<()> {
    let client = PetStoreClient::new(cfg)?;
    if !client.health_check() {
        bail!("backend {} is not reachable", client.base_url());
    }
    println!("{} is reachable", client.base_url());
    Ok(())
}
