//! Aggregate scenario outcomes into a run summary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;

use crate::retry::AttemptError;
use crate::stability::StabilityMetrics;

/// Result of one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub passed: bool,
    /// Human-readable reasons, empty when the scenario passed.
    pub failures: Vec<String>,
    pub duration: Duration,
}

/// Everything one run produced, rendered at the end into a summary.
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<ScenarioOutcome>,
    error_counts: BTreeMap<&'static str, u32>,
    stability_lines: Vec<String>,
}

impl RunReport {
    pub fn new() -> Self {
        RunReport::default()
    }

    pub fn record_outcome(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    /// Count every failed attempt by category, including failures that a
    /// later attempt recovered from.
    pub fn record_errors(&mut self, history: &[AttemptError]) {
        for e in history {
            *self.error_counts.entry(e.category.as_str()).or_insert(0) += 1;
        }
    }

    pub fn record_stability(&mut self, metrics: &StabilityMetrics) {
        self.stability_lines.push(metrics.summary_line());
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.passed_count()
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "petprobe summary {}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!(
            "{:<12} {:<6} {:>8}\n",
            "SCENARIO", "RESULT", "TIME(S)"
        ));
        for o in &self.outcomes {
            out.push_str(&format!(
                "{:<12} {:<6} {:>8.2}\n",
                o.name,
                if o.passed { "pass" } else { "FAIL" },
                o.duration.as_secs_f64()
            ));
            for failure in &o.failures {
                out.push_str(&format!("    {}\n", failure));
            }
        }
        if !self.stability_lines.is_empty() {
            out.push_str("\nStability:\n");
            for line in &self.stability_lines {
                out.push_str(&format!("  {}\n", line));
            }
        }
        out.push_str("\nErrors by category:\n");
        if self.error_counts.is_empty() {
            out.push_str("  none\n");
        } else {
            for (category, count) in &self.error_counts {
                out.push_str(&format!("  {}: {}\n", category, count));
            }
        }
        out.push_str(&format!(
            "\nOverall: {} passed, {} failed\n",
            self.passed_count(),
            self.failed_count()
        ));
        out
    }

    /// Write the rendered summary into `dir` under a timestamped name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("create report directory {}", dir.display()))?;
        let name = format!(
            "petprobe_summary_{}.txt",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(name);
        fs::write(&path, self.render())
            .with_context(|| format!("write summary to {}", path.display()))?;
        Ok(path)
    }
}
