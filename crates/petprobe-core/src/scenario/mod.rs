//! Scenario suites run against a live Pet Store backend.
//!
//! A [`Session`] owns the per-run state: the pet factory, the retry policy,
//! and the ids of every pet a suite created, so cleanup can sweep them all
//! at the end no matter which suites ran or how they fared.

use std::time::Instant;

use anyhow::{bail, Context, Result};

use crate::client::PetStoreClient;
use crate::config::StabilityConfig;
use crate::pet::{self, Pet, PetFactory, MAX_PET_ID};
use crate::report::{RunReport, ScenarioOutcome};
use crate::retry::{
    run_with_retry, ApiError, ErrorCategory, NotFoundHandling, RetryPolicy, TerminalFailure,
};
use crate::stability::StabilityTracker;
use crate::verify;

/// Outside the factory's id range and never created by the suites.
const NONEXISTENT_PET_ID: u64 = 999_999_999;

/// Tally of what cleanup did with the pets a run created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupStats {
    pub deleted: u32,
    pub not_found: u32,
    pub failed: u32,
}

/// One run's worth of scenario state against a single backend.
pub struct Session<'a> {
    client: &'a PetStoreClient,
    policy: RetryPolicy,
    thresholds: StabilityConfig,
    factory: PetFactory,
    created: Vec<u64>,
}

impl<'a> Session<'a> {
    pub fn new(
        client: &'a PetStoreClient,
        policy: RetryPolicy,
        thresholds: StabilityConfig,
    ) -> Self {
        Session {
            client,
            policy,
            thresholds,
            factory: PetFactory::new(),
            created: Vec::new(),
        }
    }

    /// Ids of pets created so far and not yet cleaned up.
    pub fn created_ids(&self) -> &[u64] {
        &self.created
    }

    /// Run one operation under the retry policy, recording the outcome in
    /// the tracker and its error profile in the report.
    fn run_op<T, F>(
        &mut self,
        name: &str,
        not_found: NotFoundHandling,
        tracker: &mut StabilityTracker,
        report: &mut RunReport,
        op: F,
    ) -> Result<T, TerminalFailure>
    where
        F: FnMut() -> Result<T, ApiError>,
    {
        match run_with_retry(&self.policy, not_found, op) {
            Ok(s) => {
                tracing::debug!(operation = name, retries = s.retry_count, "operation succeeded");
                tracker.record_attempt(true, s.retry_count);
                report.record_errors(&s.history);
                Ok(s.value)
            }
            Err(t) => {
                tracing::warn!(operation = name, attempts = t.attempts(), "operation failed: {}", t);
                tracker.record_attempt_with_category(false, t.retry_count(), Some(t.category()));
                report.record_errors(t.history());
                Err(t)
            }
        }
    }

    /// Create, read back, update, and verify one pet end to end.
    pub fn lifecycle(&mut self, report: &mut RunReport) -> ScenarioOutcome {
        let started = Instant::now();
        let mut tracker = StabilityTracker::new("lifecycle");
        let mut failures = Vec::new();

        if let Err(e) = self.lifecycle_steps(&mut tracker, report) {
            failures.push(format!("{:#}", e));
        }
        if let Some(m) = tracker.metrics() {
            report.record_stability(&m);
        }

        let outcome = ScenarioOutcome {
            name: "lifecycle".to_string(),
            passed: failures.is_empty(),
            failures,
            duration: started.elapsed(),
        };
        report.record_outcome(outcome.clone());
        outcome
    }

    fn lifecycle_steps(
        &mut self,
        tracker: &mut StabilityTracker,
        report: &mut RunReport,
    ) -> Result<()> {
        let client = self.client;
        let pet = self.factory.pet();
        pet.validate().context("generated pet failed validation")?;
        tracing::info!("lifecycle: creating pet {} ({})", pet.id, pet.name);

        let resp = self
            .run_op(
                "create_pet",
                NotFoundHandling::ExpectPresent,
                tracker,
                report,
                || client.create_pet(&pet),
            )
            .context("create pet")?;
        let created: Pet = resp.json().context("create response")?;
        if created.id != pet.id {
            bail!(
                "backend answered the create of pet {} with id {}",
                pet.id,
                created.id
            );
        }
        self.created.push(pet.id);

        // The flaky backend can serve a 404 right after a successful
        // create, so the read-back polls under the retry budget.
        let resp = self
            .run_op(
                "get_pet",
                NotFoundHandling::ExpectPresent,
                tracker,
                report,
                || client.get_pet(pet.id),
            )
            .context("read back created pet")?;
        let before: Pet = resp.json().context("read-back response")?;
        if before.name != pet.name {
            bail!(
                "read-back name {:?} does not match created name {:?}",
                before.name,
                pet.name
            );
        }

        let (updated, expected) = pet::updated_variant(&before);
        self.run_op(
            "update_pet",
            NotFoundHandling::ExpectPresent,
            tracker,
            report,
            || client.update_pet(&updated),
        )
        .context("update pet")?;

        let resp = self
            .run_op(
                "get_pet_after_update",
                NotFoundHandling::ExpectPresent,
                tracker,
                report,
                || client.get_pet(pet.id),
            )
            .context("read back updated pet")?;
        let after: Pet = resp.json().context("updated read-back response")?;

        let before_v = serde_json::to_value(&before).context("encode pre-update record")?;
        let after_v = serde_json::to_value(&after).context("encode post-update record")?;
        verify::verify_update(&before_v, &after_v, &expected).context("update verification")?;
        tracing::info!("lifecycle: update of pet {} verified", pet.id);
        Ok(())
    }

    /// Check that invalid input is rejected, locally and by the backend,
    /// and that rejection happens without burning retries.
    pub fn negative(&mut self, report: &mut RunReport) -> ScenarioOutcome {
        let started = Instant::now();
        let mut failures = Vec::new();

        let invalid = [
            ("a zero id", self.factory.pet_with_invalid_id()),
            ("an oversized id", self.factory.pet_with_oversized_id()),
            ("an empty name", self.factory.pet_with_empty_name()),
        ];
        for (label, bad) in &invalid {
            if bad.validate().is_ok() {
                failures.push(format!("local validation accepted a pet with {}", label));
            }
        }
        if pet::validate_pet_id(1).is_err() || pet::validate_pet_id(MAX_PET_ID).is_err() {
            failures.push("local validation rejected an id inside the valid range".to_string());
        }

        let client = self.client;

        // A malformed create must come back as a validation error on the
        // first attempt. If the backend accepts it anyway, that is a finding,
        // and the accidental record still gets cleaned up.
        let bad = self.factory.pet_with_empty_name();
        match run_with_retry(&self.policy, NotFoundHandling::ExpectPresent, || {
            client.create_pet(&bad)
        }) {
            Ok(s) => {
                report.record_errors(&s.history);
                failures.push("backend accepted a pet with an empty name".to_string());
                self.created.push(bad.id);
            }
            Err(t) => {
                report.record_errors(t.history());
                let rejected_outright = matches!(t, TerminalFailure::Fatal { .. })
                    && t.category() == ErrorCategory::ValidationError
                    && t.attempts() == 1;
                if !rejected_outright {
                    failures.push(format!(
                        "malformed create was not rejected as a validation error: {}",
                        t
                    ));
                }
            }
        }

        // Reading a pet that never existed must 404 once, with no retries.
        match run_with_retry(&self.policy, NotFoundHandling::ExpectAbsent, || {
            client.get_pet(NONEXISTENT_PET_ID)
        }) {
            Ok(s) => {
                report.record_errors(&s.history);
                failures.push(format!(
                    "backend returned a record for pet {}",
                    NONEXISTENT_PET_ID
                ));
            }
            Err(t) => {
                report.record_errors(t.history());
                if !t.is_expected_absence() {
                    failures.push(format!("absence check failed: {}", t));
                } else if t.attempts() != 1 {
                    failures.push(format!(
                        "absence check burned {} attempts on a terminal 404",
                        t.attempts()
                    ));
                }
            }
        }

        let outcome = ScenarioOutcome {
            name: "negative".to_string(),
            passed: failures.is_empty(),
            failures,
            duration: started.elapsed(),
        };
        report.record_outcome(outcome.clone());
        outcome
    }

    /// Hammer one read repeatedly and judge the backend's success rate
    /// against the configured thresholds.
    pub fn stability(&mut self, report: &mut RunReport, iterations: u32) -> ScenarioOutcome {
        let started = Instant::now();
        let mut tracker = StabilityTracker::new("stability_sample");
        let mut failures = Vec::new();

        let client = self.client;
        let pet = self.factory.pet();
        let seeded = match self.run_op(
            "create_pet",
            NotFoundHandling::ExpectPresent,
            &mut tracker,
            report,
            || client.create_pet(&pet),
        ) {
            Ok(_) => {
                self.created.push(pet.id);
                true
            }
            Err(t) => {
                failures.push(format!("seed pet create failed: {}", t));
                false
            }
        };

        if seeded {
            for _ in 0..iterations {
                // Each read is its own retry sequence; a failure here is
                // data for the metrics, not a reason to stop sampling.
                let _ = self.run_op(
                    "get_pet",
                    NotFoundHandling::ExpectPresent,
                    &mut tracker,
                    report,
                    || client.get_pet(pet.id),
                );
            }
        }

        match tracker.metrics() {
            None => failures.push("no attempts recorded".to_string()),
            Some(m) => {
                tracing::info!("stability: {}", m.summary_line());
                report.record_stability(&m);
                if m.success_rate < self.thresholds.acceptable_threshold {
                    failures.push(format!(
                        "success rate {:.1}% below acceptable threshold {:.1}%",
                        m.success_rate, self.thresholds.acceptable_threshold
                    ));
                } else if m.success_rate < self.thresholds.stable_threshold {
                    tracing::warn!(
                        "stability: success rate {:.1}% below stable threshold {:.1}%",
                        m.success_rate,
                        self.thresholds.stable_threshold
                    );
                }
            }
        }

        let outcome = ScenarioOutcome {
            name: "stability".to_string(),
            passed: failures.is_empty(),
            failures,
            duration: started.elapsed(),
        };
        report.record_outcome(outcome.clone());
        outcome
    }

    /// Delete every pet the suites created. A 404 means the record is
    /// already gone, which is the state cleanup wants anyway.
    pub fn cleanup(&mut self, report: &mut RunReport) -> CleanupStats {
        let client = self.client;
        let mut stats = CleanupStats::default();
        for id in std::mem::take(&mut self.created) {
            match run_with_retry(&self.policy, NotFoundHandling::ExpectAbsent, || {
                client.delete_pet(id)
            }) {
                Ok(s) => {
                    report.record_errors(&s.history);
                    stats.deleted += 1;
                }
                Err(t) => {
                    report.record_errors(t.history());
                    if t.is_expected_absence() {
                        stats.not_found += 1;
                    } else {
                        tracing::warn!("cleanup: delete of pet {} failed: {}", id, t);
                        stats.failed += 1;
                    }
                }
            }
        }
        if stats.failed > 0 {
            tracing::warn!(
                "cleanup left {} pets behind ({} deleted, {} already gone)",
                stats.failed,
                stats.deleted,
                stats.not_found
            );
        } else {
            tracing::debug!(
                "cleanup: {} deleted, {} already gone",
                stats.deleted,
                stats.not_found
            );
        }
        stats
    }
}
