//! Verify that an update actually landed on the backend.
//!
//! The flaky backend sometimes acknowledges a PUT and then serves the old
//! record, so a read-back is compared field by field against the values the
//! update was supposed to set. Every expected field is checked and every
//! mismatch reported, not just the first.

use std::error::Error as StdError;
use std::fmt;

use serde_json::{Map, Value};

/// The way a single field failed verification.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchKind {
    /// The field is missing from the read-back record.
    MissingAfter,
    /// The field is present but holds the wrong value.
    WrongValue { expected: Value, actual: Value },
    /// The field matches its pre-update value, so the write had no effect.
    Unchanged { value: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub field: String,
    pub kind: MismatchKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MismatchKind::MissingAfter => {
                write!(f, "{}: missing from the updated record", self.field)
            }
            MismatchKind::WrongValue { expected, actual } => {
                write!(f, "{}: expected {}, got {}", self.field, expected, actual)
            }
            MismatchKind::Unchanged { value } => {
                write!(f, "{}: still {} (update had no effect)", self.field, value)
            }
        }
    }
}

/// Verification failed for at least one field.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyError {
    pub mismatches: Vec<Mismatch>,
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "update not applied:")?;
        for m in &self.mismatches {
            write!(f, " [{}]", m)?;
        }
        Ok(())
    }
}

impl StdError for VerifyError {}

/// Check that `after` carries every expected field value and that each of
/// those fields really moved away from its `before` value.
///
/// A field absent from `before` counts as changed.
pub fn verify_update(
    before: &Value,
    after: &Value,
    expected: &Map<String, Value>,
) -> Result<(), VerifyError> {
    let mut mismatches = Vec::new();
    for (field, want) in expected {
        let actual = after.as_object().and_then(|o| o.get(field));
        match actual {
            None => mismatches.push(Mismatch {
                field: field.clone(),
                kind: MismatchKind::MissingAfter,
            }),
            Some(got) if got != want => mismatches.push(Mismatch {
                field: field.clone(),
                kind: MismatchKind::WrongValue {
                    expected: want.clone(),
                    actual: got.clone(),
                },
            }),
            Some(got) => {
                if before.get(field) == Some(got) {
                    mismatches.push(Mismatch {
                        field: field.clone(),
                        kind: MismatchKind::Unchanged { value: got.clone() },
                    });
                }
            }
        }
    }
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(VerifyError { mismatches })
    }
}
