//! Pass/fail/error/pending derivation for a single test run.
//!
//! One canonical rule is used by both the single-test and suite code paths:
//!
//! 1. If execution itself failed, the run is `Error` regardless of
//!    expectations.
//! 2. If neither expected field is set, the run is `Pending` — there is
//!    nothing to compare against.
//! 3. If an expected field is set but its actual counterpart is absent, the
//!    run is `Pending`: the comparison could not be made.
//! 4. An expected action that differs from the actual action is a `Fail`;
//!    otherwise an expected description that differs from the actual
//!    description is a `Fail`.
//! 5. Everything else is a `Pass`.

use serde::Serialize;

/// Derived status of one test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pass,
    Fail,
    Error,
    Pending,
}

impl RunStatus {
    /// The string form stored in `rule_test_runs.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Pass => "pass",
            RunStatus::Fail => "fail",
            RunStatus::Error => "error",
            RunStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the status of one run from expectations and actual results.
///
/// `execution_succeeded` is `false` when the script raised (or the bridge
/// failed); expected fields come from the test case, actual fields from the
/// execution outcome. Empty expected strings count as "not set".
pub fn derive_status(
    expected_action: Option<&str>,
    expected_description: Option<&str>,
    execution_succeeded: bool,
    actual_action: Option<&str>,
    actual_description: Option<&str>,
) -> RunStatus {
    if !execution_succeeded {
        return RunStatus::Error;
    }

    let expected_action = expected_action.filter(|s| !s.is_empty());
    let expected_description = expected_description.filter(|s| !s.is_empty());

    if expected_action.is_none() && expected_description.is_none() {
        return RunStatus::Pending;
    }

    if let Some(expected) = expected_action {
        match actual_action {
            None => return RunStatus::Pending,
            Some(actual) if actual != expected => return RunStatus::Fail,
            Some(_) => {}
        }
    }

    if let Some(expected) = expected_description {
        match actual_description {
            None => return RunStatus::Pending,
            Some(actual) if actual != expected => return RunStatus::Fail,
            Some(_) => {}
        }
    }

    RunStatus::Pass
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
