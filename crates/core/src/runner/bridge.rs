//! Execution bridge: hands a compiled script plus a JSON input record to the
//! Python harness and parses back a structured result.
//!
//! The runner is a process-wide singleton ([`HarnessRunner::shared`]):
//! materializing the harness file is the expensive one-time step, and every
//! caller blocks on the same initialization future. Each execution spawns a
//! fresh interpreter process, so runs never share namespace state — that
//! isolation is an explicit contract of this bridge, not an accident of the
//! interpreter.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use super::harness::HARNESS_SOURCE;
use super::subprocess;

static SHARED_RUNNER: OnceCell<HarnessRunner> = OnceCell::const_new();

/// Errors raised by the bridge itself, as opposed to exceptions inside the
/// template (which come back as a [`RunOutcome`] with `success: false`).
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("Script timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Harness exited with code {exit_code}: {stderr}")]
    HarnessFailed { exit_code: i32, stderr: String },

    #[error("Unparseable harness output: {0}")]
    Malformed(String),
}

/// One decision-trace entry logged by the template.
///
/// `extra` carries arbitrary additional fields the script attached to the
/// entry; insertion order of entries is preserved and never deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionEntry {
    pub action: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// The ordered decision trace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionTrace {
    #[serde(default)]
    pub reasons: Vec<DecisionEntry>,
}

/// Structured result of executing a compiled script against one input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub action: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub decisions: DecisionTrace,
    /// Auxiliary namespace outputs read back after execution
    /// (feed-in limit, optimal charging, cheap-power flag).
    #[serde(default)]
    pub side_outputs: Value,
}

impl RunOutcome {
    /// Build the outcome for a bridge-level failure (spawn error, timeout,
    /// harness crash). Mirrors the shape of a template exception so callers
    /// derive an `error` status the same way.
    pub fn from_bridge_error(err: &BridgeError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            action: None,
            description: None,
            decisions: DecisionTrace::default(),
            side_outputs: Value::Null,
        }
    }
}

#[derive(Serialize)]
struct HarnessPayload<'a> {
    code: &'a str,
    input: &'a Value,
}

/// Process-wide runner for the embedded Python harness.
pub struct HarnessRunner {
    harness_path: PathBuf,
}

impl HarnessRunner {
    /// Get the shared runner, materializing the harness file on first use.
    ///
    /// All concurrent first callers await the same initialization.
    pub async fn shared() -> Result<&'static HarnessRunner, BridgeError> {
        SHARED_RUNNER
            .get_or_try_init(|| async {
                let path = std::env::temp_dir().join("rulestudio-harness.py");
                tokio::fs::write(&path, HARNESS_SOURCE)
                    .await
                    .map_err(BridgeError::Io)?;
                Ok(HarnessRunner { harness_path: path })
            })
            .await
    }

    /// Execute `compiled` against `input` with the given timeout.
    ///
    /// Returns `Ok` with `success: false` when the template itself raised;
    /// `Err` only for bridge-level failures (missing interpreter, timeout,
    /// harness crash, unparseable output).
    pub async fn execute(
        &self,
        compiled: &str,
        input: &Value,
        timeout: Duration,
    ) -> Result<RunOutcome, BridgeError> {
        let payload = HarnessPayload { code: compiled, input };
        let payload_bytes = serde_json::to_vec(&payload)
            .map_err(|e| BridgeError::Malformed(e.to_string()))?;

        let mut cmd = tokio::process::Command::new("python3");
        cmd.arg(&self.harness_path);

        let output = subprocess::run_command(&mut cmd, &payload_bytes, timeout).await?;

        if output.exit_code != 0 {
            return Err(BridgeError::HarnessFailed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        serde_json::from_str(output.stdout.trim()).map_err(|e| {
            BridgeError::Malformed(format!("{e} (stdout: {})", output.stdout.trim()))
        })
    }
}

/// Execute a compiled script, absorbing bridge failures into the outcome.
///
/// Test runs treat every failure mode — template exception, missing
/// interpreter, timeout — as a recordable `error` result rather than an HTTP
/// error, so this is the entry point handlers use.
pub async fn run_script(compiled: &str, input: &Value, timeout: Duration) -> RunOutcome {
    let runner = match HarnessRunner::shared().await {
        Ok(runner) => runner,
        Err(e) => return RunOutcome::from_bridge_error(&e),
    };
    match runner.execute(compiled, input, timeout).await {
        Ok(outcome) => outcome,
        Err(e) => RunOutcome::from_bridge_error(&e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Skip harness tests on machines without a Python interpreter.
    fn python_available() -> bool {
        std::process::Command::new("python3")
            .arg("--version")
            .output()
            .is_ok()
    }

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn executes_script_and_reads_action() {
        if !python_available() {
            return;
        }
        let outcome = run_script(
            "action = 'charge'\ndecisions.reason('charge', 'cheap power', price=3)",
            &serde_json::json!({}),
            TIMEOUT,
        )
        .await;
        assert!(outcome.success, "error: {:?}", outcome.error);
        assert_eq!(outcome.action.as_deref(), Some("charge"));
        assert_eq!(outcome.description.as_deref(), Some("cheap power"));
        assert_eq!(outcome.decisions.reasons.len(), 1);
        assert_eq!(
            outcome.decisions.reasons[0].extra.get("price"),
            Some(&serde_json::json!(3))
        );
    }

    #[tokio::test]
    async fn action_defaults_to_auto_and_description_to_none() {
        if !python_available() {
            return;
        }
        let outcome = run_script("x = 1", &serde_json::json!({}), TIMEOUT).await;
        assert!(outcome.success);
        assert_eq!(outcome.action.as_deref(), Some("auto"));
        assert_eq!(outcome.description, None);
        assert!(outcome.decisions.reasons.is_empty());
    }

    #[tokio::test]
    async fn template_exception_is_nonfatal() {
        if !python_available() {
            return;
        }
        let outcome = run_script("raise ValueError('boom')", &serde_json::json!({}), TIMEOUT).await;
        assert!(!outcome.success);
        let err = outcome.error.unwrap();
        assert!(err.contains("ValueError"), "missing traceback: {err}");
        assert_eq!(outcome.action, None);
        assert!(outcome.decisions.reasons.is_empty());
    }

    #[tokio::test]
    async fn input_overrides_defaults() {
        if !python_available() {
            return;
        }
        let outcome = run_script(
            "decisions.reason(action, str(buy_price))",
            &serde_json::json!({"buy_price": 42.5}),
            TIMEOUT,
        )
        .await;
        assert!(outcome.success);
        assert_eq!(outcome.description.as_deref(), Some("42.5"));
    }

    #[tokio::test]
    async fn soc_alias_maps_onto_battery_soc_first_seen_wins() {
        if !python_available() {
            return;
        }
        let outcome = run_script(
            "decisions.reason('check', str(battery_soc))",
            &serde_json::json!({"soc": 42}),
            TIMEOUT,
        )
        .await;
        assert_eq!(outcome.description.as_deref(), Some("42"));

        let outcome = run_script(
            "decisions.reason('check', str(battery_soc))",
            &serde_json::json!({"soc": 42, "battery_soc": 10}),
            TIMEOUT,
        )
        .await;
        assert_eq!(outcome.description.as_deref(), Some("10"));
    }

    #[tokio::test]
    async fn interval_time_accepts_hour_minute_object() {
        if !python_available() {
            return;
        }
        let outcome = run_script(
            "decisions.reason('check', interval_time.strftime('%H:%M'))",
            &serde_json::json!({"interval_time": {"hour": 7, "minute": 30}}),
            TIMEOUT,
        )
        .await;
        assert!(outcome.success, "error: {:?}", outcome.error);
        assert_eq!(outcome.description.as_deref(), Some("07:30"));
    }

    #[tokio::test]
    async fn interval_time_accepts_iso_string() {
        if !python_available() {
            return;
        }
        let outcome = run_script(
            "decisions.reason('check', interval_time.strftime('%Y-%m-%d %H:%M'))",
            &serde_json::json!({"interval_time": "2026-01-15T07:30:00"}),
            TIMEOUT,
        )
        .await;
        assert!(outcome.success, "error: {:?}", outcome.error);
        assert_eq!(outcome.description.as_deref(), Some("2026-01-15 07:30"));
    }

    #[tokio::test]
    async fn malformed_interval_time_is_a_nonfatal_error() {
        if !python_available() {
            return;
        }
        // An unparseable timestamp crashes the harness before the template
        // runs; that surfaces as a failed outcome, not a panic.
        let outcome = run_script(
            "action = 'charge'",
            &serde_json::json!({"interval_time": "not-a-date"}),
            TIMEOUT,
        )
        .await;
        assert!(!outcome.success);
        assert!(
            outcome
                .error
                .as_deref()
                .is_some_and(|e| e.contains("ValueError")),
            "error: {:?}",
            outcome.error
        );
    }

    #[tokio::test]
    async fn decisions_binding_is_never_overwritten() {
        if !python_available() {
            return;
        }
        let outcome = run_script(
            "decisions.reason('ok', 'still a logger')",
            &serde_json::json!({"decisions": "bogus"}),
            TIMEOUT,
        )
        .await;
        assert!(outcome.success, "error: {:?}", outcome.error);
        assert_eq!(outcome.description.as_deref(), Some("still a logger"));
    }

    #[tokio::test]
    async fn hung_script_times_out() {
        if !python_available() {
            return;
        }
        let outcome = run_script(
            "while True:\n    pass",
            &serde_json::json!({}),
            Duration::from_millis(500),
        )
        .await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn execute_surfaces_timeout_as_bridge_error() {
        if !python_available() {
            return;
        }
        let runner = HarnessRunner::shared().await.unwrap();
        let err = runner
            .execute(
                "while True:\n    pass",
                &serde_json::json!({}),
                Duration::from_millis(500),
            )
            .await
            .unwrap_err();
        assert_matches::assert_matches!(err, BridgeError::Timeout { .. });
    }
}
