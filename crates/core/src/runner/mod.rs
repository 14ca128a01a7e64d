//! Rule script execution.
//!
//! A compiled template is executed inside a Python interpreter against a
//! simulated platform namespace (sentinel defaults merged with the test
//! input). The harness source is embedded in [`harness`]; [`bridge`] owns the
//! process-wide runner singleton and the structured result types; shared
//! subprocess plumbing lives in [`subprocess`]; pass/fail/error/pending
//! derivation in [`status`].

pub mod bridge;
pub mod harness;
pub mod status;
pub mod subprocess;

pub use bridge::{run_script, BridgeError, HarnessRunner, RunOutcome};
pub use status::{derive_status, RunStatus};
