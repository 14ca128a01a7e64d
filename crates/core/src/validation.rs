//! Attribution of third-party validation findings to template sections.
//!
//! The external code checker reports `(line, message)` pairs against the
//! compiled script. Each finding is mapped to the section that produced the
//! offending line by locating the nearest preceding section header.

use serde::{Deserialize, Serialize};

use crate::compiler::section_for_line;

/// One line-numbered finding from the external checker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Finding {
    /// 1-based line number in the compiled script.
    pub line: usize,
    pub message: String,
}

/// A finding labeled with the section it originated from.
#[derive(Debug, Clone, Serialize)]
pub struct AttributedFinding {
    pub line: usize,
    pub message: String,
    /// Section name (`"USER PARAMS"`, `"MAIN"`, ...), or `None` if the line
    /// could not be attributed (out of range or before the first header).
    pub section: Option<&'static str>,
}

/// Label each finding with its originating section.
pub fn attribute_findings(compiled: &str, findings: Vec<Finding>) -> Vec<AttributedFinding> {
    findings
        .into_iter()
        .map(|f| AttributedFinding {
            section: section_for_line(compiled, f.line).map(|s| s.name()),
            line: f.line,
            message: f.message,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
