//! Override precedence resolution for suite runs.
//!
//! A suite run resolves the effective text of the two overridable sections
//! (user params, AI tunables) through a three-tier fallback, independently
//! per field: request override > suite-level override > version default.

/// Resolve one overridable section: first non-`None` wins.
pub fn resolve_override<'a>(
    request: Option<&'a str>,
    suite: Option<&'a str>,
    version_default: &'a str,
) -> &'a str {
    request.or(suite).unwrap_or(version_default)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
