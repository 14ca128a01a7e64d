//! Domain logic for the rule studio: template compilation, script
//! execution, status derivation, and validation-report attribution.
//!
//! Everything in this crate is pure or self-contained (no database access).
//! Persistence lives in `rulestudio-db`, the HTTP surface in `rulestudio-api`.

pub mod compiler;
pub mod error;
pub mod overrides;
pub mod runner;
pub mod slug;
pub mod types;
pub mod validation;
