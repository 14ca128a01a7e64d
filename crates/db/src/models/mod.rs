//! Row structs and request DTOs, one module per table family.

pub mod run;
pub mod snippet;
pub mod suite;
pub mod template;
pub mod test_case;
