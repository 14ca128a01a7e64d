pub mod compile;
pub mod snippets;
pub mod suites;
pub mod templates;
pub mod tests;
