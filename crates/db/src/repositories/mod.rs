//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-statement flows
//! (template + version creation, suite batch persistence) run inside a
//! single transaction owned by the repository method.

pub mod snippet_repo;
pub mod suite_repo;
pub mod suite_run_repo;
pub mod template_repo;
pub mod test_case_repo;
pub mod test_run_repo;
pub mod version_repo;

pub use snippet_repo::SnippetRepo;
pub use suite_repo::SuiteRepo;
pub use suite_run_repo::SuiteRunRepo;
pub use template_repo::TemplateRepo;
pub use test_case_repo::TestCaseRepo;
pub use test_run_repo::TestRunRepo;
pub use version_repo::VersionRepo;
