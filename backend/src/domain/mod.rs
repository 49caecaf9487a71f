//! # Domain Module
//!
//! Business logic of the health journal, independent of any UI and of the
//! concrete storage connection.
//!
//! ## Module Organization
//!
//! - **identity_service**: which identity owns the journal right now
//! - **journal_service**: startup fetch and the optimistic write pipeline
//!   (profile saves, log appends, clear, sign-out)
//! - **export_service**: JSON backup bundles, file export/import and CSV
//! - **metrics_service**: BMI, growth deviation, ages and the weekly trend
//! - **growth_reference**: the bundled reference curve
//! - **commands**: inputs accepted by the services
//! - **models**: validation rules, identity and the explicit journal state
//!
//! ## Rules
//!
//! - Every write lands in the local store before anything else happens
//! - Remote writes are launched afterwards and their failure never fails
//!   the local operation
//! - With a session, the remote copy wins at startup

pub mod commands;
pub mod export_service;
pub mod growth_reference;
pub mod identity_service;
pub mod journal_service;
pub mod metrics_service;
pub mod models;

pub use export_service::ExportService;
pub use identity_service::IdentityService;
pub use journal_service::JournalService;
pub use metrics_service::MetricsService;
