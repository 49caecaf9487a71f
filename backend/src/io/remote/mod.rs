//! # Remote Module
//!
//! Mirror of the journal on an optional remote backend.
//!
//! - **backend**: the `RemoteBackend` trait over the `profiles` and `logs`
//!   collections
//! - **rest_backend**: HTTP implementation for a PostgREST-style service
//! - **in_memory**: in-process backend with failure injection
//! - **rows**: backend row shapes and the mappers to and from the local model
//! - **sync_adapter**: session gate, timeouts and outcome classification
//!
//! Remote results are tagged (`RemoteOutcome`) rather than propagated as
//! errors. The write path currently ignores every non-`Ok` variant, but the
//! tags leave room for an outbox with retries later.

pub mod backend;
pub mod error;
pub mod in_memory;
pub mod rest_backend;
pub mod rows;
pub mod sync_adapter;

pub use backend::RemoteBackend;
pub use error::RemoteError;
pub use in_memory::{FailureMode, InMemoryBackend};
pub use rest_backend::RestBackend;
pub use rows::{LogMapper, LogRow, ProfileMapper, ProfileRow};
pub use sync_adapter::{RemoteSyncAdapter, DEFAULT_REMOTE_TIMEOUT};

/// Outcome of a fire-and-forget remote write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// The backend accepted the write
    Ok,
    /// No session or no backend configured; nothing was attempted
    Skipped,
    /// Network failure, gateway error or timeout
    Unreachable,
    /// The backend answered and refused the request
    Rejected { status: Option<u16>, message: String },
}

/// Outcome of a remote read
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Fetched(T),
    Skipped,
    Unreachable,
    Rejected { status: Option<u16>, message: String },
}

impl<T> FetchOutcome<T> {
    /// Lift a failed write-style outcome into a fetch outcome
    pub(crate) fn from_failure(outcome: RemoteOutcome) -> Self {
        match outcome {
            RemoteOutcome::Skipped => FetchOutcome::Skipped,
            RemoteOutcome::Rejected { status, message } => FetchOutcome::Rejected { status, message },
            RemoteOutcome::Ok | RemoteOutcome::Unreachable => FetchOutcome::Unreachable,
        }
    }
}
