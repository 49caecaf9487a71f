//! # IO Module
//!
//! Boundary between the journal's domain logic and the outside world that is
//! not local disk: today that is the optional remote backend.

pub mod remote;

pub use remote::{FetchOutcome, RemoteOutcome, RemoteSyncAdapter};
