//! # Storage Module
//!
//! Local persistence for the journal: the canonical on-device copy of the
//! user profile, the log collection and the generated device identifier.
//!
//! ## Layers
//!
//! - **Connection** (`traits`): a synchronous key-value blob store. The file
//!   connection is used by the application, the memory connection by tests.
//! - **LocalStore**: typed JSON access to the three fixed keys, with a write
//!   lock that serializes read-modify-write of the log collection.
//!
//! The local store is authoritative for reads. Remote state only ever reaches
//! it through the startup fetch in the domain layer.

pub mod file;
pub mod local_store;
pub mod memory;
pub mod traits;

pub use file::FileConnection;
pub use local_store::LocalStore;
pub use memory::MemoryConnection;
pub use traits::*;
