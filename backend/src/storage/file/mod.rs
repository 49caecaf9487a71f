//! # File Storage
//!
//! Flat-file persistence: each key of the local store is one JSON file in the
//! data directory.
//!
//! ```text
//! data/
//! ├── config.yaml
//! ├── device_id.json
//! ├── logs.json
//! └── profile.json
//! ```
//!
//! Writes go to a temp file first and are renamed into place, so a crash
//! never leaves a half-written key behind.

pub mod connection;

#[cfg(test)]
pub mod test_utils;

pub use connection::FileConnection;
