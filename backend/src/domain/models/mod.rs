pub mod daily_log;
pub mod identity;
pub mod profile;
pub mod state;

pub use daily_log::{apply_body_measures, generate_log_id, validate_log, LogValidationError};
pub use identity::{Identity, IdentityKind, Session};
pub use profile::{validate_profile, ProfileValidationError};
pub use state::JournalState;
