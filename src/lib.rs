//! Write-through cache behind a food-logging front-end: entries are
//! appended to a device-local recent list first, then written to the
//! authoritative remote log, with partial failure reported through
//! [`log::LogResult`] instead of being swallowed.

pub mod config;
pub mod error;
pub mod log;
pub mod profile;
pub mod remote;
pub mod session;
pub mod state;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{RemoteError, ServiceError, StorageError, ValidationError};
pub use log::{EntrySource, FoodLogEntry, FoodLogService, LocalRecentStore, LogResult};
pub use profile::{ProfileService, UserProfile};
pub use session::{AuthSession, SessionContext};
pub use state::AppState;
