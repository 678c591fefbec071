pub mod dto;
pub mod repo;
pub mod services;

pub use dto::{EntrySource, FoodLogEntry, LogResult, ResyncReport};
pub use repo::LocalRecentStore;
pub use services::FoodLogService;
