pub mod dto;
pub mod services;

pub use dto::UserProfile;
pub use services::ProfileService;
