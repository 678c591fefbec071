use serde::Deserialize;

/// Remote document API connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub remote: RemoteConfig,
    /// When set, the local recent list keeps only the newest N entries.
    pub recent_items_cap: Option<usize>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://foodlog.db".into());
        let remote = RemoteConfig {
            base_url: std::env::var("REMOTE_BASE_URL")?,
            api_token: std::env::var("REMOTE_API_TOKEN")?,
            timeout_secs: std::env::var("REMOTE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        let recent_items_cap = std::env::var("RECENT_ITEMS_CAP")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());
        Ok(Self {
            database_url,
            remote,
            recent_items_cap,
        })
    }
}
