use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::log::{FoodLogService, LocalRecentStore};
use crate::profile::ProfileService;
use crate::remote::{DocumentApi, RemoteLogStore, RemoteProfileStore};
use crate::session::AuthSession;

/// Composition root: the local pool, the remote document client behind its
/// trait seams, and the session handle. Services are built from here so a
/// test double can be swapped in through `from_parts`.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    /// The one recent-items store; all service handles share it (and its
    /// per-user append locks).
    pub recent: LocalRecentStore,
    pub remote_log: Arc<dyn RemoteLogStore>,
    pub remote_profile: Arc<dyn RemoteProfileStore>,
    pub session: Arc<AuthSession>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let opts = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse DATABASE_URL")?
            .create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .context("connect to local store")?;
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run local store migrations")?;

        let api = Arc::new(DocumentApi::new(&config.remote)?);
        let recent = LocalRecentStore::new(db.clone(), config.recent_items_cap);

        Ok(Self {
            db,
            config,
            recent,
            remote_log: api.clone(),
            remote_profile: api,
            session: Arc::new(AuthSession::new()),
        })
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        remote_log: Arc<dyn RemoteLogStore>,
        remote_profile: Arc<dyn RemoteProfileStore>,
        session: Arc<AuthSession>,
    ) -> Self {
        let recent = LocalRecentStore::new(db.clone(), config.recent_items_cap);
        Self {
            db,
            config,
            recent,
            remote_log,
            remote_profile,
            session,
        }
    }

    pub fn food_log(&self) -> FoodLogService {
        FoodLogService::new(
            self.recent.clone(),
            self.remote_log.clone(),
            self.session.clone(),
        )
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.remote_profile.clone(), self.session.clone())
    }

    /// State wired to an in-memory database and a no-op remote, for tests.
    pub async fn fake() -> Self {
        use crate::config::RemoteConfig;
        use crate::error::RemoteError;
        use crate::log::dto::FoodLogEntry;
        use crate::profile::dto::UserProfile;
        use async_trait::async_trait;

        struct FakeRemote;

        #[async_trait]
        impl RemoteLogStore for FakeRemote {
            async fn put_entry(
                &self,
                _user_id: &str,
                _key: &str,
                _entry: &FoodLogEntry,
            ) -> Result<(), RemoteError> {
                Ok(())
            }

            async fn list_entries(&self, _user_id: &str) -> Result<Vec<FoodLogEntry>, RemoteError> {
                Ok(Vec::new())
            }
        }

        #[async_trait]
        impl RemoteProfileStore for FakeRemote {
            async fn fetch_profile(
                &self,
                _user_id: &str,
            ) -> Result<Option<UserProfile>, RemoteError> {
                Ok(None)
            }

            async fn put_profile(
                &self,
                _user_id: &str,
                _profile: &UserProfile,
            ) -> Result<(), RemoteError> {
                Ok(())
            }
        }

        // Single connection so every handle sees the same in-memory database.
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("migrations on in-memory pool");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            remote: RemoteConfig {
                base_url: "http://fake.local".into(),
                api_token: "test".into(),
                timeout_secs: 1,
            },
            recent_items_cap: None,
        });

        let remote = Arc::new(FakeRemote);
        let recent = LocalRecentStore::new(db.clone(), config.recent_items_cap);
        Self {
            db,
            config,
            recent,
            remote_log: remote.clone(),
            remote_profile: remote,
            session: Arc::new(AuthSession::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::FoodLogEntry;

    #[tokio::test]
    async fn fake_state_logs_end_to_end() {
        let state = AppState::fake().await;
        state.session.login("u1").await;

        let service = state.food_log();
        let result = service
            .log_item("u1", FoodLogEntry::manual("Apple", Some(1.0), "1 medium"))
            .await
            .unwrap();
        assert!(result.fully_persisted());
        assert_eq!(service.list_recent("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn services_built_separately_share_append_serialization() {
        let state = AppState::fake().await;
        state.session.login("u1").await;

        let first = state.food_log();
        let second = state.food_log();
        let (r1, r2) = tokio::join!(
            first.log_item("u1", FoodLogEntry::manual("Apple", Some(1.0), "1 medium")),
            second.log_item("u1", FoodLogEntry::manual("Banana", Some(2.0), "1 large"))
        );
        assert!(r1.unwrap().local_write_ok);
        assert!(r2.unwrap().local_write_ok);

        // Both concurrent appends survive the whole-list rewrite.
        assert_eq!(first.list_recent("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn logout_invalidates_further_writes() {
        let state = AppState::fake().await;
        state.session.login("u1").await;
        state.session.logout().await;

        let service = state.food_log();
        let err = service
            .log_item("u1", FoodLogEntry::manual("Apple", None, ""))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            crate::error::ValidationError::StaleSession("u1".into())
        );
    }
}
