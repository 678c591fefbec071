use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::log::dto::FoodLogEntry;
use crate::profile::dto::UserProfile;

/// Authoritative, multi-device-visible food log. `put_entry` is an
/// idempotent upsert keyed `(user_id, key)`; writing the same entry under
/// the same key twice is a no-op in effect.
#[async_trait]
pub trait RemoteLogStore: Send + Sync {
    async fn put_entry(
        &self,
        user_id: &str,
        key: &str,
        entry: &FoodLogEntry,
    ) -> Result<(), RemoteError>;

    /// All entries recorded for a user; used by reconciliation.
    async fn list_entries(&self, user_id: &str) -> Result<Vec<FoodLogEntry>, RemoteError>;
}

/// Read/write contract for the per-user profile document.
#[async_trait]
pub trait RemoteProfileStore: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, RemoteError>;
    async fn put_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), RemoteError>;
}

/// HTTP client for the remote document API. Documents live at
/// `users/{userId}` and `users/{userId}/foodLogs/{key}`; every request
/// carries a bearer token.
#[derive(Clone)]
pub struct DocumentApi {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl DocumentApi {
    pub fn new(config: &RemoteConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build remote http client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn entry_url(&self, user_id: &str, key: &str) -> String {
        format!("{}/users/{}/foodLogs/{}", self.base_url, user_id, key)
    }

    fn log_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/foodLogs", self.base_url, user_id)
    }

    fn profile_url(&self, user_id: &str) -> String {
        format!("{}/users/{}", self.base_url, user_id)
    }
}

/// Auth rejections are kept apart from other API failures so the service
/// can report them distinctly.
fn classify(status: StatusCode) -> RemoteError {
    match status.as_u16() {
        code @ (401 | 403) => RemoteError::Auth(code),
        code => RemoteError::Api(code),
    }
}

#[async_trait]
impl RemoteLogStore for DocumentApi {
    async fn put_entry(
        &self,
        user_id: &str,
        key: &str,
        entry: &FoodLogEntry,
    ) -> Result<(), RemoteError> {
        let resp = self
            .http
            .put(self.entry_url(user_id, key))
            .bearer_auth(&self.api_token)
            .json(entry)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(classify(resp.status()))
        }
    }

    async fn list_entries(&self, user_id: &str) -> Result<Vec<FoodLogEntry>, RemoteError> {
        let resp = self
            .http
            .get(self.log_url(user_id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(classify(resp.status()));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl RemoteProfileStore for DocumentApi {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, RemoteError> {
        let resp = self
            .http
            .get(self.profile_url(user_id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(classify(resp.status()));
        }
        Ok(Some(resp.json().await?))
    }

    async fn put_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), RemoteError> {
        let resp = self
            .http
            .put(self.profile_url(user_id))
            .bearer_auth(&self.api_token)
            .json(profile)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(classify(resp.status()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> DocumentApi {
        DocumentApi::new(&RemoteConfig {
            base_url: "https://docs.example.com/v1/".into(),
            api_token: "token".into(),
            timeout_secs: 5,
        })
        .expect("client")
    }

    #[test]
    fn urls_follow_document_paths_without_double_slash() {
        let api = api();
        assert_eq!(
            api.entry_url("u1", "2024-08-01T12:30:00Z"),
            "https://docs.example.com/v1/users/u1/foodLogs/2024-08-01T12:30:00Z"
        );
        assert_eq!(
            api.log_url("u1"),
            "https://docs.example.com/v1/users/u1/foodLogs"
        );
        assert_eq!(api.profile_url("u1"), "https://docs.example.com/v1/users/u1");
    }

    #[test]
    fn auth_statuses_map_to_auth_errors() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED),
            RemoteError::Auth(401)
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN),
            RemoteError::Auth(403)
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR),
            RemoteError::Api(500)
        ));
    }
}
