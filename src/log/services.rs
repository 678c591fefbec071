use std::collections::HashMap;
use std::sync::Arc;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::error::{ServiceError, StorageError, ValidationError};
use crate::log::dto::{FoodLogEntry, LogResult, ResyncReport};
use crate::log::repo::LocalRecentStore;
use crate::remote::RemoteLogStore;
use crate::session::SessionContext;

/// Single entry point for recording food items. Owns the ordering contract
/// between the stores: the local append always runs first so the recent
/// list shows an item before it is provably durable remotely, and a failure
/// in either store never aborts the other write.
///
/// Carries no coordination state of its own: per-user append serialization
/// lives in the store and remote keys derive from list content, so clones
/// and independently built handles over the same store behave identically.
#[derive(Clone)]
pub struct FoodLogService {
    local: LocalRecentStore,
    remote: Arc<dyn RemoteLogStore>,
    session: Arc<dyn SessionContext>,
}

impl FoodLogService {
    pub fn new(
        local: LocalRecentStore,
        remote: Arc<dyn RemoteLogStore>,
        session: Arc<dyn SessionContext>,
    ) -> Self {
        Self {
            local,
            remote,
            session,
        }
    }

    /// Record one entry: validate, append to the local recent list, then
    /// write to the remote log. Store failures are captured in the returned
    /// `LogResult`, never thrown; only invalid input or a dead session
    /// errors out, and in that case no store has been touched.
    pub async fn log_item(
        &self,
        user_id: &str,
        entry: FoodLogEntry,
    ) -> Result<LogResult, ValidationError> {
        self.validate(user_id, &entry).await?;
        let base_key = entry
            .timestamp
            .format(&Rfc3339)
            .map_err(|_| ValidationError::UnrepresentableTimestamp)?;

        let (local_write_ok, prior_same_instant) = match self.local.append(user_id, &entry).await {
            Ok(prior) => (true, prior),
            Err(e) => {
                // Without the list we cannot see earlier same-instant
                // entries; the bare timestamp key is the best available.
                warn!(error = %e, %user_id, "local append failed, continuing with remote write");
                (false, 0)
            }
        };
        let key = suffixed_key(&base_key, prior_same_instant);

        let remote_write_ok = match self.remote.put_entry(user_id, &key, &entry).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, %user_id, %key, "remote write failed, entry kept in local cache");
                false
            }
        };

        Ok(LogResult {
            local_write_ok,
            remote_write_ok,
        })
    }

    /// The local recent list in insertion order. Never touches the remote
    /// log and returns empty for an unknown user.
    pub async fn list_recent(&self, user_id: &str) -> Result<Vec<FoodLogEntry>, StorageError> {
        self.local.get_all(user_id).await
    }

    /// One reconciliation pass: re-put local entries the remote log is
    /// missing. Caller-triggered; there is no internal retry loop, so a
    /// caller wanting backoff layers it around this.
    pub async fn resync(&self, user_id: &str) -> Result<ResyncReport, ServiceError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::EmptyUserId.into());
        }
        if !self.session.is_live(user_id).await {
            return Err(ValidationError::StaleSession(user_id.to_string()).into());
        }

        let local = self.local.get_all(user_id).await?;
        let remote = self.remote.list_entries(user_id).await?;

        // Match local entries against remote docs by value, consuming each
        // doc at most once so two same-instant entries are told apart even
        // when only one of them reached the remote.
        let mut unmatched: Vec<&FoodLogEntry> = remote.iter().collect();
        let mut per_instant: HashMap<OffsetDateTime, usize> = HashMap::new();
        let mut pushed = 0;
        let mut failed = 0;
        for entry in &local {
            let seq = per_instant.entry(entry.timestamp).or_insert(0);
            let key_seq = *seq;
            *seq += 1;

            if let Some(pos) = unmatched.iter().position(|r| *r == entry) {
                unmatched.swap_remove(pos);
                continue;
            }

            let base = entry
                .timestamp
                .format(&Rfc3339)
                .map_err(|_| ValidationError::UnrepresentableTimestamp)?;
            let key = suffixed_key(&base, key_seq);
            match self.remote.put_entry(user_id, &key, entry).await {
                Ok(()) => pushed += 1,
                Err(e) => {
                    warn!(error = %e, %user_id, %key, "resync write failed");
                    failed += 1;
                }
            }
        }

        Ok(ResyncReport {
            examined: local.len(),
            pushed,
            failed,
        })
    }

    async fn validate(&self, user_id: &str, entry: &FoodLogEntry) -> Result<(), ValidationError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        if !self.session.is_live(user_id).await {
            return Err(ValidationError::StaleSession(user_id.to_string()));
        }
        if entry.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let Some(q) = entry.quantity {
            if !q.is_finite() || q <= 0.0 {
                return Err(ValidationError::InvalidQuantity(q));
            }
        }
        Ok(())
    }
}

/// Remote document key for the `seq`-th entry a user logged at one instant:
/// the RFC 3339 timestamp, suffixed for every repeat so a later entry in
/// the same instant cannot overwrite an earlier one. `seq` is the entry's
/// position among same-instant entries in the local list, so every service
/// handle (and a restarted process) derives the same key.
fn suffixed_key(base: &str, seq: usize) -> String {
    if seq == 0 {
        base.to_string()
    } else {
        format!("{base}-{seq}")
    }
}
