use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StorageError;
use crate::log::dto::FoodLogEntry;

/// Device-local, advisory store of recently logged items. One row per user
/// holding the whole list as JSON; every append is a read-modify-write of
/// that row. Whole-list granularity bounds write throughput, which is fine
/// at human food-logging pace.
///
/// Clones share the per-user append locks, so any number of handles over
/// the same store can append concurrently without losing an update.
#[derive(Clone)]
pub struct LocalRecentStore {
    pool: SqlitePool,
    cap: Option<usize>,
    gates: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl LocalRecentStore {
    pub fn new(pool: SqlitePool, cap: Option<usize>) -> Self {
        Self {
            pool,
            cap,
            gates: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Append one entry to the user's list, returning how many entries with
    /// the same timestamp were already present. The read-modify-write runs
    /// under a per-user lock shared across clones of this store, so two
    /// concurrent appends for one user cannot clobber each other's base
    /// list. When a retention cap is set the oldest entries are dropped.
    pub async fn append(&self, user_id: &str, entry: &FoodLogEntry) -> Result<usize, StorageError> {
        let gate = {
            let mut gates = self.gates.lock().await;
            gates
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let result = {
            let _guard = gate.lock().await;
            self.append_locked(user_id, entry).await
        };

        drop(gate);
        self.evict_idle_gate(user_id).await;
        result
    }

    async fn append_locked(
        &self,
        user_id: &str,
        entry: &FoodLogEntry,
    ) -> Result<usize, StorageError> {
        let mut items = self.get_all(user_id).await?;
        let prior_same_instant = items
            .iter()
            .filter(|e| e.timestamp == entry.timestamp)
            .count();
        items.push(entry.clone());
        if let Some(cap) = self.cap {
            if items.len() > cap {
                let excess = items.len() - cap;
                items.drain(..excess);
                debug!(%user_id, dropped = excess, "recent items cap reached");
            }
        }

        let payload = serde_json::to_string(&items)?;
        sqlx::query(
            r#"
            INSERT INTO recent_items (user_id, payload)
            VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE
            SET payload = excluded.payload, updated_at = datetime('now')
            "#,
        )
        .bind(user_id)
        .bind(&payload)
        .execute(&self.pool)
        .await?;

        Ok(prior_same_instant)
    }

    // A gate held only by the map has no waiters; dropping it keeps the map
    // from accumulating one entry per user id ever seen. The map lock is
    // held across the check, so no new waiter can appear mid-eviction.
    async fn evict_idle_gate(&self, user_id: &str) {
        let mut gates = self.gates.lock().await;
        if let Some(gate) = gates.get(user_id) {
            if Arc::strong_count(gate) == 1 {
                gates.remove(user_id);
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn gate_count(&self) -> usize {
        self.gates.lock().await.len()
    }

    /// The persisted list in append order; empty when the user has no row.
    pub async fn get_all(&self, user_id: &str) -> Result<Vec<FoodLogEntry>, StorageError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM recent_items WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((payload,)) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }
}
