use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Where an entry came from. Barcode entries keep the decoded payload as an
/// opaque string; product lookup happens elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntrySource {
    Manual,
    Barcode { payload: String },
}

/// One user-submitted food-logging record. Created once at submission time,
/// immutable afterwards; the timestamp doubles as the remote storage key and
/// the recency sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodLogEntry {
    pub name: String,
    pub quantity: Option<f64>,
    pub serving_size: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub source: EntrySource,
}

impl FoodLogEntry {
    /// Entry typed in by hand, stamped with the current instant.
    pub fn manual(
        name: impl Into<String>,
        quantity: Option<f64>,
        serving_size: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            serving_size: serving_size.into(),
            timestamp: OffsetDateTime::now_utc(),
            source: EntrySource::Manual,
        }
    }

    /// Entry originating from a scanned barcode.
    pub fn barcode(
        name: impl Into<String>,
        quantity: Option<f64>,
        serving_size: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            serving_size: serving_size.into(),
            timestamp: OffsetDateTime::now_utc(),
            source: EntrySource::Barcode {
                payload: payload.into(),
            },
        }
    }
}

/// Outcome of a single `log_item` call. Both writes are attempted; either
/// may fail without aborting the other, and this is the only channel that
/// reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogResult {
    pub local_write_ok: bool,
    pub remote_write_ok: bool,
}

impl LogResult {
    pub fn fully_persisted(&self) -> bool {
        self.local_write_ok && self.remote_write_ok
    }

    /// Cached on the device but not (yet) durable remotely.
    pub fn local_only(&self) -> bool {
        self.local_write_ok && !self.remote_write_ok
    }
}

/// Summary of one reconciliation pass against the remote log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncReport {
    /// Entries present in the local cache.
    pub examined: usize,
    /// Entries re-written to the remote log this pass.
    pub pushed: usize,
    /// Entries that still failed to write.
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn entry_serializes_with_camel_case_and_rfc3339() {
        let entry = FoodLogEntry {
            name: "Apple".into(),
            quantity: Some(1.0),
            serving_size: "1 medium".into(),
            timestamp: datetime!(2024-08-01 12:30:00 UTC),
            source: EntrySource::Manual,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "Apple");
        assert_eq!(json["servingSize"], "1 medium");
        assert_eq!(json["timestamp"], "2024-08-01T12:30:00Z");
        assert_eq!(json["source"]["kind"], "manual");
    }

    #[test]
    fn barcode_source_roundtrips_payload() {
        let entry = FoodLogEntry::barcode("Granola Bar", Some(2.0), "1 bar", "4006381333931");
        let json = serde_json::to_string(&entry).unwrap();
        let back: FoodLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.source,
            EntrySource::Barcode {
                payload: "4006381333931".into()
            }
        );
    }

    #[test]
    fn log_result_states() {
        let full = LogResult {
            local_write_ok: true,
            remote_write_ok: true,
        };
        let partial = LogResult {
            local_write_ok: true,
            remote_write_ok: false,
        };
        assert!(full.fully_persisted());
        assert!(!full.local_only());
        assert!(partial.local_only());
        assert!(!partial.fully_persisted());
    }
}
