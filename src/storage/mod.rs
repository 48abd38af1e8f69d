//! Local persistence for collected data and rendered reports.
//!
//! One sled database with three trees: `releases`, `communications`, and
//! `reports`. Keys are big-endian millisecond timestamps (plus a
//! discriminating suffix where collisions are possible) so iteration order
//! is chronological; values are JSON.
//!
//! Durability note: no per-write flush. Sled's background flushing is
//! adequate here — on crash, at most the last cycle's writes are lost, and
//! every cycle regenerates its data.

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{FedCommunication, ReleaseObservation};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for release observations, Fed communications, and reports.
#[derive(Clone)]
pub struct MonitorStore {
    releases: sled::Tree,
    communications: sled::Tree,
    reports: sled::Tree,
}

/// A stored newsletter: the cycle date plus the rendered HTML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredReport {
    pub date: NaiveDate,
    pub html: String,
}

impl MonitorStore {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self {
            releases: db.open_tree("releases")?,
            communications: db.open_tree("communications")?,
            reports: db.open_tree("reports")?,
        })
    }

    // ------------------------------------------------------------------
    // Releases
    // ------------------------------------------------------------------

    /// Key: timestamp millis (big-endian) + indicator id, so simultaneous
    /// releases don't clobber each other and iteration stays chronological.
    pub fn store_release(&self, observation: &ReleaseObservation) -> Result<(), StorageError> {
        let mut key = observation
            .collected_at
            .timestamp_millis()
            .to_be_bytes()
            .to_vec();
        key.extend_from_slice(observation.indicator_id.as_bytes());
        let value = serde_json::to_vec(observation)?;
        self.releases.insert(key, value)?;
        Ok(())
    }

    /// The most recent `limit` observations for one indicator, newest first.
    pub fn recent_releases(
        &self,
        indicator_id: &str,
        limit: usize,
    ) -> Result<Vec<ReleaseObservation>, StorageError> {
        let mut out = Vec::with_capacity(limit);
        for entry in self.releases.iter().rev() {
            let (_, value) = entry?;
            let observation: ReleaseObservation = serde_json::from_slice(&value)?;
            if observation.indicator_id == indicator_id {
                out.push(observation);
                if out.len() == limit {
                    break;
                }
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Fed communications
    // ------------------------------------------------------------------

    /// Idempotent per URL: re-collecting the same item on consecutive days
    /// does not duplicate it.
    pub fn store_communication(&self, comm: &FedCommunication) -> Result<bool, StorageError> {
        let url_key = comm.url.as_bytes();
        if self.communications.contains_key(url_key)? {
            return Ok(false);
        }
        let value = serde_json::to_vec(comm)?;
        self.communications.insert(url_key, value)?;
        Ok(true)
    }

    /// All stored communications dated on or after `cutoff`, newest first.
    pub fn communications_since(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<FedCommunication>, StorageError> {
        let mut out = Vec::new();
        for entry in self.communications.iter() {
            let (_, value) = entry?;
            let comm: FedCommunication = serde_json::from_slice(&value)?;
            if comm.date >= cutoff {
                out.push(comm);
            }
        }
        out.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    pub fn store_report(&self, report: &StoredReport) -> Result<(), StorageError> {
        let key = report
            .date
            .format("%Y-%m-%d")
            .to_string()
            .into_bytes();
        let value = serde_json::to_vec(report)?;
        self.reports.insert(key, value)?;
        Ok(())
    }

    /// The most recent `limit` reports, newest first.
    pub fn recent_reports(&self, limit: usize) -> Result<Vec<StoredReport>, StorageError> {
        let mut out = Vec::with_capacity(limit);
        for entry in self.reports.iter().rev() {
            let (_, value) = entry?;
            out.push(serde_json::from_slice(&value)?);
            if out.len() == limit {
                break;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommunicationType;
    use chrono::{TimeZone, Utc};

    fn store() -> (MonitorStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = MonitorStore::open(dir.path().join("db")).unwrap();
        (store, dir)
    }

    fn observation(id: &str, value: f64, ts_millis: i64) -> ReleaseObservation {
        ReleaseObservation {
            indicator_id: id.to_string(),
            value,
            previous: None,
            expected: None,
            period: "2026-07".to_string(),
            source: "FRED".to_string(),
            collected_at: Utc.timestamp_millis_opt(ts_millis).unwrap(),
        }
    }

    #[test]
    fn releases_round_trip_newest_first() {
        let (store, _dir) = store();
        store.store_release(&observation("NFP", 140.0, 1_000)).unwrap();
        store.store_release(&observation("NFP", 150.0, 2_000)).unwrap();
        store.store_release(&observation("CPI", 3.1, 1_500)).unwrap();

        let nfp = store.recent_releases("NFP", 10).unwrap();
        assert_eq!(nfp.len(), 2);
        assert_eq!(nfp[0].value, 150.0);
        assert_eq!(nfp[1].value, 140.0);
    }

    #[test]
    fn release_limit_respected() {
        let (store, _dir) = store();
        for i in 0..5 {
            store
                .store_release(&observation("NFP", i as f64, 1_000 + i))
                .unwrap();
        }
        assert_eq!(store.recent_releases("NFP", 3).unwrap().len(), 3);
    }

    #[test]
    fn communications_dedupe_on_url() {
        let (store, _dir) = store();
        let comm = FedCommunication {
            title: "Speech".to_string(),
            speaker: "Jerome Powell".to_string(),
            url: "https://www.federalreserve.gov/a".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            kind: CommunicationType::Speech,
            summary: String::new(),
        };
        assert!(store.store_communication(&comm).unwrap());
        assert!(!store.store_communication(&comm).unwrap());
        let since = store
            .communications_since(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap())
            .unwrap();
        assert_eq!(since.len(), 1);
    }

    #[test]
    fn reports_round_trip() {
        let (store, _dir) = store();
        for day in [1, 2, 3] {
            store
                .store_report(&StoredReport {
                    date: NaiveDate::from_ymd_opt(2026, 8, day).unwrap(),
                    html: format!("<h1>day {day}</h1>"),
                })
                .unwrap();
        }
        let recent = store.recent_reports(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
    }
}
