//! Donation ledger persisted as a JSON file
//!
//! All read-modify-write cycles go through `LedgerStore::record`, which holds
//! an async mutex for the whole cycle. Saves land in a sibling temp file that
//! is renamed over the ledger, so readers see either the old or the new file.
//! A ledger that exists but cannot be read is never overwritten.

use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Donation {
    #[serde(default)]
    pub(crate) from: String,
    #[serde(default)]
    pub(crate) amount: f64,
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Ledger {
    #[serde(default)]
    pub(crate) total: f64,
    #[serde(default)]
    pub(crate) donations: Vec<Donation>,
}

/// Round to cents
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Ledger {
    /// Add a donation to the total and history, keeping only the newest `cap` entries
    pub(crate) fn record(&mut self, donation: Donation, cap: usize) {
        self.total = round2(self.total + donation.amount);
        self.donations.push(donation);
        if self.donations.len() > cap {
            let excess = self.donations.len() - cap;
            self.donations.drain(..excess);
        }
    }
}

pub(crate) struct LedgerStore {
    path: PathBuf,
    max_donations: usize,
    lock: Mutex<()>,
}

impl LedgerStore {
    pub(crate) fn new(path: impl Into<PathBuf>, max_donations: usize) -> Self {
        Self {
            path: path.into(),
            max_donations,
            lock: Mutex::new(()),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Current ledger. Only a missing file reads as empty; a file that cannot
    /// be read or parsed is an error so that it is left in place.
    pub(crate) async fn load(&self) -> io::Result<Ledger> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Ledger::default()),
            Err(err) => {
                log::error!("could not read ledger {}: {err}", self.path.display());
                return Err(err);
            }
        };
        serde_json::from_str(&raw).map_err(|err| {
            log::error!("ledger {} is not valid: {err}", self.path.display());
            io::Error::new(io::ErrorKind::InvalidData, err)
        })
    }

    /// Append a donation and persist. Returns the updated ledger.
    pub(crate) async fn record(&self, donation: Donation) -> io::Result<Ledger> {
        let _guard = self.lock.lock().await;
        let mut ledger = self.load().await?;
        ledger.record(donation, self.max_donations);
        self.save(&ledger).await?;
        Ok(ledger)
    }

    async fn save(&self, ledger: &Ledger) -> io::Result<()> {
        let json = serde_json::to_string_pretty(ledger).map_err(io::Error::other)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err);
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
