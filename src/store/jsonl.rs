//! Append-only JSON lines opportunity store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{OpportunityStore, SeenIndex, StoredOpportunity};
use crate::types::Opportunity;
use crate::{JobscoutError, Result};

/// File-backed store: one [`StoredOpportunity`] JSON object per line.
///
/// The file is read once on [`open`](Self::open); saves append to it. Lines
/// that fail to parse are skipped with a warning.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    index: Mutex<SeenIndex>,
}

impl JsonlStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut index = SeenIndex::default();

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                for (lineno, line) in contents.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<StoredOpportunity>(line) {
                        Ok(record) => index.insert(&record),
                        Err(e) => warn!(
                            path = %path.display(),
                            line = lineno + 1,
                            error = %e,
                            "skipping malformed store record"
                        ),
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(JobscoutError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        }

        info!(path = %path.display(), records = index.len(), "opened opportunity store");
        Ok(Self {
            path,
            index: Mutex::new(index),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OpportunityStore for JsonlStore {
    async fn exists(&self, opportunity: &Opportunity) -> Result<bool> {
        Ok(self.index.lock().await.contains(opportunity))
    }

    async fn save(&self, opportunity: &Opportunity) -> Result<()> {
        let record = StoredOpportunity::from(opportunity);
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        // held across the write so concurrent saves append whole lines
        let mut index = self.index.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| JobscoutError::Storage(e.to_string()))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                JobscoutError::Storage(format!("failed to open {}: {e}", self.path.display()))
            })?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| JobscoutError::Storage(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| JobscoutError::Storage(e.to_string()))?;

        index.insert(&record);
        Ok(())
    }
}
