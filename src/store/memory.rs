//! In-memory opportunity store.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{OpportunityStore, SeenIndex, StoredOpportunity};
use crate::Result;
use crate::types::Opportunity;

/// Store that forgets everything on restart. Used when no store path is
/// configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<(SeenIndex, Vec<StoredOpportunity>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, in save order.
    pub fn records(&self) -> Vec<StoredOpportunity> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .1
            .clone()
    }
}

#[async_trait]
impl OpportunityStore for MemoryStore {
    async fn exists(&self, opportunity: &Opportunity) -> Result<bool> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.0.contains(opportunity))
    }

    async fn save(&self, opportunity: &Opportunity) -> Result<()> {
        let record = StoredOpportunity::from(opportunity);
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.0.insert(&record);
        inner.1.push(record);
        Ok(())
    }
}
