//! Persistence of seen opportunities, used to skip duplicates across runs.
//!
//! An opportunity counts as already seen when a stored record has the same
//! (non-empty) official link, or the same [`dedupe_hash`](Opportunity::dedupe_hash).

mod jsonl;
mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::Opportunity;

/// Read/write contract for the opportunity store.
#[async_trait]
pub trait OpportunityStore: Send + Sync {
    /// Whether a matching opportunity was saved before.
    async fn exists(&self, opportunity: &Opportunity) -> Result<bool>;

    /// Save an opportunity together with its dedupe hash.
    async fn save(&self, opportunity: &Opportunity) -> Result<()>;
}

/// Stored form of an opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOpportunity {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub hash: String,
}

impl From<&Opportunity> for StoredOpportunity {
    fn from(opportunity: &Opportunity) -> Self {
        Self {
            hash: opportunity.dedupe_hash(),
            opportunity: opportunity.clone(),
        }
    }
}

/// Link and hash lookup shared by the store implementations.
#[derive(Debug, Default)]
pub(crate) struct SeenIndex {
    links: std::collections::HashSet<String>,
    hashes: std::collections::HashSet<String>,
}

impl SeenIndex {
    pub(crate) fn contains(&self, opportunity: &Opportunity) -> bool {
        (!opportunity.official_link.is_empty() && self.links.contains(&opportunity.official_link))
            || self.hashes.contains(&opportunity.dedupe_hash())
    }

    pub(crate) fn insert(&mut self, record: &StoredOpportunity) {
        if !record.opportunity.official_link.is_empty() {
            self.links.insert(record.opportunity.official_link.clone());
        }
        self.hashes.insert(record.hash.clone());
    }

    pub(crate) fn len(&self) -> usize {
        self.hashes.len()
    }
}
