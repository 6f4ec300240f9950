//! Job opportunity records extracted from agent output.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single job or training opportunity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, alias = "city", skip_serializing_if = "String::is_empty")]
    pub city_or_region: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language_level: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub visa_info: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub salary: String,
    #[serde(default, alias = "link")]
    pub official_link: String,
}

impl Opportunity {
    pub fn new(
        title: impl Into<String>,
        country: impl Into<String>,
        official_link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            country: country.into(),
            official_link: official_link.into(),
            ..Self::default()
        }
    }

    /// Content hash used for duplicate detection: SHA-256 of `"{title}-{country}"`.
    pub fn dedupe_hash(&self) -> String {
        let digest = Sha256::digest(format!("{}-{}", self.title, self.country).as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_hash_ignores_link() {
        let a = Opportunity::new("Nurse", "Canada", "https://a");
        let b = Opportunity::new("Nurse", "Canada", "https://b");
        assert_eq!(a.dedupe_hash(), b.dedupe_hash());
        assert_eq!(a.dedupe_hash().len(), 64);
    }

    #[test]
    fn dedupe_hash_differs_by_country() {
        let a = Opportunity::new("Nurse", "Canada", "");
        let b = Opportunity::new("Nurse", "Germany", "");
        assert_ne!(a.dedupe_hash(), b.dedupe_hash());
    }

    #[test]
    fn accepts_short_field_aliases() {
        let opp: Opportunity =
            serde_json::from_str(r#"{"title":"T","country":"C","city":"Berlin","link":"L"}"#)
                .unwrap();
        assert_eq!(opp.city_or_region, "Berlin");
        assert_eq!(opp.official_link, "L");
    }
}
