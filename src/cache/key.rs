//! Canonical invocation keys.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::Result;
use crate::types::Message;

/// Deterministic key for one logical agent request.
///
/// Built from the canonical message list serialized as JSON. Struct field
/// order fixes the serialization, so equal message lists always produce
/// equal keys regardless of how the original payload was shaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvocationKey(String);

#[derive(Serialize)]
struct CanonicalRequest<'a> {
    messages: &'a [Message],
}

impl InvocationKey {
    /// Key for a canonical message list.
    pub fn for_messages(messages: &[Message]) -> Result<Self> {
        let json = serde_json::to_string(&CanonicalRequest { messages })?;
        Ok(Self(json))
    }

    /// The full canonical form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hex digest for log correlation.
    pub fn digest(&self) -> String {
        Sha256::digest(self.0.as_bytes())
            .iter()
            .take(6)
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

impl fmt::Display for InvocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_deterministic() {
        let msgs = [Message::system("sys"), Message::user("hello")];
        let k1 = InvocationKey::for_messages(&msgs).unwrap();
        let k2 = InvocationKey::for_messages(&msgs.clone()).unwrap();
        assert_eq!(k1, k2);
        assert_eq!(k1.digest(), k2.digest());
    }

    #[test]
    fn key_differs_on_content() {
        let k1 = InvocationKey::for_messages(&[Message::user("a")]).unwrap();
        let k2 = InvocationKey::for_messages(&[Message::user("b")]).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn key_differs_on_role() {
        let k1 = InvocationKey::for_messages(&[Message::user("a")]).unwrap();
        let k2 = InvocationKey::for_messages(&[Message::system("a")]).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn canonical_form_is_stable_json() {
        let key = InvocationKey::for_messages(&[Message::system("s"), Message::user("u")]).unwrap();
        assert_eq!(
            key.as_str(),
            r#"{"messages":[{"role":"system","content":"s"},{"role":"user","content":"u"}]}"#
        );
        assert_eq!(key.digest().len(), 12);
    }
}
