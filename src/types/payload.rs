//! Invocation payloads and attached search context.
//!
//! A [`Payload`] is what callers hand to
//! [`AgentGateway::invoke`](crate::AgentGateway::invoke). It comes in three
//! shapes, each with its own normalization rule:
//!
//! - [`Payload::RawText`]: passed through unchanged.
//! - [`Payload::Structured`]: the first non-empty of `input`, `query`,
//!   `message`.
//! - [`Payload::MessageList`]: non-empty message contents joined by `\n`.
//!
//! Untyped JSON is accepted through [`Payload::from_json`], which rejects
//! anything that matches none of these shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::Message;
use crate::{JobscoutError, Result};

/// One search hit.
///
/// Accepts both the condensed field names (`link`, `snippet`) and the raw
/// search API names (`url`, `content`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, alias = "url", skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(default, alias = "content", skip_serializing_if = "String::is_empty")]
    pub snippet: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }

    /// True when every field is empty.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.link.is_empty() && self.snippet.is_empty()
    }
}

/// One entry of a search context list.
///
/// Objects are read as [`SearchResult`]s, strings as free text. Anything else
/// is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextItem {
    Result(SearchResult),
    Text(String),
    Other(Value),
}

impl From<SearchResult> for ContextItem {
    fn from(result: SearchResult) -> Self {
        ContextItem::Result(result)
    }
}

/// Auxiliary context attached to a payload, usually search results.
///
/// Lists are summarized item by item; a bare string or any other JSON value
/// is passed to the agent as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchContext {
    Items(Vec<ContextItem>),
    Text(String),
    Other(Value),
}

impl SearchContext {
    /// Context made of search hits only.
    pub fn results(results: impl IntoIterator<Item = SearchResult>) -> Self {
        SearchContext::Items(results.into_iter().map(ContextItem::Result).collect())
    }

    /// Number of items (a bare text or value counts as one unless empty).
    pub fn len(&self) -> usize {
        match self {
            SearchContext::Items(items) => items.len(),
            SearchContext::Text(text) if text.is_empty() => 0,
            SearchContext::Text(_) => 1,
            SearchContext::Other(Value::Null) => 0,
            SearchContext::Other(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the context as prompt text.
    ///
    /// Lists and other values render as compact JSON, text renders verbatim.
    pub fn render(&self) -> String {
        match self {
            SearchContext::Items(items) => serde_json::to_string(items).unwrap_or_default(),
            SearchContext::Text(text) => text.clone(),
            SearchContext::Other(value) => value.to_string(),
        }
    }
}

impl From<Vec<SearchResult>> for SearchContext {
    fn from(results: Vec<SearchResult>) -> Self {
        SearchContext::results(results)
    }
}

/// Keyed request: `input`, `query` or `message`, plus optional context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, alias = "search_results", skip_serializing_if = "Option::is_none")]
    pub search_context: Option<SearchContext>,
}

impl StructuredRequest {
    /// Request carrying only `input`.
    pub fn input(text: impl Into<String>) -> Self {
        Self {
            input: Some(text.into()),
            ..Self::default()
        }
    }

    /// Attach search context.
    pub fn with_search_context(mut self, context: SearchContext) -> Self {
        self.search_context = Some(context);
        self
    }

    fn text(&self) -> String {
        [&self.input, &self.query, &self.message]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_default()
    }

    fn has_text_field(&self) -> bool {
        self.input.is_some() || self.query.is_some() || self.message.is_some()
    }
}

/// A list of role-tagged messages, plus optional context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageList {
    pub messages: Vec<Message>,
    #[serde(default, alias = "search_results", skip_serializing_if = "Option::is_none")]
    pub search_context: Option<SearchContext>,
}

impl MessageList {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            search_context: None,
        }
    }

    fn text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Request payload accepted by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    RawText(String),
    Structured(StructuredRequest),
    MessageList(MessageList),
}

impl Payload {
    /// Plain text payload.
    pub fn text(text: impl Into<String>) -> Self {
        Payload::RawText(text.into())
    }

    /// Parse an untyped JSON payload.
    ///
    /// Strings become [`Payload::RawText`]. Objects become
    /// [`Payload::Structured`] when any of `input`/`query`/`message` carries
    /// text, otherwise [`Payload::MessageList`] when `messages` is present,
    /// otherwise [`Payload::Structured`] when one of the keyed fields is
    /// present but empty. Everything else is `InvalidPayload`.
    pub fn from_json(value: Value) -> Result<Self> {
        let map = match value {
            Value::String(text) => return Ok(Payload::RawText(text)),
            Value::Object(map) => map,
            other => {
                return Err(JobscoutError::InvalidPayload(format!(
                    "expected a string or an object, got {}",
                    json_kind(&other)
                )));
            }
        };

        let has_messages = map.contains_key("messages");
        let value = Value::Object(map);

        let structured: StructuredRequest = serde_json::from_value(value.clone())
            .map_err(|e| JobscoutError::InvalidPayload(e.to_string()))?;

        if !structured.text().is_empty() {
            return Ok(Payload::Structured(structured));
        }
        if has_messages {
            let list: MessageList = serde_json::from_value(value)
                .map_err(|e| JobscoutError::InvalidPayload(e.to_string()))?;
            return Ok(Payload::MessageList(list));
        }
        if structured.has_text_field() {
            return Ok(Payload::Structured(structured));
        }

        Err(JobscoutError::InvalidPayload(
            "payload has no input, query, message or messages field".to_string(),
        ))
    }

    /// The payload's text before any search context is appended.
    pub fn normalized_text(&self) -> String {
        match self {
            Payload::RawText(text) => text.clone(),
            Payload::Structured(req) => req.text(),
            Payload::MessageList(list) => list.text(),
        }
    }

    /// Attached search context, if any.
    pub fn search_context(&self) -> Option<&SearchContext> {
        match self {
            Payload::RawText(_) => None,
            Payload::Structured(req) => req.search_context.as_ref(),
            Payload::MessageList(list) => list.search_context.as_ref(),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::RawText(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::RawText(text)
    }
}

impl From<StructuredRequest> for Payload {
    fn from(req: StructuredRequest) -> Self {
        Payload::Structured(req)
    }
}

impl From<MessageList> for Payload {
    fn from(list: MessageList) -> Self {
        Payload::MessageList(list)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_takes_first_non_empty_field() {
        let payload = Payload::from_json(json!({"input": "", "query": "q", "message": "m"})).unwrap();
        assert_eq!(payload.normalized_text(), "q");
    }

    #[test]
    fn messages_used_when_keyed_fields_empty() {
        let payload = Payload::from_json(json!({
            "input": "",
            "messages": [
                {"role": "system", "content": "a"},
                {"role": "user", "content": ""},
                {"role": "user", "content": "b"}
            ]
        }))
        .unwrap();
        assert!(matches!(payload, Payload::MessageList(_)));
        assert_eq!(payload.normalized_text(), "a\nb");
    }

    #[test]
    fn empty_keyed_field_is_tolerated() {
        let payload = Payload::from_json(json!({"input": ""})).unwrap();
        assert_eq!(payload.normalized_text(), "");
    }

    #[test]
    fn unrecognized_shapes_rejected() {
        assert!(matches!(
            Payload::from_json(json!(42)),
            Err(JobscoutError::InvalidPayload(_))
        ));
        assert!(matches!(
            Payload::from_json(json!({"foo": "bar"})),
            Err(JobscoutError::InvalidPayload(_))
        ));
        assert!(matches!(
            Payload::from_json(json!({"input": 7})),
            Err(JobscoutError::InvalidPayload(_))
        ));
    }

    #[test]
    fn search_results_alias_accepted() {
        let payload = Payload::from_json(json!({
            "input": "find jobs",
            "search_results": [{"title": "T", "url": "https://x", "content": "C"}]
        }))
        .unwrap();
        let ctx = payload.search_context().unwrap();
        assert_eq!(
            ctx,
            &SearchContext::results([SearchResult::new("T", "https://x", "C")])
        );
    }

    #[test]
    fn mixed_context_lists_accepted() {
        let payload = Payload::from_json(json!({
            "input": "find jobs",
            "search_context": [
                {"title": "T", "url": "https://x"},
                "a note about Ausbildung",
                7
            ]
        }))
        .unwrap();
        let ctx = payload.search_context().unwrap();
        assert_eq!(
            ctx,
            &SearchContext::Items(vec![
                ContextItem::Result(SearchResult::new("T", "https://x", "")),
                ContextItem::Text("a note about Ausbildung".to_string()),
                ContextItem::Other(json!(7)),
            ])
        );
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn non_list_context_kept_as_value() {
        let payload = Payload::from_json(json!({
            "input": "find jobs",
            "search_context": {"answer": "none"}
        }))
        .unwrap();
        let ctx = payload.search_context().unwrap();
        assert_eq!(ctx, &SearchContext::Other(json!({"answer": "none"})));
        assert_eq!(ctx.render(), r#"{"answer":"none"}"#);
    }

    #[test]
    fn text_context_counts_as_one_item() {
        assert_eq!(SearchContext::Text("abc".into()).len(), 1);
        assert!(SearchContext::Text(String::new()).is_empty());
    }
}
