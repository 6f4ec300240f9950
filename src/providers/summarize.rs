//! Truncation-based search context summarizer.

use super::traits::Summarizer;
use crate::types::{ContextItem, SearchContext, SearchResult};

/// Shrinks search context lists by truncating long text.
///
/// - Results keep `title`, `link` and `snippet`; a snippet longer than
///   `snippet_threshold` chars is cut to `snippet_len` chars plus `...`.
///   Results with no fields left are dropped.
/// - Text items longer than `text_threshold` chars are cut to `text_len`
///   chars plus `...`.
///
/// Context that is not a list is returned unchanged.
#[derive(Debug, Clone)]
pub struct TruncatingSummarizer {
    snippet_threshold: usize,
    snippet_len: usize,
    text_threshold: usize,
    text_len: usize,
}

impl Default for TruncatingSummarizer {
    fn default() -> Self {
        Self {
            snippet_threshold: 100,
            snippet_len: 150,
            text_threshold: 500,
            text_len: 200,
        }
    }
}

impl TruncatingSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snippet length (in chars) kept after truncation.
    pub fn snippet_len(mut self, len: usize) -> Self {
        self.snippet_len = len;
        self
    }

    /// Set the text length (in chars) kept after truncation.
    pub fn text_len(mut self, len: usize) -> Self {
        self.text_len = len;
        self
    }

    fn condense_result(&self, result: &SearchResult) -> SearchResult {
        let snippet = if result.snippet.chars().count() > self.snippet_threshold {
            truncate(&result.snippet, self.snippet_len)
        } else {
            result.snippet.clone()
        };
        SearchResult {
            title: result.title.clone(),
            link: result.link.clone(),
            snippet,
        }
    }
}

impl Summarizer for TruncatingSummarizer {
    fn condense(&self, context: &SearchContext) -> SearchContext {
        let SearchContext::Items(items) = context else {
            return context.clone();
        };
        SearchContext::Items(
            items
                .iter()
                .filter_map(|item| match item {
                    ContextItem::Result(r) => {
                        let r = self.condense_result(r);
                        (!r.is_blank()).then_some(ContextItem::Result(r))
                    }
                    ContextItem::Text(text) if text.chars().count() > self.text_threshold => {
                        Some(ContextItem::Text(truncate(text, self.text_len)))
                    }
                    other => Some(other.clone()),
                })
                .collect(),
        )
    }
}

/// Keep the first `max_chars` chars, appending `...` if anything was cut.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(out: SearchContext) -> Vec<SearchResult> {
        let SearchContext::Items(items) = out else {
            panic!("expected a list");
        };
        items
            .into_iter()
            .map(|item| match item {
                ContextItem::Result(r) => r,
                other => panic!("unexpected item {other:?}"),
            })
            .collect()
    }

    #[test]
    fn short_snippets_untouched() {
        let input = SearchContext::results([SearchResult::new("t", "l", "short")]);
        assert_eq!(TruncatingSummarizer::new().condense(&input), input);
    }

    #[test]
    fn long_snippets_truncated() {
        let long = "x".repeat(400);
        let input = SearchContext::results([SearchResult::new("t", "l", long)]);
        let out = results(TruncatingSummarizer::new().condense(&input));
        assert_eq!(out[0].snippet.len(), 153);
        assert!(out[0].snippet.ends_with("..."));
    }

    #[test]
    fn snippet_between_thresholds_is_kept() {
        let mid = "y".repeat(120);
        let input = SearchContext::results([SearchResult::new("t", "l", mid.clone())]);
        let out = results(TruncatingSummarizer::new().condense(&input));
        assert_eq!(out[0].snippet, mid);
    }

    #[test]
    fn blank_results_dropped() {
        let input = SearchContext::results([SearchResult::default(), SearchResult::new("t", "", "")]);
        assert_eq!(TruncatingSummarizer::new().condense(&input).len(), 1);
    }

    #[test]
    fn long_text_items_truncated_on_char_boundary() {
        let input = SearchContext::Items(vec![
            ContextItem::Text("é".repeat(600)),
            ContextItem::Text("short note".to_string()),
            ContextItem::Result(SearchResult::new("t", "l", "s")),
        ]);
        let SearchContext::Items(out) = TruncatingSummarizer::new().condense(&input) else {
            panic!("expected a list");
        };
        assert_eq!(out.len(), 3);
        let ContextItem::Text(first) = &out[0] else {
            panic!("expected text");
        };
        assert_eq!(first.chars().count(), 203);
        assert_eq!(out[1], ContextItem::Text("short note".to_string()));
    }

    #[test]
    fn non_list_context_passes_through() {
        let text = SearchContext::Text("z".repeat(900));
        assert_eq!(TruncatingSummarizer::new().condense(&text), text);

        let value = SearchContext::Other(serde_json::json!({"answer": "none"}));
        assert_eq!(TruncatingSummarizer::new().condense(&value), value);
    }
}
