//! Knowledge base trait: the abstraction over the remote document search.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A ranked search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub query: String,

    /// Upper bound on the number of results the service should return.
    pub number_of_results: u32,
}

/// A single search hit, in the service's wire shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<RetrievalContent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Source location as reported by the service (S3 URI, web URL, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl RetrievalResult {
    /// Convenience constructor for a text-only hit.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Some(RetrievalContent {
                text: Some(text.into()),
            }),
            score: None,
            location: None,
        }
    }

    /// The passage text, or `None` when absent or empty.
    pub fn passage(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|c| c.text.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// The remote knowledge-base search service.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    fn name(&self) -> &str;

    /// Ranked results, most relevant first.
    async fn retrieve(
        &self,
        request: RetrieveRequest,
    ) -> std::result::Result<Vec<RetrievalResult>, RetrievalError>;

    /// Diagnostic call: run `query` with the service defaults and return the
    /// response body untouched.
    async fn probe(&self, query: &str) -> std::result::Result<serde_json::Value, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passage_skips_missing_and_empty_text() {
        assert_eq!(RetrievalResult::text("EC2").passage(), Some("EC2"));
        assert_eq!(RetrievalResult::text("").passage(), None);
        assert_eq!(RetrievalResult::default().passage(), None);

        let no_text = RetrievalResult {
            content: Some(RetrievalContent { text: None }),
            ..Default::default()
        };
        assert_eq!(no_text.passage(), None);
    }

    #[test]
    fn parses_wire_shape() {
        let result: RetrievalResult = serde_json::from_value(serde_json::json!({
            "content": { "text": "S3 stores objects.", "type": "TEXT" },
            "location": { "type": "S3", "s3Location": { "uri": "s3://bucket/doc.pdf" } },
            "score": 0.71
        }))
        .unwrap();

        assert_eq!(result.passage(), Some("S3 stores objects."));
        assert_eq!(result.score, Some(0.71));
        assert_eq!(result.location.unwrap()["type"], "S3");
    }
}
