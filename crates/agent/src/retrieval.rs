//! Retrieval gateway: turns a knowledge base search into study material.
//!
//! Service failures are absorbed here. The caller only ever sees
//! [`RetrievedMaterial::NoMaterial`]; the root cause goes to the log.

use companion_config::RetrievalConfig;
use companion_core::error::RetrievalError;
use companion_core::knowledge::{KnowledgeBase, RetrieveRequest};
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_NUMBER_OF_RESULTS: u32 = 5;

/// Outcome of a retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievedMaterial {
    /// Non-empty passages joined by blank lines, in service order. May be
    /// empty when every returned passage was blank.
    Found(String),
    /// Zero results, or the service failed.
    NoMaterial,
}

impl RetrievedMaterial {
    /// The material text, if it has any content.
    pub fn text(&self) -> Option<&str> {
        match self {
            RetrievedMaterial::Found(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

pub struct RetrievalGateway {
    knowledge_base: Arc<dyn KnowledgeBase>,
    number_of_results: u32,
}

impl RetrievalGateway {
    pub fn new(knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            knowledge_base,
            number_of_results: DEFAULT_NUMBER_OF_RESULTS,
        }
    }

    pub fn from_config(knowledge_base: Arc<dyn KnowledgeBase>, config: &RetrievalConfig) -> Self {
        Self {
            knowledge_base,
            number_of_results: config.number_of_results,
        }
    }

    pub async fn retrieve(&self, query: &str) -> RetrievedMaterial {
        let request = RetrieveRequest {
            query: query.to_string(),
            number_of_results: self.number_of_results,
        };

        let results = match self.knowledge_base.retrieve(request).await {
            Ok(results) => results,
            Err(e) => {
                warn!(
                    knowledge_base = self.knowledge_base.name(),
                    error = %e,
                    "Knowledge base retrieval failed; treating as no material"
                );
                return RetrievedMaterial::NoMaterial;
            }
        };

        debug!(count = results.len(), results = ?results, "Retrieval results");

        if results.is_empty() {
            return RetrievedMaterial::NoMaterial;
        }

        let combined = results
            .iter()
            .filter_map(|r| r.passage())
            .collect::<Vec<_>>()
            .join("\n\n");

        RetrievedMaterial::Found(combined.trim().to_string())
    }

    /// Raw diagnostic query. Errors are returned, not absorbed.
    pub async fn probe(&self, query: &str) -> Result<serde_json::Value, RetrievalError> {
        self.knowledge_base.probe(query).await
    }
}
