//! Knowledge base client for the Bedrock Agent Runtime `Retrieve` operation.

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::Client;
use aws_sdk_bedrockagentruntime::error::DisplayErrorContext;
use aws_sdk_bedrockagentruntime::operation::retrieve::RetrieveOutput;
use aws_sdk_bedrockagentruntime::types::{
    KnowledgeBaseQuery, KnowledgeBaseRetrievalConfiguration, KnowledgeBaseRetrievalResult,
    KnowledgeBaseVectorSearchConfiguration, RetrievalResultContent, RetrievalResultLocation,
    RetrievalResultLocationType,
};
use companion_core::error::RetrievalError;
use companion_core::knowledge::*;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::sdk;

pub struct BedrockKnowledgeBase {
    name: String,
    knowledge_base_id: String,
    client: Client,
}

impl BedrockKnowledgeBase {
    pub fn new(client: Client, knowledge_base_id: impl Into<String>) -> Self {
        Self {
            name: "bedrock-knowledge-base".into(),
            knowledge_base_id: knowledge_base_id.into(),
            client,
        }
    }

    /// Run one `Retrieve` call. Without `number_of_results` the service
    /// applies its own retrieval configuration.
    async fn send(
        &self,
        query: &str,
        number_of_results: Option<u32>,
    ) -> Result<RetrieveOutput, RetrievalError> {
        let retrieval_query = KnowledgeBaseQuery::builder()
            .text(query)
            .build()
            .map_err(|e| RetrievalError::Malformed(e.to_string()))?;

        let mut call = self
            .client
            .retrieve()
            .knowledge_base_id(&self.knowledge_base_id)
            .retrieval_query(retrieval_query);

        if let Some(limit) = number_of_results {
            let vector_search = KnowledgeBaseVectorSearchConfiguration::builder()
                .number_of_results(i32::try_from(limit).unwrap_or(i32::MAX))
                .build();
            let configuration = KnowledgeBaseRetrievalConfiguration::builder()
                .vector_search_configuration(vector_search)
                .build();
            call = call.retrieval_configuration(configuration);
        }

        call.send().await.map_err(|e| {
            warn!(error = %DisplayErrorContext(&e), "Knowledge base request failed");
            RetrievalError::from(sdk::classify(&e))
        })
    }
}

/// Convert an SDK hit into the service's wire shape.
fn retrieval_result(hit: &KnowledgeBaseRetrievalResult) -> RetrievalResult {
    let content: Option<&RetrievalResultContent> = hit.content().into();
    let location: Option<&RetrievalResultLocation> = hit.location().into();

    RetrievalResult {
        content: content.map(|c| {
            let text: Option<&str> = c.text().into();
            RetrievalContent {
                text: text.map(str::to_string),
            }
        }),
        score: hit.score().into(),
        location: location.map(location_json),
    }
}

fn location_json(location: &RetrievalResultLocation) -> Value {
    let kind: Option<&RetrievalResultLocationType> = location.r#type().into();
    let mut value = Map::new();
    if let Some(kind) = kind {
        value.insert("type".into(), kind.as_str().into());
    }
    if let Some(uri) = location.s3_location().and_then(|s3| s3.uri()) {
        value.insert("s3Location".into(), json!({ "uri": uri }));
    }
    if let Some(url) = location.web_location().and_then(|web| web.url()) {
        value.insert("webLocation".into(), json!({ "url": url }));
    }
    Value::Object(value)
}

#[async_trait]
impl KnowledgeBase for BedrockKnowledgeBase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(
        &self,
        request: RetrieveRequest,
    ) -> std::result::Result<Vec<RetrievalResult>, RetrievalError> {
        debug!(
            knowledge_base_id = %self.knowledge_base_id,
            number_of_results = request.number_of_results,
            "Retrieving from knowledge base"
        );

        let output = self
            .send(&request.query, Some(request.number_of_results))
            .await?;
        Ok(output
            .retrieval_results()
            .iter()
            .map(retrieval_result)
            .collect())
    }

    async fn probe(&self, query: &str) -> std::result::Result<Value, RetrievalError> {
        debug!(knowledge_base_id = %self.knowledge_base_id, query, "Probing knowledge base");
        let output = self.send(query, None).await?;

        let results: Vec<RetrievalResult> = output
            .retrieval_results()
            .iter()
            .map(retrieval_result)
            .collect();

        let mut body = Map::new();
        body.insert(
            "retrievalResults".into(),
            serde_json::to_value(results).map_err(|e| RetrievalError::Malformed(e.to_string()))?,
        );
        if let Some(token) = output.next_token() {
            body.insert("nextToken".into(), token.into());
        }
        Ok(Value::Object(body))
    }
}
