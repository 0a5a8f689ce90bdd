//! Remote service clients for the Student Companion.
//!
//! Both clients speak the Bedrock Agent Runtime API through the AWS SDK: the
//! agent runtime implements `companion_core::AgentRuntime`, the knowledge base
//! implements `companion_core::KnowledgeBase`. [`build_from_config`] wires them
//! from the loaded configuration.

pub mod bedrock_agent;
pub mod knowledge_base;
pub mod sdk;

pub use bedrock_agent::BedrockAgentRuntime;
pub use knowledge_base::BedrockKnowledgeBase;

use aws_config::SdkConfig;
use aws_sdk_bedrockagentruntime::Client;
use companion_config::{AppConfig, BedrockConfig};
use companion_core::{AgentRuntime, Error, KnowledgeBase};
use std::sync::Arc;
use tracing::info;

/// The two remote collaborators, ready to share across requests.
#[derive(Clone)]
pub struct Backends {
    pub runtime: Arc<dyn AgentRuntime>,
    pub knowledge_base: Arc<dyn KnowledgeBase>,
}

fn check_ids(bedrock: &BedrockConfig) -> Result<(), Error> {
    let missing = bedrock.missing_fields();
    if missing.is_empty() {
        return Ok(());
    }
    Err(Error::Config {
        message: format!(
            "missing {} (set them in config.toml or the environment)",
            missing.join(", ")
        ),
    })
}

/// Build both clients from configuration, resolving credentials from the
/// configured profile.
///
/// Fails when any agent or knowledge-base identifier is missing.
pub async fn build_from_config(config: &AppConfig) -> Result<Backends, Error> {
    check_ids(&config.bedrock)?;
    let sdk_config = sdk::load_sdk_config(&config.bedrock).await;
    build_from_sdk_config(config, &sdk_config)
}

/// Build both clients on an already loaded SDK configuration.
pub fn build_from_sdk_config(config: &AppConfig, sdk_config: &SdkConfig) -> Result<Backends, Error> {
    let bedrock = &config.bedrock;
    check_ids(bedrock)?;

    info!(
        endpoint = %bedrock.endpoint_url(),
        region = %bedrock.region,
        profile = %bedrock.profile,
        agent_id = %bedrock.agent_id,
        knowledge_base_id = %bedrock.knowledge_base_id,
        "Configured remote backends"
    );

    let client = Client::new(sdk_config);
    let runtime = BedrockAgentRuntime::new(
        client.clone(),
        &bedrock.agent_id,
        &bedrock.agent_alias_id,
    );
    let knowledge_base = BedrockKnowledgeBase::new(client, &bedrock.knowledge_base_id);

    Ok(Backends {
        runtime: Arc::new(runtime),
        knowledge_base: Arc::new(knowledge_base),
    })
}
