//! AWS SDK plumbing shared by both clients.
//!
//! Credentials come from the standard provider chain with the configured
//! profile selected, so every request is SigV4-signed the same way the AWS
//! CLI would sign it. Retries are disabled: a failed call fails the action.

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};
use aws_sdk_bedrockagentruntime::config::http::HttpResponse;
use aws_sdk_bedrockagentruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use companion_config::BedrockConfig;
use companion_core::error::{GenerationError, RetrievalError};

/// SDK config loader for `bedrock`: region, named profile, and the endpoint
/// override when one is set.
pub fn config_loader(bedrock: &BedrockConfig) -> ConfigLoader {
    let loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(bedrock.region.clone()))
        .profile_name(&bedrock.profile)
        .retry_config(RetryConfig::disabled());

    match &bedrock.endpoint {
        Some(endpoint) => loader.endpoint_url(endpoint.trim_end_matches('/')),
        None => loader,
    }
}

pub async fn load_sdk_config(bedrock: &BedrockConfig) -> SdkConfig {
    config_loader(bedrock).load().await
}

/// Operation-independent classification of a failed call.
#[derive(Debug)]
pub(crate) enum CallFailure {
    /// Rejected credentials, or none could be resolved to sign with.
    Unauthorized(String),
    Throttled(String),
    Status { status_code: u16, message: String },
    Network(String),
    Malformed(String),
}

pub(crate) fn classify<E>(err: &SdkError<E, HttpResponse>) -> CallFailure
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match err {
        SdkError::ServiceError(context) => {
            let status_code = context.raw().status().as_u16();
            let service_error = context.err();
            let message = service_error
                .message()
                .or(service_error.code())
                .unwrap_or("no error message")
                .to_string();
            match status_code {
                401 | 403 => CallFailure::Unauthorized(message),
                429 => CallFailure::Throttled(message),
                _ => CallFailure::Status {
                    status_code,
                    message,
                },
            }
        }
        // Signing happens while the request is built.
        SdkError::ConstructionFailure(_) => {
            CallFailure::Unauthorized(DisplayErrorContext(err).to_string())
        }
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            CallFailure::Network(DisplayErrorContext(err).to_string())
        }
        _ => CallFailure::Malformed(DisplayErrorContext(err).to_string()),
    }
}

impl From<CallFailure> for GenerationError {
    fn from(failure: CallFailure) -> Self {
        match failure {
            CallFailure::Unauthorized(m) => GenerationError::AuthenticationFailed(m),
            CallFailure::Throttled(m) => GenerationError::Throttled(m),
            CallFailure::Status {
                status_code,
                message,
            } => GenerationError::ApiError {
                status_code,
                message,
            },
            CallFailure::Network(m) => GenerationError::Network(m),
            CallFailure::Malformed(m) => GenerationError::Malformed(m),
        }
    }
}

impl From<CallFailure> for RetrievalError {
    fn from(failure: CallFailure) -> Self {
        match failure {
            CallFailure::Unauthorized(m) => RetrievalError::AuthenticationFailed(m),
            CallFailure::Throttled(m) => RetrievalError::ApiError {
                status_code: 429,
                message: m,
            },
            CallFailure::Status {
                status_code,
                message,
            } => RetrievalError::ApiError {
                status_code,
                message,
            },
            CallFailure::Network(m) => RetrievalError::Network(m),
            CallFailure::Malformed(m) => RetrievalError::Malformed(m),
        }
    }
}
