pub mod ask;
pub mod gateway;
pub mod onboard;
pub mod probe;
pub mod status;
pub mod students;

use companion_agent::Companion;
use companion_config::AppConfig;
use std::sync::Arc;

/// Load configuration, the roster and both remote clients.
pub async fn build_companion() -> Result<(AppConfig, Companion), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let directory = Arc::new(config.load_directory()?);
    let backends = companion_providers::build_from_config(&config).await?;
    let companion = Companion::from_config(
        &config,
        directory,
        backends.runtime,
        backends.knowledge_base,
    );
    Ok((config, companion))
}

/// Where the roster was loaded from, for display.
pub fn roster_source(config: &AppConfig) -> String {
    match &config.directory.students_file {
        Some(path) => path.display().to_string(),
        None => "built-in".to_string(),
    }
}
