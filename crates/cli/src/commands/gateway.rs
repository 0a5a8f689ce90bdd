//! `companion gateway`: start the HTTP API and web frontend.

use companion_config::AppConfig;

/// Startup summary: where the gateway listens, which backend it talks to,
/// and how many students it serves.
fn banner(config: &AppConfig, student_count: usize) -> Vec<String> {
    vec![
        "🎓 Student Companion Gateway".to_string(),
        format!(
            "   Listening: http://{}:{}",
            config.gateway.host, config.gateway.port
        ),
        format!(
            "   Backend:   {} (profile `{}`)",
            config.bedrock.endpoint_url(),
            config.bedrock.profile
        ),
        format!(
            "   Students:  {student_count} ({})",
            super::roster_source(config)
        ),
    ]
}

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let directory = config.load_directory()?;
    for line in banner(&config, directory.len()) {
        println!("{line}");
    }

    companion_gateway::start(config).await?;

    Ok(())
}
