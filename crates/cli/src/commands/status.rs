//! `companion status`: show configuration status.

use companion_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let bedrock = &config.bedrock;

    let or_unset = |s: &str| if s.is_empty() { "(not set)".to_string() } else { s.to_string() };

    println!("🎓 Student Companion Status");
    println!("===========================");
    println!("  Config dir:      {}", AppConfig::config_dir().display());
    println!("  Region:          {}", bedrock.region);
    println!("  Endpoint:        {}", bedrock.endpoint_url());
    println!("  Credentials:     profile `{}`", bedrock.profile);
    println!("  Knowledge base:  {}", or_unset(&bedrock.knowledge_base_id));
    println!("  Agent:           {}", or_unset(&bedrock.agent_id));
    println!("  Agent alias:     {}", or_unset(&bedrock.agent_alias_id));
    println!("  Max tokens:      {}", config.generation.max_tokens);
    println!("  Temperature:     {}", config.generation.temperature);
    println!("  Results/query:   {}", config.retrieval.number_of_results);
    println!("  Gateway:         {}:{}", config.gateway.host, config.gateway.port);

    match config.load_directory() {
        Ok(directory) => {
            println!(
                "  Students:        {} ({})",
                directory.len(),
                super::roster_source(&config)
            );
        }
        Err(e) => println!("  Students:        ❌ {e}"),
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file, run `companion onboard` first");
    }

    let missing = bedrock.missing_fields();
    if missing.is_empty() {
        println!("  ✅ Remote services configured");
    } else {
        println!("  ⚠️  Missing: {}", missing.join(", "));
    }

    Ok(())
}
