//! `companion onboard`: write a starter configuration.

use companion_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🎓 Student Companion: First-Time Setup");
    println!("=======================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!(
        "   1. Set bedrock.knowledge_base_id, bedrock.agent_id and bedrock.agent_alias_id in {}",
        config_path.display()
    );
    println!("      (or COMPANION_KNOWLEDGE_BASE_ID, COMPANION_AGENT_ID, COMPANION_AGENT_ALIAS_ID)");
    println!("   2. Run: companion probe");
    println!("   3. Run: companion ask --student emma \"What is EC2?\"\n");

    Ok(())
}
