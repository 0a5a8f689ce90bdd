//! `companion probe`: raw knowledge base query for diagnostics.

pub async fn run(query: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let (config, companion) = super::build_companion().await?;
    let query = query.unwrap_or(config.retrieval.probe_query);

    eprintln!("🧪 Probing knowledge base with query {query:?}");
    let response = companion.retrieval().probe(&query).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
