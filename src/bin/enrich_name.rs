//! Runs one enrichment against the configured lookup services and prints the
//! merged attributes.
//!
//! Usage: `enrich_name <name>`

use people_enrichment_api::config::Config;
use people_enrichment_api::enrichment::Enricher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "people_enrichment_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let name = std::env::args()
        .nth(1)
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("usage: enrich_name <name>"))?;

    let config = Config::lookup_from_env()?;
    let enricher = Enricher::from_config(&config)?;

    let attributes = enricher.enrich(name.trim()).await;
    println!("{}", serde_json::to_string_pretty(&attributes)?);

    Ok(())
}
