use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_AGIFY_URL: &str = "https://api.agify.io";
pub const DEFAULT_GENDERIZE_URL: &str = "https://api.genderize.io";
pub const DEFAULT_NATIONALIZE_URL: &str = "https://api.nationalize.io";

/// Deadline shared by the three lookups of one enrichment call.
pub const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LOOKUP_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Upper bound for any timeout read from the environment.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub agify_url: String,
    pub genderize_url: String,
    pub nationalize_url: String,
    pub enrichment_timeout: Duration,
    pub lookup_connect_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("DB_URL"))
            .map_err(|_| anyhow::anyhow!("DATABASE_URL or DB_URL environment variable required"))
            .and_then(|url| {
                if url.trim().is_empty() {
                    anyhow::bail!("DATABASE_URL cannot be empty");
                }
                if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                    anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                }
                Ok(url)
            })?;

        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let mut config = Self::lookup_from_env()?;
        config.database_url = database_url;
        config.port = port;

        // Log successful configuration load (without credentials)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            url_preview(&config.database_url)
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Reads only the lookup-service settings. Used by tooling that never
    /// touches the database.
    pub fn lookup_from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: String::new(),
            port: 0,
            agify_url: service_url("AGIFY_URL", DEFAULT_AGIFY_URL)?,
            genderize_url: service_url("GENDERIZE_URL", DEFAULT_GENDERIZE_URL)?,
            nationalize_url: service_url("NATIONALIZE_URL", DEFAULT_NATIONALIZE_URL)?,
            enrichment_timeout: seconds(
                "ENRICHMENT_TIMEOUT_SECS",
                std::env::var("ENRICHMENT_TIMEOUT_SECS").ok(),
                DEFAULT_ENRICHMENT_TIMEOUT,
            )?,
            lookup_connect_timeout: seconds(
                "LOOKUP_CONNECT_TIMEOUT_SECS",
                std::env::var("LOOKUP_CONNECT_TIMEOUT_SECS").ok(),
                DEFAULT_LOOKUP_CONNECT_TIMEOUT,
            )?,
        };

        tracing::debug!("Agify URL: {}", config.agify_url);
        tracing::debug!("Genderize URL: {}", config.genderize_url);
        tracing::debug!("Nationalize URL: {}", config.nationalize_url);
        tracing::debug!("Enrichment timeout: {:?}", config.enrichment_timeout);

        Ok(config)
    }

    /// Config pointing the three lookups at explicit base URLs, with default
    /// timeouts and no database.
    pub fn lookup_only(
        agify_url: impl Into<String>,
        genderize_url: impl Into<String>,
        nationalize_url: impl Into<String>,
    ) -> Self {
        Self {
            database_url: String::new(),
            port: 0,
            agify_url: agify_url.into(),
            genderize_url: genderize_url.into(),
            nationalize_url: nationalize_url.into(),
            enrichment_timeout: DEFAULT_ENRICHMENT_TIMEOUT,
            lookup_connect_timeout: DEFAULT_LOOKUP_CONNECT_TIMEOUT,
        }
    }
}

fn service_url(key: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    validate_http_url(key, url)
}

fn validate_http_url(key: &str, url: String) -> anyhow::Result<String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", key);
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// First characters of a connection URL, enough to identify it in logs.
fn url_preview(url: &str) -> String {
    url.chars().take(20).collect()
}

fn seconds(key: &str, raw: Option<String>, default: Duration) -> anyhow::Result<Duration> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 && secs <= MAX_TIMEOUT_SECS => Ok(Duration::from_secs(secs)),
        _ => anyhow::bail!(
            "{} must be a number of seconds between 1 and {}",
            key,
            MAX_TIMEOUT_SECS
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_defaults_when_unset_or_blank() {
        assert_eq!(
            seconds("X", None, DEFAULT_ENRICHMENT_TIMEOUT).unwrap(),
            Duration::from_secs(5)
        );
        assert_eq!(
            seconds("X", Some("  ".to_string()), DEFAULT_ENRICHMENT_TIMEOUT).unwrap(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_seconds_rejects_zero_and_garbage() {
        assert!(seconds("X", Some("0".to_string()), DEFAULT_ENRICHMENT_TIMEOUT).is_err());
        assert!(seconds("X", Some("soon".to_string()), DEFAULT_ENRICHMENT_TIMEOUT).is_err());
        assert_eq!(
            seconds("X", Some("2".to_string()), DEFAULT_ENRICHMENT_TIMEOUT).unwrap(),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_seconds_rejects_values_above_cap() {
        assert!(seconds("X", Some(u64::MAX.to_string()), DEFAULT_ENRICHMENT_TIMEOUT).is_err());
        assert!(seconds("X", Some("3601".to_string()), DEFAULT_ENRICHMENT_TIMEOUT).is_err());
        assert_eq!(
            seconds("X", Some("3600".to_string()), DEFAULT_ENRICHMENT_TIMEOUT).unwrap(),
            Duration::from_secs(MAX_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_url_preview_respects_char_boundaries() {
        assert_eq!(url_preview("postgres://ü:pässwörd@db/people"), "postgres://ü:pässwör");
        assert_eq!(url_preview("postgres://x"), "postgres://x");
    }

    #[test]
    fn test_validate_http_url() {
        assert_eq!(
            validate_http_url("AGIFY_URL", "https://api.agify.io/".to_string()).unwrap(),
            "https://api.agify.io"
        );
        assert!(validate_http_url("AGIFY_URL", "ftp://api.agify.io".to_string()).is_err());
    }

    #[test]
    fn test_lookup_only_uses_default_timeouts() {
        let config = Config::lookup_only("http://a", "http://g", "http://n");
        assert_eq!(config.enrichment_timeout, DEFAULT_ENRICHMENT_TIMEOUT);
        assert_eq!(config.agify_url, "http://a");
        assert!(config.database_url.is_empty());
    }
}
