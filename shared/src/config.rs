use tracing::warn;

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub data_dir: String,
    pub upstream_url: String,
    pub upstream_token: String,
    pub default_ttl_secs: u64,
    pub negative_ttl_secs: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub upstream_timeout_secs: u64,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_DATA_DIR: &str = "./cache";
    const DEFAULT_UPSTREAM_URL: &str = "https://app.asana.com/api/1.0";

    pub fn from_env() -> Self {
        Self {
            host: std::env::var("PULSE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            http_port: env_parse("PULSE_HTTP_PORT", 8080),
            data_dir: std::env::var("PULSE_DATA_DIR")
                .unwrap_or_else(|_| Self::DEFAULT_DATA_DIR.to_string()),
            upstream_url: std::env::var("PULSE_UPSTREAM_URL")
                .unwrap_or_else(|_| Self::DEFAULT_UPSTREAM_URL.to_string()),
            upstream_token: std::env::var("PULSE_UPSTREAM_TOKEN").unwrap_or_else(|_| {
                warn!("PULSE_UPSTREAM_TOKEN not set, upstream requests will be unauthenticated");
                String::new()
            }),
            default_ttl_secs: env_parse("PULSE_DEFAULT_TTL_SECS", 300),
            negative_ttl_secs: env_parse("PULSE_NEGATIVE_TTL_SECS", 30),
            max_retries: env_parse("PULSE_MAX_RETRIES", 3),
            backoff_ms: env_parse("PULSE_BACKOFF_MS", 250),
            upstream_timeout_secs: env_parse("PULSE_UPSTREAM_TIMEOUT_SECS", 10),
            allowed_origins: std::env::var("PULSE_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
