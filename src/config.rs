//! Runtime configuration. Every field can come from a flag or from the
//! environment (`.env` is loaded before parsing).

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Gemini extraction settings.
#[derive(Debug, Clone, Args)]
pub struct GeminiConfig {
    #[arg(long = "gemini-api-key", env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long = "gemini-model", env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    pub model: String,

    /// Per-request timeout in seconds
    #[arg(long = "gemini-timeout", env = "GEMINI_TIMEOUT_SECONDS", default_value_t = 300)]
    pub timeout_seconds: u64,

    /// Attempts per section before giving up
    #[arg(long = "gemini-retries", env = "GEMINI_RETRIES", default_value_t = 3)]
    pub retries: u32,

    /// Base delay between attempts in seconds
    #[arg(long = "gemini-retry-delay", env = "GEMINI_RETRY_DELAY_SECONDS", default_value_t = 5.0)]
    pub retry_delay_seconds: f64,

    /// Directory holding `extract_<section>.md` instruction overrides
    #[arg(long, env = "PROMPTS_DIR", default_value = "prompts")]
    pub prompts_dir: PathBuf,
}

impl GeminiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_seconds.max(0.0))
    }
}

/// Building ledger lookup settings.
#[derive(Debug, Clone, Args)]
pub struct LedgerConfig {
    #[arg(long = "vworld-api-key", env = "VWORLD_API_KEY", hide_env_values = true)]
    pub vworld_api_key: String,

    /// data.go.kr service key, raw or percent-encoded
    #[arg(long = "service-key", env = "DATA_GO_KR_SERVICE_KEY", hide_env_values = true)]
    pub data_go_kr_service_key: String,

    #[arg(long = "request-timeout", env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 15.0)]
    pub request_timeout_seconds: f64,

    #[arg(long = "retry-count", env = "RETRY_COUNT", default_value_t = 3)]
    pub retry_count: u32,

    #[arg(long = "retry-backoff", env = "RETRY_BACKOFF_SECONDS", default_value_t = 1.5)]
    pub retry_backoff_seconds: f64,

    #[arg(
        long = "cache-db",
        env = "CACHE_DB_PATH",
        default_value = "data/cache/ledger_cache.sqlite3"
    )]
    pub cache_db_path: PathBuf,

    #[arg(long = "cache-ttl-days", env = "CACHE_TTL_DAYS", default_value_t = 30)]
    pub cache_ttl_days: i64,
}

impl LedgerConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_seconds.max(0.0))
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_backoff_seconds.max(0.0))
    }
}
