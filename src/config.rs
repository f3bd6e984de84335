use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language sent with every catalog request
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Region whose watch providers are surfaced
    #[serde(default = "default_provider_region")]
    pub provider_region: String,

    /// Google Drive API base URL
    #[serde(default = "default_drive_api_url")]
    pub drive_api_url: String,

    /// Google Docs API base URL
    #[serde(default = "default_docs_api_url")]
    pub docs_api_url: String,

    /// Google Drive upload endpoint base URL
    #[serde(default = "default_upload_api_url")]
    pub upload_api_url: String,

    /// OAuth access token for the document store. When unset, every
    /// login attempt fails and the session stays unauthorized.
    #[serde(default)]
    pub drive_access_token: Option<String>,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "pt-BR".to_string()
}

fn default_provider_region() -> String {
    "BR".to_string()
}

fn default_drive_api_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_docs_api_url() -> String {
    "https://docs.googleapis.com/v1".to_string()
}

fn default_upload_api_url() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
