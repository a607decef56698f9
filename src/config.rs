use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    // Base URL of the Nominatim instance
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    // Sent as User-Agent, Nominatim rejects anonymous clients
    #[serde(default = "default_geocoder_user_agent")]
    pub geocoder_user_agent: String,

    #[serde(default = "default_geocode_timeout_secs")]
    pub geocode_timeout_secs: u64,

    #[serde(default = "default_geocode_max_attempts")]
    pub geocode_max_attempts: u32,

    // Wait after a timed out geocoding call
    #[serde(default = "default_delay_ms")]
    pub retry_delay_ms: u64,

    // Wait after each geocoded location line
    #[serde(default = "default_delay_ms")]
    pub rate_limit_delay_ms: u64,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Config>()
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocode_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            geocoder_url: default_geocoder_url(),
            geocoder_user_agent: default_geocoder_user_agent(),
            geocode_timeout_secs: default_geocode_timeout_secs(),
            geocode_max_attempts: default_geocode_max_attempts(),
            retry_delay_ms: default_delay_ms(),
            rate_limit_delay_ms: default_delay_ms(),
            max_upload_bytes: default_max_upload_bytes(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoder_user_agent() -> String {
    format!("photo-atlas/{}", env!("CARGO_PKG_VERSION"))
}

fn default_geocode_timeout_secs() -> u64 {
    10
}

fn default_geocode_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_session_ttl_secs() -> u64 {
    3600
}
