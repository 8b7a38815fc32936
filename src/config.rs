use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub api_url: String,
    pub api_token: Option<String>,
    pub save_debounce: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let api_url = lookup("HABIT_API_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_token = lookup("HABIT_API_TOKEN")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let debounce_ms = lookup("HABIT_SAVE_DEBOUNCE_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SAVE_DEBOUNCE_MS);

        Self {
            port,
            api_url,
            api_token,
            save_debounce: Duration::from_millis(debounce_ms),
        }
    }
}
