use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use task_client::{ClientConfig, DEFAULT_BASE_URL};

const DEFAULT_SESSION_FILE: &str = ".task_session.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub session_file: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("TASK_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let session_file = std::env::var("TASK_SESSION_FILE")
            .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
        if session_file.trim().is_empty() {
            return Err(anyhow!("TASK_SESSION_FILE must not be empty"));
        }

        let connect_timeout_secs = parse_u64_env("TASK_CONNECT_TIMEOUT_SECS", 5)?;
        let request_timeout_secs = parse_u64_env("TASK_REQUEST_TIMEOUT_SECS", 15)?;
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            api_url,
            session_file: PathBuf::from(session_file),
            connect_timeout_secs,
            request_timeout_secs,
            log_level,
        })
    }

    /// Конфигурация клиента; `server` из флага важнее переменной окружения.
    pub fn client_config(&self, server: Option<String>) -> ClientConfig {
        let base_url = normalize_server(server.unwrap_or_else(|| self.api_url.clone()));
        ClientConfig {
            base_url,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

pub fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
