//! Configuration types for the homework watcher

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_verdicts")]
    pub verdicts: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            telegram_api_url: default_telegram_api_url(),
            poll_interval_seconds: default_poll_interval(),
            greeting: default_greeting(),
            verdicts: default_verdicts(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

/// The three secrets the watcher cannot run without
#[derive(Clone)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Build credentials from optional sources. Values are trimmed, empty
    /// values count as missing, and the error lists every missing variable.
    pub fn resolve(
        practicum_token: Option<String>,
        telegram_token: Option<String>,
        telegram_chat_id: Option<String>,
    ) -> crate::Result<Self> {
        let present = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let practicum_token = present(practicum_token);
        let telegram_token = present(telegram_token);
        let telegram_chat_id = present(telegram_chat_id);

        match (practicum_token, telegram_token, telegram_chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => Ok(Self {
                practicum_token,
                telegram_token,
                telegram_chat_id,
            }),
            (practicum_token, telegram_token, telegram_chat_id) => {
                let missing: Vec<&str> = [
                    (PRACTICUM_TOKEN_VAR, practicum_token.is_none()),
                    (TELEGRAM_TOKEN_VAR, telegram_token.is_none()),
                    (TELEGRAM_CHAT_ID_VAR, telegram_chat_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect();

                Err(crate::WatcherError::Config(format!(
                    "Missing required environment variables: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_interval() -> u64 {
    600
}

fn default_greeting() -> String {
    "Привет".to_string()
}

fn default_verdicts() -> BTreeMap<String, String> {
    [
        (
            "approved",
            "Работа проверена: ревьюеру всё понравилось. Ура!",
        ),
        ("reviewing", "Работа взята на проверку ревьюером."),
        ("rejected", "Работа проверена: у ревьюера есть замечания."),
    ]
    .into_iter()
    .map(|(status, verdict)| (status.to_string(), verdict.to_string()))
    .collect()
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::WatcherError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
