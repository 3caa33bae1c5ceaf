use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_PARSE_MODE: &str = "HTML";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///tmp/telegram_messages.db?mode=rwc";

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub database_url: String,
    /// Post the resolution text when a resolve event finds no active message.
    pub send_resolution_notice: bool,
}

/// Telegram Bot API 설정
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
    pub parse_mode: String,
    pub timeout: Duration,
    pub disable_web_page_preview: bool,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("parse_mode", &self.parse_mode)
            .field("timeout", &self.timeout)
            .field("disable_web_page_preview", &self.disable_web_page_preview)
            .finish()
    }
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            parse_mode: DEFAULT_PARSE_MODE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            disable_web_page_preview: true,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = non_empty("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::MissingBotToken)?;
        let chat_id = non_empty("TELEGRAM_CHAT_ID").ok_or(ConfigError::MissingChatId)?;

        let api_base = non_empty("TELEGRAM_API_BASE")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let parse_mode =
            non_empty("TELEGRAM_PARSE_MODE").unwrap_or_else(|| DEFAULT_PARSE_MODE.to_string());

        let timeout_secs = match non_empty("TELEGRAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let database_url =
            non_empty("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let send_resolution_notice = match non_empty("SEND_RESOLUTION_NOTICE") {
            Some(raw) => raw
                .trim()
                .to_lowercase()
                .parse::<bool>()
                .map_err(|_| ConfigError::InvalidFlag {
                    name: "SEND_RESOLUTION_NOTICE",
                    value: raw,
                })?,
            None => true,
        };

        Ok(Self {
            telegram: TelegramConfig {
                bot_token,
                chat_id,
                api_base,
                parse_mode,
                timeout: Duration::from_secs(timeout_secs),
                disable_web_page_preview: true,
            },
            database_url,
            send_resolution_notice,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing TELEGRAM_BOT_TOKEN environment variable")]
    MissingBotToken,
    #[error("Missing TELEGRAM_CHAT_ID environment variable")]
    MissingChatId,
    #[error("Invalid TELEGRAM_TIMEOUT_SECS value: {0}")]
    InvalidTimeout(String),
    #[error("Invalid {name} value: {value} (expected 'true' or 'false')")]
    InvalidFlag { name: &'static str, value: String },
}
