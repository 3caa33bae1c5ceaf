//! Telegram Bot API messenger
//!
//! Sends and deletes messages in a single configured chat. Telegram answers
//! with `{"ok": bool, "result": ..., "description": ...}` for both success and
//! failure, so the JSON body decides the outcome rather than the HTTP status.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::TelegramConfig;
use crate::utils::AppError;

/// 메시징 엔드포인트 인터페이스
///
/// 실제 HTTP 호출을 추상화하여 테스트에서 Mock 객체로 대체할 수 있습니다.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post `text` to the channel, returning the endpoint-assigned message id.
    async fn send(&self, text: &str) -> Result<i64, AppError>;

    /// Remove a previously posted message.
    async fn delete(&self, message_id: i64) -> Result<(), AppError>;
}

/// `sendMessage` request body
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
    pub disable_web_page_preview: bool,
}

/// `deleteMessage` request body
#[derive(Debug, Serialize)]
pub struct DeleteMessageRequest<'a> {
    pub chat_id: &'a str,
    pub message_id: i64,
}

/// Envelope shared by every Bot API response
#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

/// The part of a sent `Message` the relay cares about
#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

/// Telegram Bot API client bound to one chat
#[derive(Clone)]
pub struct TelegramMessenger {
    client: Client,
    config: TelegramConfig,
}

impl TelegramMessenger {
    pub fn new(config: TelegramConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::internal_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base, self.config.bot_token, method
        )
    }

    /// POST a Bot API method and unwrap the response envelope.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // the request URL embeds the bot token
                let e = e.without_url();
                error!(error = %e, method, "Telegram request failed");
                AppError::EndpointError(format!("{} request failed: {}", method, e))
            })?;

        let status = response.status();
        let envelope: TelegramResponse<T> = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!(error = %e, %status, method, "Telegram returned an unreadable response");
            AppError::EndpointError(format!("{} returned HTTP {}: {}", method, status, e))
        })?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| format!("HTTP {}", status));
            error!(
                method,
                error_code = envelope.error_code.unwrap_or_default(),
                description = %description,
                "Telegram rejected request"
            );
            return Err(AppError::EndpointError(description));
        }

        envelope.result.ok_or_else(|| {
            AppError::EndpointError(format!("{} response is missing a result", method))
        })
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    #[instrument(skip(self, text), fields(chat_id = %self.config.chat_id))]
    async fn send(&self, text: &str) -> Result<i64, AppError> {
        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: &self.config.parse_mode,
            disable_web_page_preview: self.config.disable_web_page_preview,
        };

        debug!(length = text.len(), "Sending Telegram message");
        let sent: SentMessage = self.call("sendMessage", &body).await?;

        info!(message_id = sent.message_id, "Telegram message sent");
        Ok(sent.message_id)
    }

    #[instrument(skip(self), fields(chat_id = %self.config.chat_id))]
    async fn delete(&self, message_id: i64) -> Result<(), AppError> {
        let body = DeleteMessageRequest {
            chat_id: &self.config.chat_id,
            message_id,
        };

        let _: bool = self.call("deleteMessage", &body).await?;

        info!(message_id, "Telegram message deleted");
        Ok(())
    }
}
