//! Telegram Bot API 클라이언트 통합 테스트
//!
//! wiremock 서버로 Bot API를 대체하여 요청 형식과 응답 처리를 검증합니다.

use std::time::Duration;

use alert_relay::config::TelegramConfig;
use alert_relay::domain::message::{Messenger, TelegramMessenger};
use alert_relay::utils::AppError;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:test-token";
const CHAT_ID: &str = "-100200300";

fn messenger_for(server: &MockServer) -> TelegramMessenger {
    let config = TelegramConfig::new(TOKEN, CHAT_ID).with_api_base(server.uri());
    TelegramMessenger::new(config).expect("client should build")
}

#[tokio::test]
async fn should_send_message_and_return_id() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_json(json!({
            "chat_id": CHAT_ID,
            "text": "<b>Disk full</b> on db-01",
            "parse_mode": "HTML",
            "disable_web_page_preview": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "message_id": 555, "date": 1738332225, "text": "Disk full on db-01" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let messenger = messenger_for(&server);

    // Act
    let result = messenger.send("<b>Disk full</b> on db-01").await;

    // Assert
    assert_eq!(result.unwrap(), 555);
}

#[tokio::test]
async fn should_report_endpoint_description_on_send_failure() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let messenger = messenger_for(&server);

    // Act
    let result = messenger.send("Disk full").await;

    // Assert
    match result {
        Err(AppError::EndpointError(msg)) => assert_eq!(msg, "Bad Request: chat not found"),
        other => panic!("Expected EndpointError, got {:?}", other),
    }
}

#[tokio::test]
async fn should_delete_message() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/deleteMessage", TOKEN)))
        .and(body_json(json!({ "chat_id": CHAT_ID, "message_id": 555 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": true })))
        .expect(1)
        .mount(&server)
        .await;
    let messenger = messenger_for(&server);

    // Act
    let result = messenger.delete(555).await;

    // Assert
    assert!(result.is_ok());
}

#[tokio::test]
async fn should_fail_deleting_missing_message() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/deleteMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: message to delete not found"
        })))
        .mount(&server)
        .await;
    let messenger = messenger_for(&server);

    // Act
    let result = messenger.delete(999).await;

    // Assert
    assert!(matches!(result, Err(AppError::EndpointError(msg)) if msg.contains("not found")));
}

#[tokio::test]
async fn should_fail_on_non_json_response() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;
    let messenger = messenger_for(&server);

    // Act
    let result = messenger.send("Disk full").await;

    // Assert
    match result {
        Err(AppError::EndpointError(msg)) => {
            assert!(msg.contains("502"));
            assert!(!msg.contains(TOKEN));
        }
        other => panic!("Expected EndpointError, got {:?}", other),
    }
}

#[tokio::test]
async fn should_time_out_slow_endpoint() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "result": { "message_id": 1 } }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let config = TelegramConfig::new(TOKEN, CHAT_ID)
        .with_api_base(server.uri())
        .with_timeout(Duration::from_millis(200));
    let messenger = TelegramMessenger::new(config).expect("client should build");

    // Act
    let result = messenger.send("Disk full").await;

    // Assert
    assert!(matches!(result, Err(AppError::EndpointError(_))));
}
