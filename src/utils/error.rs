use sea_orm::DbErr;
use thiserror::Error;

use crate::config::ConfigError;

/// 애플리케이션 전역 에러 타입
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid input: {0}")]
    ValidationError(String),
    #[error("storage error: {0}")]
    StorageError(String),
    #[error("messaging endpoint error: {0}")]
    EndpointError(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 에러 코드 반환
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG001",
            AppError::ValidationError(_) => "INPUT001",
            AppError::StorageError(_) => "STORE500",
            AppError::EndpointError(_) => "CHAT502",
            AppError::InternalError(_) => "COMMON500",
        }
    }

    /// 프로세스 종료 코드 (sysexits.h)
    ///
    /// 잘못된 입력은 64, 설정 누락은 78, 그 외 main까지 올라온 에러는 70입니다.
    /// 전송/삭제 실패는 결과(Outcome)로 처리되므로 여기까지 오지 않습니다.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::ValidationError(_) => 64,
            AppError::Config(_) => 78,
            AppError::StorageError(_) | AppError::EndpointError(_) | AppError::InternalError(_) => 70,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::StorageError(err.to_string())
    }
}

/// 편의 함수들
impl AppError {
    pub fn validation_error(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn storage_error(msg: impl Into<String>) -> Self {
        AppError::StorageError(msg.into())
    }

    pub fn endpoint_error(msg: impl Into<String>) -> Self {
        AppError::EndpointError(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        AppError::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_input_and_config_errors_to_distinct_exit_codes() {
        // Arrange
        let config = AppError::from(ConfigError::MissingBotToken);
        let validation = AppError::validation_error("unknown status: UNKNOWN");

        // Assert
        assert_eq!(validation.exit_code(), 64);
        assert_eq!(config.exit_code(), 78);
        assert_eq!(config.error_code(), "CONFIG001");
        assert_eq!(validation.error_code(), "INPUT001");
    }

    #[test]
    fn should_map_runtime_errors_to_software_exit_code() {
        // Arrange
        let storage = AppError::storage_error("database is locked");
        let endpoint = AppError::endpoint_error("Bad Request: message to delete not found");
        let internal = AppError::internal_error("Failed to build HTTP client");

        // Assert
        assert_eq!(storage.exit_code(), 70);
        assert_eq!(endpoint.exit_code(), 70);
        assert_eq!(internal.exit_code(), 70);
        assert_eq!(endpoint.error_code(), "CHAT502");
        assert_eq!(internal.error_code(), "COMMON500");
    }

    #[test]
    fn should_convert_db_error_into_storage_error() {
        // Arrange
        let err = DbErr::Custom("disk I/O error".to_string());

        // Act
        let app_err = AppError::from(err);

        // Assert
        match app_err {
            AppError::StorageError(msg) => assert!(msg.contains("disk I/O error")),
            other => panic!("Expected StorageError, got {:?}", other),
        }
    }

    #[test]
    fn should_render_config_error_transparently() {
        // Arrange & Act
        let err = AppError::from(ConfigError::MissingChatId);

        // Assert
        assert_eq!(err.to_string(), ConfigError::MissingChatId.to_string());
    }
}
