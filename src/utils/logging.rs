//! 로깅 초기화 모듈
//!
//! 구조화된 JSON 로그를 stderr와 `LOG_DIR`의 일별 파일로 보냅니다.
//! stdout은 모니터링 시스템이 수집하는 처리 결과 한 줄에만 씁니다.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_DIR: &str = "/tmp/alert-relay";

/// The rolling appender appends `.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "alert-relay.log";

const DEFAULT_FILTER: &str = "info,alert_relay=debug";

/// `LOG_DIR`, or the default under `/tmp`.
pub fn log_dir() -> PathBuf {
    std::env::var_os("LOG_DIR")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}

/// Daily log file in `dir`, creating the directory if needed.
pub fn open_log_file(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
}

/// 로깅 시스템을 초기화합니다.
///
/// 로그 레벨은 `RUST_LOG`로 조정합니다. 로그 디렉토리를 만들 수 없으면
/// stderr에만 기록하고 `None`을 반환합니다. 알림 전송은 로그 파일 없이도 진행됩니다.
///
/// 반환된 `WorkerGuard`는 main에서 유지해야 종료 시 버퍼링된 로그가 기록됩니다.
pub fn init_logging() -> Option<WorkerGuard> {
    let dir = log_dir();

    let (file_layer, guard) = match open_log_file(&dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_current_span(true)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(err) => {
            eprintln!(
                "Log file disabled, cannot use {}: {}",
                dir.display(),
                err
            );
            (None, None)
        }
    };

    let stderr_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .with_writer(std::io::stderr);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Failed to initialize tracing: {}", err);
    }

    guard
}
