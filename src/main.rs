use std::process::ExitCode;

use alert_relay::{cli::Cli, run, utils::init_logging};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    // 2. 로깅 초기화
    let _guard = init_logging();

    // 3. 인자 파싱 (누락 시 usage 출력 후 종료)
    let cli = Cli::parse();

    // 4. 이벤트 처리
    match run(cli).await {
        Ok(outcome) => {
            println!("{}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error_code = e.error_code(), "{}", e);
            println!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
