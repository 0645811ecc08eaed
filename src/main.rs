use tokio::sync::watch;
use tracing::{error, info};
use vulcand_reconciler::{
    context::AppContext,
    error::AppError,
    logging::init_logging,
    settings::Settings,
    signal::shutdown_signal,
};

#[tokio::main]
async fn main() {
    // 로깅 전이므로 설정 오류는 stderr 로 출력
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    let _guard = match init_logging(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(settings).await {
        error!(error = %e, "조정기 실행 실패");
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> Result<(), AppError> {
    info!(
        platform = ?settings.platform.kind,
        store = ?settings.store.backend,
        target_stack = ?settings.reconciler.target_stack,
        "조정기 시작"
    );

    let context = AppContext::initialize(settings)?;
    let outcome = context.bootstrap().await?;
    info!(outcome = ?outcome, "HTTP 리스너 준비 완료");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver = context.driver();
    let driver_handle = tokio::spawn(async move {
        driver.run(shutdown_rx).await;
    });

    shutdown_signal().await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = driver_handle.await {
        error!(error = %e, "이벤트 스트림 드라이버 태스크 실패");
    }

    context.shutdown().await;
    info!("조정기 종료");
    Ok(())
}
