#![cfg(unix)]

use std::process::Command;
use tokio::time::{sleep, timeout, Duration};
use vulcand_reconciler::signal::shutdown_signal;

#[tokio::test]
async fn test_sigterm_starts_shutdown() {
    let waiter = tokio::spawn(shutdown_signal());

    // 핸들러가 설치될 때까지 대기
    sleep(Duration::from_millis(200)).await;
    assert!(!waiter.is_finished());

    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    timeout(Duration::from_secs(5), waiter)
        .await
        .expect("SIGTERM 후에도 종료 대기가 끝나지 않음")
        .unwrap();
}
