use std::path::Path;
use time::format_description::well_known::Rfc3339;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::settings::{LogFormat, LogOutput, LogSettings};

/// 전역 구독자를 설치한다.
///
/// `RUST_LOG` 가 있으면 그 지시자를 따르고, 없으면 설정의 레벨을 기본값으로 쓴다.
/// 파일 출력일 때 돌려받은 guard 는 프로세스가 끝날 때까지 들고 있어야 버퍼가 비워진다.
pub fn init_logging(settings: &LogSettings) -> Result<Option<WorkerGuard>, AppError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(settings.level).into())
        .from_env_lossy();

    let (writer, guard, ansi) = match &settings.output {
        LogOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), None, true),
        LogOutput::File(path) => {
            let path = Path::new(path);
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                AppError::Logging(format!("로그 파일 경로가 잘못되었습니다: {}", path.display()))
            })?;

            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::new(Rfc3339))
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);

    let installed = match settings.format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(guard)
}
