use crate::utils::error::{EtlError, Result};
use std::fs::OpenOptions;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("slowlog_export=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slowlog_export=info"))
    }
}

/// 初始化日誌：終端輸出精簡格式，日誌檔追加 JSON 格式。
///
/// 返回的 guard 必須存活到程序結束，否則緩衝中的日誌會遺失。
pub fn init_logger(log_file: &str, verbose: bool) -> Result<WorkerGuard> {
    let path = Path::new(log_file);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .json(),
        )
        .try_init()
        .map_err(|e| EtlError::ConfigError {
            message: format!("Failed to initialize logger: {}", e),
        })?;

    Ok(guard)
}
