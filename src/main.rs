use clap::Parser;
use slowlog_export::utils::{logger, validation::Validate};
use slowlog_export::{AppConfig, CliArgs};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // 載入並驗證配置
    let config = match AppConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("❌ Configuration validation failed: {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        return ExitCode::FAILURE;
    }

    // 初始化日誌，guard 需存活到退出
    let _guard = match logger::init_logger(&config.global.log_file, args.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ Failed to open log file '{}': {}", config.global.log_file, e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "Starting slowlog-export {} with config {}",
        env!("CARGO_PKG_VERSION"),
        args.config
    );

    match slowlog_export::app::run(&config).await {
        Ok(summary) => {
            for file in &summary.files {
                tracing::info!("📁 Exported {}", file.path.display());
            }
            tracing::info!(
                "✅ Slow log export for {} completed",
                summary.window.date_range_label()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(
                stage = ?e.stage(),
                "❌ Slow log export failed: {}",
                e
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            ExitCode::FAILURE
        }
    }
}
