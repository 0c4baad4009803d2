//! 日志基础设施

use anyhow::Context;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// 初始化日志：标准输出，配置了目录时再按天滚动写文件
///
/// `RUST_LOG` 优先于配置中的级别。返回的 guard 必须在 main 中持有，
/// 否则文件日志会丢失尾部内容。
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("无法解析日志级别")?;

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("无法创建日志目录: {}", dir.display()))?;

            let file_appender = rolling::daily(dir, &config.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(false)
                        .with_thread_ids(true)
                        .with_thread_names(true),
                )
                .with(fmt::layer().with_writer(std::io::stdout).with_ansi(true))
                .try_init()
                .context("日志系统已初始化")?;

            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stdout).with_ansi(true))
                .try_init()
                .context("日志系统已初始化")?;

            Ok(None)
        }
    }
}
