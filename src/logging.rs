use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub struct LoggingGuard {
    _guard: Option<WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// 有日志目录时写入按天滚动的文件，否则写 stderr
pub fn init(log_dir: Option<&Path>) -> Option<LoggingGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zfind=info"));

    let guard = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).ok()?;
            let file_appender = tracing_appender::rolling::daily(dir, "zfind.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            );
            if subscriber.try_init().is_err() {
                return None;
            }
            Some(guard)
        }
        None => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            );
            if subscriber.try_init().is_err() {
                return None;
            }
            None
        }
    };

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::debug!(log_dir = ?log_dir.map(|d| d.display().to_string()), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir: log_dir.map(Path::to_path_buf),
    })
}
