//! # 日志初始化
//!
//! 基于 `tracing-subscriber`：stderr 紧凑输出，可选额外写入日志文件。
//!
//! | 参数   | 级别  |
//! |--------|-------|
//! | (无)   | WARN  |
//! | `-v`   | INFO  |
//! | `-vv`  | DEBUG |
//! | `-vvv` | TRACE |
//! | `-q`   | OFF   |
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用

use crate::error::{FixpressError, Result};

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// 由命令行参数决定日志级别
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// 初始化全局日志
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer);

    if let Some(path) = log_file {
        let file = File::create(path).map_err(|e| FixpressError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;

        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true);

        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(7, false), LevelFilter::TRACE);
        assert_eq!(level_filter(3, true), LevelFilter::OFF);
    }

    #[test]
    fn test_file_layer_receives_events() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("relax.log");
        let file = File::create(&log_path).unwrap();

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(iteration = 3, "stress read");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("stress read"));
        assert!(content.contains("iteration=3"));
    }

    #[test]
    fn test_unwritable_log_file_propagates_error() {
        let dir = tempfile::tempdir().unwrap();
        // 目录不能作为日志文件
        let result = setup_logging(0, false, Some(dir.path()));
        assert!(matches!(result, Err(FixpressError::FileWriteError { .. })));
    }
}
