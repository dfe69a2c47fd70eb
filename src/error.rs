//! # 统一错误处理模块
//!
//! 定义 fixpress 的所有错误类型，使用 `thiserror` 派生。
//!
//! 两类终止状态（模拟未完成、迭代次数耗尽）也作为错误返回，
//! 由 `main.rs` 映射为不同的退出码。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 模拟未完成时的退出码
pub const EXIT_INCOMPLETE: i32 = 2;

/// 迭代预算耗尽时的退出码
pub const EXIT_EXHAUSTED: i32 = 3;

/// fixpress 统一错误类型
#[derive(Error, Debug)]
pub enum FixpressError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Malformed stress record: {reason}\nLine: {line}")]
    StressParse { line: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 弛豫终止状态
    // ─────────────────────────────────────────────────────────────
    #[error("Simulation run before iteration {iteration} did not complete, relaxation aborted")]
    IncompleteRun { iteration: usize },

    #[error(
        "Iteration budget of {max_iterations} exhausted without convergence \
         (max |error| = {max_abs_error:.4} kB, threshold = {threshold} kB)"
    )]
    BudgetExhausted {
        max_iterations: usize,
        max_abs_error: f64,
        threshold: f64,
    },

    #[error("Refusing to overwrite archived structure {path} (resume at a later iteration)")]
    ArchiveExists { path: String },

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 配置与参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl FixpressError {
    /// 进程退出码
    pub fn exit_code(&self) -> i32 {
        match self {
            FixpressError::IncompleteRun { .. } => EXIT_INCOMPLETE,
            FixpressError::BudgetExhausted { .. } => EXIT_EXHAUSTED,
            _ => 1,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, FixpressError>;
