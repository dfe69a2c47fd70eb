//! # history 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/history.rs`

use super::TargetArgs;
use clap::Args;
use std::path::PathBuf;

/// history 子命令参数
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Run-level stress log written by `relax`
    #[arg(default_value = "pressure.all")]
    pub log: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Export the table to CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Save a convergence plot (.png or .svg)
    #[arg(long)]
    pub plot: Option<PathBuf>,
}
