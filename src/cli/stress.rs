//! # stress 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/stress.rs`

use super::TargetArgs;
use clap::Args;
use std::path::PathBuf;

/// stress 子命令参数
#[derive(Args, Debug)]
pub struct StressArgs {
    /// Path to the OUTCAR file
    #[arg(default_value = "OUTCAR")]
    pub outcar: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,
}
