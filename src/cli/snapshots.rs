//! # snapshots 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/snapshots.rs`

use clap::Args;
use std::path::PathBuf;

/// snapshots 子命令参数
#[derive(Args, Debug)]
pub struct SnapshotsArgs {
    /// Directory containing the archived structures
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Archive file prefix
    #[arg(long, default_value = "poscar")]
    pub prefix: String,
}
