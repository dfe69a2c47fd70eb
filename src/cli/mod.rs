//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `relax`: 迭代弛豫到目标应力
//! - `stress`: 读取 OUTCAR 中的应力
//! - `correct`: 离线执行单步修正
//! - `history`: 分析累积的应力日志
//! - `snapshots`: 列出存档的结构
//! - `init`: 生成配置模板
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: relax, stress, correct, history, snapshots, init

pub mod correct;
pub mod history;
pub mod init;
pub mod relax;
pub mod snapshots;
pub mod stress;

use crate::models::stress::parse_voigt_list;
use crate::models::StressTensor;

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// fixpress - VASP 目标应力弛豫工具
#[derive(Parser)]
#[command(name = "fixpress")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Iteratively relax a VASP cell until its stress tensor matches a target",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Run the stress-targeted relaxation loop
    Relax(relax::RelaxArgs),

    /// Show completion status and the last stress tensor of an OUTCAR
    Stress(stress::StressArgs),

    /// Apply one correction step offline (manual restart aid)
    Correct(correct::CorrectArgs),

    /// Summarize the run-level stress log
    History(history::HistoryArgs),

    /// List archived per-iteration structures
    Snapshots(snapshots::SnapshotsArgs),

    /// Write a configuration template
    Init(init::InitArgs),
}

/// 目标应力相关参数（多个子命令共享）
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Configuration file (defaults to ./fixpress.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Target stress xx,yy,zz,xy,yz,zx in kB
    #[arg(long, value_parser = parse_voigt_list, allow_hyphen_values = true)]
    pub target: Option<StressTensor>,

    /// Convergence threshold in kB
    #[arg(long)]
    pub threshold: Option<f64>,
}
