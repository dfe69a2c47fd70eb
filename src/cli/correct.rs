//! # correct 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/correct.rs`

use super::TargetArgs;
use clap::Args;
use std::path::PathBuf;

/// correct 子命令参数
#[derive(Args, Debug)]
pub struct CorrectArgs {
    /// Structure whose lattice is corrected (usually CONTCAR)
    #[arg(long, default_value = "CONTCAR")]
    pub structure: PathBuf,

    /// OUTCAR of the run performed on that structure
    #[arg(long, default_value = "OUTCAR")]
    pub outcar: PathBuf,

    /// Iteration number, sets the damping coefficient
    #[arg(long, default_value_t = 1)]
    pub iteration: usize,

    /// Output structure file
    #[arg(short, long, default_value = "POSCAR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Young's modulus in kB
    #[arg(long)]
    pub young: Option<f64>,

    /// Poisson ratio
    #[arg(long)]
    pub poisson: Option<f64>,

    /// Maximum number of correction cycles
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Only print the correction, do not write the structure
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
