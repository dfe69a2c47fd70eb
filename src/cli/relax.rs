//! # relax 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/relax.rs`

use super::TargetArgs;
use clap::Args;
use std::path::PathBuf;

/// relax 子命令参数
#[derive(Args, Debug)]
pub struct RelaxArgs {
    /// Working directory containing the VASP inputs
    #[arg(short, long, default_value = ".")]
    pub workdir: PathBuf,

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

    /// Shell command launching the simulator
    #[arg(long)]
    pub command: Option<String>,

    /// Seed structure file copied to POSCAR before the first run
    #[arg(long)]
    pub seed: Option<String>,

    /// Skip the initial run and continue from the existing OUTCAR and POSCAR
    #[arg(long, default_value_t = false)]
    pub resume: bool,

    /// Iteration the resumed run continues at (defaults to one past the newest archive)
    #[arg(long, requires = "resume")]
    pub start_iteration: Option<usize>,

    /// Disable the progress spinner while the simulator runs
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}
