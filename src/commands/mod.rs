//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config/`, `parsers/`, `relax/`, `utils/`
//! - 子模块: relax, stress, correct, history, snapshots, init

pub mod correct;
pub mod history;
pub mod init;
pub mod relax;
pub mod snapshots;
pub mod stress;

use crate::cli::{Commands, TargetArgs};
use crate::config::{defaults, ConfigOverrides, RelaxConfig};
use crate::error::Result;

use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Relax(args) => relax::execute(args),
        Commands::Stress(args) => stress::execute(args),
        Commands::Correct(args) => correct::execute(args),
        Commands::History(args) => history::execute(args),
        Commands::Snapshots(args) => snapshots::execute(args),
        Commands::Init(args) => init::execute(args),
    }
}

/// 分析类命令的可选配置：仅当给出目标或存在配置文件时才加载
fn optional_config(args: &TargetArgs, dir: &Path) -> Result<Option<RelaxConfig>> {
    let wanted = args.target.is_some()
        || args.threshold.is_some()
        || args.config.is_some()
        || dir.join(defaults::CONFIG_FILE).exists();
    if !wanted {
        return Ok(None);
    }

    let overrides = ConfigOverrides {
        target: args.target,
        threshold: args.threshold,
        ..Default::default()
    };
    RelaxConfig::load(args.config.as_deref(), dir, overrides).map(Some)
}

/// 文件所在目录，用于查找隐式配置
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
