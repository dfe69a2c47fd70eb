//! # relax 命令实现
//!
//! 运行完整的目标应力弛豫循环。
//!
//! ## 功能
//! - 合并配置文件与命令行参数
//! - 读取初始晶格，驱动 `RelaxationController`
//! - 逐次打印测得应力、误差和新晶格
//! - 将三种终止状态分别报告（收敛 / 模拟未完成 / 迭代耗尽）
//!
//! ## 依赖关系
//! - 使用 `cli/relax.rs` 定义的参数
//! - 使用 `config/`, `relax/`, `parsers/poscar.rs`, `utils/output.rs`

use super::snapshots::collect_snapshots;
use crate::cli::relax::RelaxArgs;
use crate::config::{ConfigOverrides, RelaxConfig};
use crate::error::{FixpressError, Result};
use crate::parsers::poscar;
use crate::relax::{
    AbortReason, CycleRecord, RelaxReport, RelaxState, RelaxationController, VaspBackend,
};
use crate::utils::output;

/// 执行 relax 命令
pub fn execute(args: RelaxArgs) -> Result<()> {
    output::print_header("Stress-Targeted Relaxation");

    if !args.workdir.is_dir() {
        return Err(FixpressError::DirectoryNotFound {
            path: args.workdir.display().to_string(),
        });
    }

    let overrides = ConfigOverrides {
        target: args.target.target,
        threshold: args.target.threshold,
        young_modulus: args.young,
        poisson_ratio: args.poisson,
        max_iterations: args.max_iter,
        command: args.command.clone(),
        seed: args.seed.clone(),
    };
    let config = RelaxConfig::load(args.target.config.as_deref(), &args.workdir, overrides)?;
    print_config(&config);

    // 续算时从当前 POSCAR 开始，否则从种子结构开始
    let start_file = if args.resume {
        args.workdir.join(&config.files.structure)
    } else {
        args.workdir.join(&config.run.seed)
    };
    if !start_file.exists() {
        return Err(FixpressError::FileNotFound {
            path: start_file.display().to_string(),
        });
    }
    let lattice = poscar::read_lattice_file(&start_file)?;
    output::print_matrix("Initial lattice", &lattice.rows);

    let mut backend = VaspBackend::new(&args.workdir, &config)
        .resume(args.resume)
        .show_progress(!args.no_progress);
    let start = start_iteration(&args, &config)?;
    if args.resume {
        output::print_info(&format!("Continuing at iteration {}", start));
    }
    let mut controller = RelaxationController::from_config(&config, lattice).starting_at(start);

    let report = controller.run(&mut backend, print_cycle)?;

    output::print_separator();
    summarize(&report, &config)
}

/// 续算的起始迭代：显式给出，或取最新存档序号 + 1
fn start_iteration(args: &RelaxArgs, config: &RelaxConfig) -> Result<usize> {
    match args.start_iteration {
        Some(0) => Err(FixpressError::InvalidArgument(
            "--start-iteration starts at 1".to_string(),
        )),
        Some(n) => Ok(n),
        None if args.resume => {
            let archives = collect_snapshots(&args.workdir, &config.files.archive_prefix)?;
            Ok(archives.last().map(|(n, _)| n + 1).unwrap_or(1))
        }
        None => Ok(1),
    }
}

fn print_config(config: &RelaxConfig) {
    output::print_info(&format!("Target stress (kB): {}", config.target));
    output::print_info(&format!(
        "Threshold: {} kB, max iterations: {}",
        config.threshold, config.max_iterations
    ));
    output::print_info(&format!(
        "E = {} kB, v = {}, G = {:.3} kB",
        config.elastic.young(),
        config.elastic.poisson(),
        config.elastic.shear()
    ));
    output::print_info(&format!("Simulator: {}", config.run.command));
}

fn print_cycle(cycle: &CycleRecord) {
    output::print_info(&format!(
        "Iteration {} (damping {:.4})",
        cycle.iteration, cycle.damping
    ));
    if let Some(ref measured) = cycle.measured {
        output::print_stress("measured", measured);
    }
    if let Some(ref error) = cycle.error {
        output::print_stress("error", error);
        println!("    max |error| = {:.5} kB", error.max_abs());
    }
    if let Some(ref lattice) = cycle.lattice {
        output::print_matrix("Adjusted lattice", &lattice.rows);
    }
}

/// 将终止状态映射为输出与返回值
fn summarize(report: &RelaxReport, config: &RelaxConfig) -> Result<()> {
    match report.state {
        RelaxState::Converged => {
            output::print_done(&format!(
                "Converged at iteration {} after {} corrections",
                report.iteration, report.corrections_applied
            ));
            Ok(())
        }
        RelaxState::Aborted(AbortReason::Incomplete) => Err(FixpressError::IncompleteRun {
            iteration: report.iteration,
        }),
        RelaxState::Exhausted => Err(FixpressError::BudgetExhausted {
            max_iterations: report.max_iterations,
            max_abs_error: report.last_max_abs_error.unwrap_or(f64::NAN),
            threshold: config.threshold,
        }),
        RelaxState::Running => Err(FixpressError::Other(
            "relaxation loop stopped while still running".to_string(),
        )),
    }
}
