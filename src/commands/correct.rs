//! # correct 命令实现
//!
//! 离线执行一次控制器迭代：读取结构与 OUTCAR，计算修正，写出新结构。
//! 用于循环终止后的人工续算。
//!
//! ## 依赖关系
//! - 使用 `cli/correct.rs` 定义的参数
//! - 使用 `config/`, `relax/controller.rs`, `parsers/`

use super::parent_dir;
use crate::cli::correct::CorrectArgs;
use crate::config::{ConfigOverrides, RelaxConfig};
use crate::error::{FixpressError, Result};
use crate::parsers::{outcar, poscar};
use crate::relax::{AbortReason, RelaxState, RelaxationController, Step};
use crate::utils::output;

/// 执行 correct 命令
pub fn execute(args: CorrectArgs) -> Result<()> {
    output::print_header("Single Correction Step");

    if args.iteration == 0 {
        return Err(FixpressError::InvalidArgument(
            "--iteration starts at 1".to_string(),
        ));
    }
    for path in [&args.structure, &args.outcar] {
        if !path.exists() {
            return Err(FixpressError::FileNotFound {
                path: path.display().to_string(),
            });
        }
    }

    let overrides = ConfigOverrides {
        target: args.target.target,
        threshold: args.target.threshold,
        young_modulus: args.young,
        poisson_ratio: args.poisson,
        max_iterations: args.max_iter,
        ..Default::default()
    };
    let config = RelaxConfig::load(
        args.target.config.as_deref(),
        parent_dir(&args.structure),
        overrides,
    )?;

    let template = poscar::read_structure_text(&args.structure)?;
    let lattice = poscar::read_lattice(&template)?;
    let outcome = outcar::read_outcome(&args.outcar, &config.markers)?;

    let mut controller =
        RelaxationController::from_config(&config, lattice).starting_at(args.iteration);
    let step = controller.advance(&outcome)?;
    let state = controller.iteration_state();
    let report = controller.report();

    if let Some(ref measured) = report.last_stress {
        output::print_stress("measured", measured);
        output::print_stress("error", &(config.target - *measured));
    }

    match step {
        Step::Apply {
            correction,
            lattice: corrected,
        } => {
            output::print_info(&format!(
                "Iteration {} of {}, damping {:.4}",
                state.iteration, state.max_iterations, state.damping
            ));
            output::print_matrix("Strain correction", correction.matrix());
            output::print_matrix("Adjusted lattice", &corrected.rows);

            if args.dry_run {
                output::print_info("[DRY] Structure not written");
            } else {
                poscar::write_with_lattice(&template, &corrected, &args.output)?;
                output::print_success(&format!("Wrote '{}'", args.output.display()));
            }
            Ok(())
        }
        Step::Finished(RelaxState::Converged) => {
            output::print_done("Stress already within threshold, no correction needed");
            Ok(())
        }
        Step::Finished(RelaxState::Aborted(AbortReason::Incomplete)) => {
            Err(FixpressError::IncompleteRun {
                iteration: state.iteration,
            })
        }
        Step::Finished(RelaxState::Exhausted) => Err(FixpressError::BudgetExhausted {
            max_iterations: state.max_iterations,
            max_abs_error: report.last_max_abs_error.unwrap_or(f64::NAN),
            threshold: config.threshold,
        }),
        Step::Finished(RelaxState::Running) => Err(FixpressError::Other(
            "controller returned without a terminal state".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::TargetArgs;
    use std::fs;
    use std::path::Path;

    const CONTCAR: &str = "cell\n1.0\n4.0 0.0 0.0\n0.0 4.0 0.0\n0.0 0.0 4.0\nSi\n1\nDirect\n0.1 0.2 0.3\n";

    fn args(dir: &Path, outcar_text: &str, dry_run: bool) -> CorrectArgs {
        fs::write(dir.join("CONTCAR"), CONTCAR).unwrap();
        fs::write(dir.join("OUTCAR"), outcar_text).unwrap();
        CorrectArgs {
            structure: dir.join("CONTCAR"),
            outcar: dir.join("OUTCAR"),
            iteration: 1,
            output: dir.join("POSCAR"),
            target: TargetArgs::default(),
            young: None,
            poisson: None,
            max_iter: None,
            dry_run,
        }
    }

    const UNCONVERGED: &str = "  in kB  70.0 0.0 0.0 0.0 0.0 0.0\nTotal CPU time used (sec): 1.0\n";

    #[test]
    fn test_correct_writes_new_structure() {
        let dir = tempfile::tempdir().unwrap();
        execute(args(dir.path(), UNCONVERGED, false)).unwrap();

        let written = fs::read_to_string(dir.path().join("POSCAR")).unwrap();
        let lattice = poscar::read_lattice(&written).unwrap();
        assert!(lattice.rows[0][0] < 4.0);
        assert!(written.ends_with("0.1 0.2 0.3\n"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        execute(args(dir.path(), UNCONVERGED, true)).unwrap();
        assert!(!dir.path().join("POSCAR").exists());
    }

    #[test]
    fn test_incomplete_outcar_reports_incomplete_run() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(args(dir.path(), "  in kB  70 0 0 0 0 0\n", false)).unwrap_err();
        assert!(matches!(err, FixpressError::IncompleteRun { iteration: 1 }));
        assert!(!dir.path().join("POSCAR").exists());
    }
}
