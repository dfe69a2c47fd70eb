//! # stress 命令实现
//!
//! 读取 OUTCAR，报告是否完成以及最后一条应力记录；
//! 给出目标时同时显示误差与收敛判断。
//!
//! ## 依赖关系
//! - 使用 `cli/stress.rs` 定义的参数
//! - 使用 `parsers/outcar.rs`, `utils/output.rs`

use super::{optional_config, parent_dir};
use crate::cli::stress::StressArgs;
use crate::error::{FixpressError, Result};
use crate::models::{StressTensor, VOIGT_LABELS};
use crate::parsers::outcar;
use crate::parsers::Markers;
use crate::utils::output;

use std::fs;
use tabled::{Table, Tabled};

/// 应力表格行
#[derive(Debug, Clone, Tabled)]
struct StressRow {
    #[tabled(rename = "Component")]
    component: String,
    #[tabled(rename = "Measured (kB)")]
    measured: String,
    #[tabled(rename = "Target (kB)")]
    target: String,
    #[tabled(rename = "Error (kB)")]
    error: String,
}

fn build_rows(measured: &StressTensor, target: Option<&StressTensor>) -> Vec<StressRow> {
    let m = measured.components();
    VOIGT_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let t = target.map(|t| t.components()[i]);
            StressRow {
                component: label.to_string(),
                measured: format!("{:.5}", m[i]),
                target: t.map(|v| format!("{:.5}", v)).unwrap_or_else(|| "-".to_string()),
                error: t
                    .map(|v| format!("{:.5}", v - m[i]))
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect()
}

/// 执行 stress 命令
pub fn execute(args: StressArgs) -> Result<()> {
    output::print_header("Simulator Stress");

    if !args.outcar.exists() {
        return Err(FixpressError::FileNotFound {
            path: args.outcar.display().to_string(),
        });
    }

    let config = optional_config(&args.target, parent_dir(&args.outcar))?;
    let markers = config
        .as_ref()
        .map(|c| c.markers.clone())
        .unwrap_or_default();

    let text = fs::read_to_string(&args.outcar).map_err(|e| FixpressError::FileReadError {
        path: args.outcar.display().to_string(),
        source: e,
    })?;

    let outcome = outcar::parse_outcome(&text, &markers)?;
    let measured = match outcome.measured_stress {
        Some(stress) => {
            output::print_success("Run completed");
            stress
        }
        None => {
            output::print_warning(&format!(
                "No '{}' marker found: run incomplete",
                markers.completion
            ));
            match latest_partial_stress(&text, &markers) {
                Some(stress) => {
                    output::print_info("Showing the latest stress record of the unfinished run");
                    stress
                }
                None => return Ok(()),
            }
        }
    };

    let target = config.as_ref().map(|c| c.target);
    let table = Table::new(build_rows(&measured, target.as_ref()));
    println!("{}", table);
    println!("    hydrostatic pressure = {:.5} kB", measured.hydrostatic());

    if let Some(cfg) = config {
        let max_abs = (cfg.target - measured).max_abs();
        if max_abs < cfg.threshold {
            output::print_done(&format!(
                "max |error| = {:.5} kB < {} kB: converged",
                max_abs, cfg.threshold
            ));
        } else {
            output::print_info(&format!(
                "max |error| = {:.5} kB >= {} kB: not converged",
                max_abs, cfg.threshold
            ));
        }
    }

    Ok(())
}

/// 未完成运行中最近的应力记录（仅用于显示）
fn latest_partial_stress(text: &str, markers: &Markers) -> Option<StressTensor> {
    let line = outcar::last_line_containing(text, &markers.stress)?;
    outcar::parse_stress_line(line, &markers.stress).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_with_and_without_target() {
        let measured = StressTensor::new([100.0, 1.0, 2.0, 0.0, 0.0, 0.0]);
        let target = StressTensor::new([120.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let rows = build_rows(&measured, Some(&target));
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].component, "xx");
        assert_eq!(rows[0].error, "20.00000");
        assert_eq!(rows[1].error, "-1.00000");

        let bare = build_rows(&measured, None);
        assert_eq!(bare[0].target, "-");
    }

    #[test]
    fn test_partial_stress_from_unfinished_run() {
        let text = "  in kB  1 2 3 4 5 6\n  in kB  7 8 9 10 11 12\n";
        let s = latest_partial_stress(text, &Markers::default()).unwrap();
        assert_eq!(s.components()[0], 7.0);
    }
}
