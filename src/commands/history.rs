//! # history 命令实现
//!
//! 分析 `relax` 累积的应力日志。
//!
//! ## 功能
//! - 每次迭代的应力表格
//! - 给出目标时计算 max |误差|
//! - CSV 导出与收敛曲线
//!
//! ## 依赖关系
//! - 使用 `cli/history.rs` 定义的参数
//! - 使用 `parsers/stress_log.rs`, `utils/plot.rs`, `utils/output.rs`

use super::{optional_config, parent_dir};
use crate::cli::history::HistoryArgs;
use crate::error::{FixpressError, Result};
use crate::models::StressTensor;
use crate::parsers::stress_log::{parse_stress_log, terminal_note, StressRecord};
use crate::utils::{output, plot};

use serde::Serialize;
use std::fs;
use std::path::Path;
use tabled::{Table, Tabled};

/// 历史表格行
#[derive(Debug, Clone, Tabled, Serialize)]
struct HistoryRow {
    #[tabled(rename = "Iter")]
    iteration: usize,
    #[tabled(rename = "xx")]
    xx: f64,
    #[tabled(rename = "yy")]
    yy: f64,
    #[tabled(rename = "zz")]
    zz: f64,
    #[tabled(rename = "xy")]
    xy: f64,
    #[tabled(rename = "yz")]
    yz: f64,
    #[tabled(rename = "zx")]
    zx: f64,
    #[tabled(rename = "max |err|", display_with = "display_opt")]
    max_abs_error: Option<f64>,
}

fn display_opt(v: &Option<f64>) -> String {
    v.map(|x| format!("{:.5}", x)).unwrap_or_else(|| "-".to_string())
}

fn build_rows(records: &[StressRecord], target: Option<&StressTensor>) -> Vec<HistoryRow> {
    records
        .iter()
        .map(|r| {
            let [xx, yy, zz, xy, yz, zx] = r.stress.components();
            HistoryRow {
                iteration: r.cycle,
                xx,
                yy,
                zz,
                xy,
                yz,
                zx,
                max_abs_error: target.map(|t| (*t - r.stress).max_abs()),
            }
        })
        .collect()
}

/// 执行 history 命令
pub fn execute(args: HistoryArgs) -> Result<()> {
    output::print_header("Relaxation History");

    if !args.log.exists() {
        return Err(FixpressError::FileNotFound {
            path: args.log.display().to_string(),
        });
    }

    let config = optional_config(&args.target, parent_dir(&args.log))?;
    let markers = config
        .as_ref()
        .map(|c| c.markers.clone())
        .unwrap_or_default();

    let text = fs::read_to_string(&args.log).map_err(|e| FixpressError::FileReadError {
        path: args.log.display().to_string(),
        source: e,
    })?;
    let records = parse_stress_log(&text, &markers.stress)?;

    if records.is_empty() {
        output::print_warning("No stress records found in the log.");
        return Ok(());
    }

    let target = config.as_ref().map(|c| c.target);
    let rows = build_rows(&records, target.as_ref());
    println!("{}", Table::new(&rows));

    match terminal_note(&text, &markers.stress) {
        Some(note) => output::print_info(&format!("Final status: {}", note)),
        None => output::print_info("No terminal status recorded (run still in progress?)"),
    }

    if let Some(ref csv_path) = args.csv {
        save_history_csv(&rows, csv_path)?;
        output::print_success(&format!("History saved to '{}'", csv_path.display()));
    }

    if let Some(ref plot_path) = args.plot {
        let cfg = config.as_ref().ok_or_else(|| {
            FixpressError::InvalidArgument(
                "--plot needs a target (--target or a configuration file)".to_string(),
            )
        })?;
        let points: Vec<(usize, f64)> = rows
            .iter()
            .filter_map(|r| r.max_abs_error.map(|e| (r.iteration, e)))
            .collect();
        plot::generate_convergence_plot(&points, Some(cfg.threshold), plot_path)?;
        output::print_success(&format!(
            "Convergence plot saved to '{}'",
            plot_path.display()
        ));
    }

    Ok(())
}

/// 保存历史到 CSV
fn save_history_csv(rows: &[HistoryRow], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| FixpressError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::TargetArgs;

    const LOG: &str = "starting calculation
  in kB      70.00000     0.00000     0.00000     0.00000     0.00000     0.00000
  in kB     112.00000     0.00000     0.00000     0.00000     0.00000     0.00000
convergence reached at iteration 2
";

    #[test]
    fn test_rows_compute_error_against_target() {
        let records = parse_stress_log(LOG, "in kB").unwrap();
        let target = StressTensor::new([120.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let rows = build_rows(&records, Some(&target));
        assert_eq!(rows.len(), 2);
        assert!((rows[0].max_abs_error.unwrap() - 50.0).abs() < 1e-9);
        assert!((rows[1].max_abs_error.unwrap() - 8.0).abs() < 1e-9);

        let bare = build_rows(&records, None);
        assert!(bare[0].max_abs_error.is_none());
    }

    #[test]
    fn test_history_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("pressure.all");
        let csv_path = dir.path().join("history.csv");
        fs::write(&log, LOG).unwrap();

        execute(HistoryArgs {
            log,
            target: TargetArgs {
                target: Some(StressTensor::new([120.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
                ..Default::default()
            },
            csv: Some(csv_path.clone()),
            plot: None,
        })
        .unwrap();

        let content = fs::read_to_string(csv_path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("iteration,xx,yy,zz,xy,yz,zx,max_abs_error")
        );
        assert!(lines.next().unwrap().starts_with("1,70.0,"));
    }

    #[test]
    fn test_plot_without_target_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("pressure.all");
        fs::write(&log, LOG).unwrap();

        let err = execute(HistoryArgs {
            log,
            target: TargetArgs::default(),
            csv: None,
            plot: Some(dir.path().join("plot.png")),
        })
        .unwrap_err();
        assert!(matches!(err, FixpressError::InvalidArgument(_)));
    }
}
