//! # snapshots 命令实现
//!
//! 列出每次迭代存档的结构 (`poscar.<n>`) 及其晶格参数与体积变化。
//!
//! ## 依赖关系
//! - 使用 `cli/snapshots.rs` 定义的参数
//! - 使用 `parsers/poscar.rs`, `utils/output.rs`
//! - 使用 `glob` 匹配存档文件

use crate::cli::snapshots::SnapshotsArgs;
use crate::error::{FixpressError, Result};
use crate::models::LatticeMatrix;
use crate::parsers::poscar;
use crate::utils::output;

use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 存档表格行
#[derive(Debug, Clone, Tabled)]
struct SnapshotRow {
    #[tabled(rename = "Iter")]
    iteration: usize,
    #[tabled(rename = "a")]
    a: String,
    #[tabled(rename = "b")]
    b: String,
    #[tabled(rename = "c")]
    c: String,
    #[tabled(rename = "α")]
    alpha: String,
    #[tabled(rename = "β")]
    beta: String,
    #[tabled(rename = "γ")]
    gamma: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "ΔV (%)")]
    delta_v: String,
}

/// 收集存档文件，按迭代序号排序
pub(crate) fn collect_snapshots(dir: &Path, prefix: &str) -> Result<Vec<(usize, PathBuf)>> {
    let pattern = format!(
        "{}/{}.*",
        glob::Pattern::escape(&dir.display().to_string()),
        glob::Pattern::escape(prefix)
    );

    let entries = glob::glob(&pattern).map_err(|e| {
        FixpressError::InvalidArgument(format!("Invalid pattern '{}': {}", pattern, e))
    })?;

    let mut snapshots: Vec<(usize, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter(|p| p.is_file())
        .filter_map(|p| {
            let suffix = p.file_name()?.to_str()?.strip_prefix(prefix)?.strip_prefix('.')?;
            suffix.parse::<usize>().ok().map(|n| (n, p.clone()))
        })
        .collect();

    snapshots.sort_by_key(|(n, _)| *n);
    Ok(snapshots)
}

fn build_row(iteration: usize, lattice: &LatticeMatrix, reference_volume: f64) -> SnapshotRow {
    let (a, b, c, alpha, beta, gamma) = lattice.parameters();
    let volume = lattice.volume().abs();
    SnapshotRow {
        iteration,
        a: format!("{:.6}", a),
        b: format!("{:.6}", b),
        c: format!("{:.6}", c),
        alpha: format!("{:.3}", alpha),
        beta: format!("{:.3}", beta),
        gamma: format!("{:.3}", gamma),
        volume: format!("{:.4}", volume),
        delta_v: format!("{:+.3}", (volume / reference_volume - 1.0) * 100.0),
    }
}

/// 执行 snapshots 命令
pub fn execute(args: SnapshotsArgs) -> Result<()> {
    output::print_header("Archived Structures");

    if !args.dir.is_dir() {
        return Err(FixpressError::DirectoryNotFound {
            path: args.dir.display().to_string(),
        });
    }

    let snapshots = collect_snapshots(&args.dir, &args.prefix)?;
    if snapshots.is_empty() {
        output::print_warning(&format!(
            "No '{}.<n>' files found in '{}'",
            args.prefix,
            args.dir.display()
        ));
        return Ok(());
    }

    let mut rows = Vec::with_capacity(snapshots.len());
    let mut reference_volume = None;
    for (iteration, path) in &snapshots {
        match poscar::read_lattice_file(path) {
            Ok(lattice) => {
                let v0 = *reference_volume.get_or_insert(lattice.volume().abs());
                rows.push(build_row(*iteration, &lattice, v0));
            }
            Err(e) => output::print_warning(&format!("Skipping {}: {}", path.display(), e)),
        }
    }

    println!("{}", Table::new(&rows));
    output::print_done(&format!("{} snapshots", rows.len()));
    Ok(())
}
