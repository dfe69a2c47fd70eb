//! # VASP POSCAR 晶格编辑
//!
//! 只读写 POSCAR/CONTCAR 的晶格部分（第 3-5 行），其余行保持逐字节不变。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a   <- 第 3 行
//! b1 b2 b3               # lattice vector b   <- 第 4 行
//! c1 c2 c3               # lattice vector c   <- 第 5 行
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ```
//!
//! 缩放因子不参与计算：修正是乘性的，直接作用于文件中写出的向量。
//!
//! ## 依赖关系
//! - 被 `relax/backend.rs`, `commands/correct.rs`, `commands/snapshots.rs` 使用
//! - 使用 `models/lattice.rs`

use crate::error::{FixpressError, Result};
use crate::models::LatticeMatrix;

use std::fs;
use std::path::Path;

/// 晶格向量所在行 (0-based)
const LATTICE_LINES: std::ops::Range<usize> = 2..5;

fn parse_error(path: &str, reason: String) -> FixpressError {
    FixpressError::ParseError {
        format: "poscar".to_string(),
        path: path.to_string(),
        reason,
    }
}

/// 从文本中读取晶格矩阵
pub fn read_lattice(content: &str) -> Result<LatticeMatrix> {
    read_lattice_named(content, "<memory>")
}

fn read_lattice_named(content: &str, name: &str) -> Result<LatticeMatrix> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < LATTICE_LINES.end {
        return Err(parse_error(name, "File too short".to_string()));
    }

    let mut rows = [[0.0; 3]; 3];
    for (row, idx) in rows.iter_mut().zip(LATTICE_LINES) {
        *row = parse_vector(lines[idx]).ok_or_else(|| {
            parse_error(name, format!("Invalid lattice vector at line {}", idx + 1))
        })?;
    }

    Ok(LatticeMatrix::from_rows(rows))
}

fn parse_vector(line: &str) -> Option<[f64; 3]> {
    let parts: Vec<f64> = line
        .split_whitespace()
        .take(3)
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<_>>()?;
    if parts.len() < 3 {
        return None;
    }
    Some([parts[0], parts[1], parts[2]])
}

/// 格式化单个晶格向量行
fn format_vector(v: &[f64; 3]) -> String {
    format!("  {:20.14}  {:20.14}  {:20.14}", v[0], v[1], v[2])
}

/// 用新的晶格矩阵替换第 3-5 行，保持其余行（包括换行符）不变
pub fn replace_lattice(content: &str, lattice: &LatticeMatrix) -> Result<String> {
    // 先校验原晶格行，防止把损坏的文件当作模板
    read_lattice(content)?;

    let mut out = String::with_capacity(content.len());
    for (idx, segment) in content.split_inclusive('\n').enumerate() {
        if LATTICE_LINES.contains(&idx) {
            let body = segment.trim_end_matches(['\n', '\r']);
            let ending = &segment[body.len()..];
            out.push_str(&format_vector(&lattice.rows[idx - LATTICE_LINES.start]));
            out.push_str(ending);
        } else {
            out.push_str(segment);
        }
    }

    Ok(out)
}

/// 读取结构文件的晶格矩阵
pub fn read_lattice_file(path: &Path) -> Result<LatticeMatrix> {
    let content = read_structure_text(path)?;
    read_lattice_named(&content, &path.display().to_string())
}

/// 读取结构文件全文
pub fn read_structure_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| FixpressError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 将模板中的晶格替换后写入目标路径
pub fn write_with_lattice(template: &str, lattice: &LatticeMatrix, dest: &Path) -> Result<()> {
    let content = replace_lattice(template, lattice)?;
    fs::write(dest, content).map_err(|e| FixpressError::FileWriteError {
        path: dest.display().to_string(),
        source: e,
    })
}
