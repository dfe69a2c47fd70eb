//! # 运行日志解析器
//!
//! 解析 `relax` 累积写出的应力日志 (默认 `pressure.all`)。
//!
//! ```text
//! starting calculation
//!   in kB      70.12345    -1.50000     2.25000     0.10000    -0.20000     0.30000
//!   in kB     112.00000    -0.50000     0.25000     0.01000    -0.02000     0.03000
//! convergence reached at iteration 3
//! ```
//!
//! 第 n 条记录对应第 n 次迭代读取到的应力（第 1 条来自初始运行）。
//!
//! ## 依赖关系
//! - 被 `commands/history.rs` 使用
//! - 使用 `parsers/outcar.rs` 的单行解析

use super::outcar::parse_stress_line;
use crate::error::Result;
use crate::models::StressTensor;

/// 日志中的一条应力记录
#[derive(Debug, Clone, PartialEq)]
pub struct StressRecord {
    /// 迭代序号 (1-based)
    pub cycle: usize,
    pub stress: StressTensor,
}

/// 解析整份应力日志
pub fn parse_stress_log(text: &str, marker: &str) -> Result<Vec<StressRecord>> {
    text.lines()
        .filter(|line| line.contains(marker))
        .enumerate()
        .map(|(i, line)| {
            Ok(StressRecord {
                cycle: i + 1,
                stress: parse_stress_line(line, marker)?,
            })
        })
        .collect()
}

/// 日志最后的说明行（终止状态）
pub fn terminal_note<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let last = text.lines().rev().find(|l| !l.trim().is_empty())?;
    if last.contains(marker) {
        None
    } else {
        Some(last.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::outcar::STRESS_MARKER;

    const LOG: &str = "starting calculation
  in kB      70.00000     0.00000     0.00000     0.00000     0.00000     0.00000
  in kB     112.00000     0.00000     0.00000     0.00000     0.00000     0.00000
  in kB     119.95000     0.00000     0.00000     0.00000     0.00000     0.00000
convergence reached at iteration 3
";

    #[test]
    fn test_parse_stress_log() {
        let records = parse_stress_log(LOG, STRESS_MARKER).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].cycle, 1);
        assert_eq!(records[2].cycle, 3);
        assert!((records[2].stress.components()[0] - 119.95).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_note() {
        assert_eq!(
            terminal_note(LOG, STRESS_MARKER),
            Some("convergence reached at iteration 3")
        );
        let running = "starting calculation\n  in kB  1 2 3 4 5 6\n";
        assert_eq!(terminal_note(running, STRESS_MARKER), None);
    }

    #[test]
    fn test_corrupt_record_fails() {
        let log = "starting calculation\n  in kB  1 2 3\n";
        assert!(parse_stress_log(log, STRESS_MARKER).is_err());
    }
}
