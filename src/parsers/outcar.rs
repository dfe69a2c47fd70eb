//! # VASP OUTCAR 解析器
//!
//! 从 OUTCAR 文本中提取控制循环需要的两个事实：
//! - 计算是否完成（最后一次出现的完成标记）
//! - 最后一条 `in kB` 应力记录（Voigt 顺序 xx yy zz xy yz zx）
//!
//! 解析函数是纯函数，不依赖文件 I/O，便于单元测试。
//!
//! ## 依赖关系
//! - 被 `relax/backend.rs`, `commands/stress.rs`, `commands/correct.rs` 使用
//! - 使用 `models/outcome.rs`, `models/stress.rs`

use crate::error::{FixpressError, Result};
use crate::models::{SimulationOutcome, StressTensor};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// 默认完成标记
pub const COMPLETION_MARKER: &str = "Total CPU time used (sec):";

/// 默认应力记录标记
pub const STRESS_MARKER: &str = "in kB";

/// 日志标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    pub completion: String,
    pub stress: String,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            completion: COMPLETION_MARKER.to_string(),
            stress: STRESS_MARKER.to_string(),
        }
    }
}

fn number_pattern() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| {
        Regex::new(r"[-+]?(?:\d+\.\d*|\.\d+|\d+)(?:[eEdD][-+]?\d+)?")
            .expect("number pattern is valid")
    })
}

/// 解析 OUTCAR 文本，得到本次模拟结果
///
/// 没有完成标记时返回 `completed = false`；
/// 有完成标记但应力记录缺失或损坏时返回 `StressParse` 错误。
pub fn parse_outcome(text: &str, markers: &Markers) -> Result<SimulationOutcome> {
    if !is_completed(text, markers) {
        return Ok(SimulationOutcome::incomplete());
    }

    let line = last_line_containing(text, &markers.stress).ok_or_else(|| {
        FixpressError::StressParse {
            line: String::new(),
            reason: format!("no '{}' record found in a completed run", markers.stress),
        }
    })?;

    let stress = parse_stress_line(line, &markers.stress)?;
    Ok(SimulationOutcome::completed(stress).with_stress_line(line))
}

/// 读取 OUTCAR 文件；文件不存在视为未完成
pub fn read_outcome(path: &Path, markers: &Markers) -> Result<SimulationOutcome> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "simulator log missing, treating run as incomplete");
        return Ok(SimulationOutcome::incomplete());
    }

    let text = fs::read_to_string(path).map_err(|e| FixpressError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_outcome(&text, markers)
}

/// 检查是否存在完成标记
pub fn is_completed(text: &str, markers: &Markers) -> bool {
    last_line_containing(text, &markers.completion).is_some()
}

/// 从尾部搜索最后一条包含标记的行
pub fn last_line_containing<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.lines().rev().find(|line| line.contains(marker))
}

/// 解析单条应力记录
///
/// ```text
///   in kB      -5.12345    -5.12345    -5.12345     0.00000     0.00000     0.00000
/// ```
///
/// 大数值时 VASP 可能输出粘连的字段 (`-1234.56789-1234.56789`)，这里会正确拆分；
/// 溢出的 `*******` 字段视为损坏。
pub fn parse_stress_line(line: &str, marker: &str) -> Result<StressTensor> {
    let fail = |reason: String| FixpressError::StressParse {
        line: line.trim_end().to_string(),
        reason,
    };

    let start = line
        .find(marker)
        .ok_or_else(|| fail(format!("marker '{}' not present", marker)))?;
    let rest = &line[start + marker.len()..];

    let mut values = Vec::with_capacity(6);
    let mut cursor = 0;
    for m in number_pattern().find_iter(rest) {
        let gap = &rest[cursor..m.start()];
        if !gap.trim().is_empty() {
            return Err(fail(format!("unexpected text '{}'", gap.trim())));
        }
        // 粘连字段只能在显式符号处拆分
        if !values.is_empty() && gap.is_empty() && !m.as_str().starts_with(['-', '+']) {
            return Err(fail(format!(
                "malformed number '{}{}'",
                rest[..cursor].split_whitespace().last().unwrap_or_default(),
                m.as_str()
            )));
        }
        let token = m.as_str().replace(['d', 'D'], "e");
        let value: f64 = token
            .parse()
            .map_err(|_| fail(format!("'{}' is not a number", m.as_str())))?;
        if !value.is_finite() {
            return Err(fail(format!("'{}' is not finite", m.as_str())));
        }
        values.push(value);
        cursor = m.end();
    }

    let tail = rest[cursor..].trim();
    if !tail.is_empty() {
        return Err(fail(format!("unexpected text '{}'", tail)));
    }

    if values.len() < 6 {
        return Err(fail(format!(
            "expected 6 numeric fields, found {}",
            values.len()
        )));
    }
    if values.len() > 6 {
        tracing::debug!(extra = values.len() - 6, "ignoring trailing stress fields");
    }

    let mut arr = [0.0; 6];
    arr.copy_from_slice(&values[..6]);
    Ok(StressTensor::new(arr))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINISHED: &str = "\
  FORCE on cell =-STRESS in cart. coord.  units (eV):
  Direction    XX          YY          ZZ          XY          YZ          ZX
  --------------------------------------------------------------------------------------
  Total       1.2         1.2         1.2         0.0         0.0         0.0
  in kB      10.00000    11.00000    12.00000     0.00000     0.00000     0.00000
  external pressure =       11.00 kB  Pullay stress =        0.00 kB
  Total       1.3         1.3         1.3         0.0         0.0         0.0
  in kB      70.12345    -1.50000     2.25000     0.10000    -0.20000     0.30000
  external pressure =       23.62 kB  Pullay stress =        0.00 kB

 General timing and accounting informations for this job:
 ========================================================

                  Total CPU time used (sec):      123.456
                            User time (sec):      120.000
";

    #[test]
    fn test_completed_run_uses_last_stress_record() {
        let outcome = parse_outcome(FINISHED, &Markers::default()).unwrap();
        assert!(outcome.completed);
        assert_eq!(
            outcome.measured_stress.unwrap().components(),
            [70.12345, -1.5, 2.25, 0.1, -0.2, 0.3]
        );
        assert!(outcome.stress_line.unwrap().contains("70.12345"));
    }

    #[test]
    fn test_missing_completion_marker_is_incomplete() {
        let text = "  in kB      1.0 2.0 3.0 0.0 0.0 0.0\n running ionic step 4\n";
        let outcome = parse_outcome(text, &Markers::default()).unwrap();
        assert!(!outcome.completed);
        assert!(outcome.measured_stress.is_none());
    }

    #[test]
    fn test_completed_without_stress_is_parse_failure() {
        let text = "Total CPU time used (sec):  1.0\n";
        let err = parse_outcome(text, &Markers::default()).unwrap_err();
        assert!(matches!(err, FixpressError::StressParse { .. }));
    }

    #[test]
    fn test_short_record_is_parse_failure() {
        let err = parse_stress_line("  in kB   1.0  2.0  3.0", STRESS_MARKER).unwrap_err();
        assert!(matches!(err, FixpressError::StressParse { .. }));
    }

    #[test]
    fn test_overflow_stars_are_parse_failure() {
        let line = "  in kB   *********  2.0  3.0  0.0  0.0  0.0";
        assert!(parse_stress_line(line, STRESS_MARKER).is_err());
    }

    #[test]
    fn test_fused_fields_are_split() {
        let line = "  in kB  -1234.56789-2345.67891 -3456.78912     0.00000     1.00000    -2.00000";
        let s = parse_stress_line(line, STRESS_MARKER).unwrap();
        assert_eq!(
            s.components(),
            [-1234.56789, -2345.67891, -3456.78912, 0.0, 1.0, -2.0]
        );
    }

    #[test]
    fn test_double_decimal_point_is_parse_failure() {
        let line = "  in kB  1.2.3  2.0  3.0  4.0  5.0  6.0";
        let err = parse_stress_line(line, STRESS_MARKER).unwrap_err();
        assert!(matches!(err, FixpressError::StressParse { .. }));
    }

    #[test]
    fn test_unsigned_fusion_is_parse_failure() {
        // 无符号边界的粘连无法可靠拆分
        for line in [
            "  in kB  1.0  2.0  3.0  4.0  5.0  6.0.5",
            "  in kB  1.0  2.0  3.0  4.0  5.0e1.5  6.0",
            "  in kB  1.0  2.0  3.0  4.0  5.0  6.0x",
        ] {
            assert!(
                matches!(
                    parse_stress_line(line, STRESS_MARKER),
                    Err(FixpressError::StressParse { .. })
                ),
                "accepted: {}",
                line
            );
        }
    }

    #[test]
    fn test_malformed_record_fails_completed_run() {
        let text = "  in kB  1.2.3  2.0  3.0  4.0  5.0  6.0\nTotal CPU time used (sec): 1.0\n";
        assert!(matches!(
            parse_outcome(text, &Markers::default()),
            Err(FixpressError::StressParse { .. })
        ));
    }

    #[test]
    fn test_custom_markers() {
        let markers = Markers {
            completion: "DONE".to_string(),
            stress: "stress/kB:".to_string(),
        };
        let text = "stress/kB: 1 2 3 4 5 6\nDONE\n";
        let outcome = parse_outcome(text, &markers).unwrap();
        assert_eq!(
            outcome.measured_stress.unwrap().components(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn test_read_outcome_missing_file_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = read_outcome(&dir.path().join("OUTCAR"), &Markers::default()).unwrap();
        assert!(!outcome.completed);
    }
}
