//! # 应力张量数据模型
//!
//! Voigt 记号下的 6 分量应力张量，顺序为 xx yy zz xy yz zx，单位 kB。
//!
//! 注意 VASP 的符号约定：压缩为正（与连续介质力学的拉伸为正相反）。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `relax/`, `config/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// Voigt 分量标签
pub const VOIGT_LABELS: [&str; 6] = ["xx", "yy", "zz", "xy", "yz", "zx"];

/// 应力张量 (kB)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StressTensor([f64; 6]);

impl StressTensor {
    pub const ZERO: StressTensor = StressTensor([0.0; 6]);

    pub fn new(components: [f64; 6]) -> Self {
        StressTensor(components)
    }

    /// Voigt 顺序的分量
    pub fn components(&self) -> [f64; 6] {
        self.0
    }

    /// 各分量绝对值的最大值
    pub fn max_abs(&self) -> f64 {
        self.0.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
    }

    /// 静水压 (三个正应力分量的平均)
    pub fn hydrostatic(&self) -> f64 {
        (self.0[0] + self.0[1] + self.0[2]) / 3.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }
}

impl Sub for StressTensor {
    type Output = StressTensor;

    fn sub(self, rhs: StressTensor) -> StressTensor {
        let mut out = [0.0; 6];
        for (i, v) in out.iter_mut().enumerate() {
            *v = self.0[i] - rhs.0[i];
        }
        StressTensor(out)
    }
}

impl fmt::Display for StressTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| format!("{:.5}", v)).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// 解析逗号分隔的 6 分量张量 (e.g., "120,0,0,0,0,0")
pub fn parse_voigt_list(s: &str) -> std::result::Result<StressTensor, String> {
    let values: Vec<f64> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", t))
        })
        .collect::<std::result::Result<_, _>>()?;

    if values.len() != 6 {
        return Err(format!(
            "expected 6 components (xx,yy,zz,xy,yz,zx), got {}",
            values.len()
        ));
    }

    let mut arr = [0.0; 6];
    arr.copy_from_slice(&values);
    Ok(StressTensor(arr))
}
