//! # 弹性修正模型
//!
//! 由应力误差（目标 − 测量，Voigt 顺序）按各向同性广义胡克定律反推修正应变：
//!
//! ```text
//! ε_xx = (Δσ_xx − v (Δσ_yy + Δσ_zz)) / (−E)
//! ε_xy = Δσ_xy / (−G) / 2          (yz -> (1,2), zx -> (0,2))
//! ```
//!
//! 分母中的负号不可省略：VASP 以压缩为正，而胡克定律以拉伸为正。
//! 去掉负号会使反馈方向反转，导致发散。
//!
//! ## 依赖关系
//! - 被 `relax/controller.rs`, `commands/correct.rs` 使用
//! - 使用 `models/`

use crate::models::{ElasticParameters, Matrix3, StressTensor, IDENTITY};

/// 对称的 3x3 修正应变矩阵 (无量纲)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionMatrix(Matrix3);

impl CorrectionMatrix {
    pub fn matrix(&self) -> &Matrix3 {
        &self.0
    }

    /// 施加阻尼后的变形矩阵 I + C · damping
    pub fn deformation(&self, damping: f64) -> Matrix3 {
        let mut out = IDENTITY;
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v += self.0[i][j] * damping;
            }
        }
        out
    }

    pub fn is_symmetric(&self) -> bool {
        (0..3).all(|i| (0..3).all(|j| self.0[i][j] == self.0[j][i]))
    }
}

/// 计算修正应变
pub fn compute_correction(error: &StressTensor, params: &ElasticParameters) -> CorrectionMatrix {
    let e = error.components();
    let young = params.young();
    let v = params.poisson();
    let shear = params.shear();

    let mut m = [[0.0; 3]; 3];

    // 正应变: 轴 i 与另外两轴 (j, k)
    for (i, j, k) in [(0, 1, 2), (1, 0, 2), (2, 1, 0)] {
        m[i][i] = (e[i] - v * (e[j] + e[k])) / (-young);
    }

    // 剪切应变: xy -> (0,1), yz -> (1,2), zx -> (0,2)
    for (voigt, (i, j)) in [(3, (0, 1)), (4, (1, 2)), (5, (0, 2))] {
        let strain = e[voigt] / (-shear) / 2.0;
        m[i][j] = strain;
        m[j][i] = strain;
    }

    CorrectionMatrix(m)
}
