//! # 晶格矩阵数据模型
//!
//! 3x3 晶格矩阵，行向量表示 a, b, c（与 POSCAR 第 3-5 行一致）。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs`, `relax/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 3x3 实矩阵
pub type Matrix3 = [[f64; 3]; 3];

/// 单位矩阵
pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// 矩阵乘法 a · b
pub fn mat_mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// 晶格矩阵
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeMatrix {
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub rows: Matrix3,
}

impl LatticeMatrix {
    pub fn from_rows(rows: Matrix3) -> Self {
        LatticeMatrix { rows }
    }

    /// 右乘变换矩阵: 每个基矢 (行) 都被变换
    pub fn transformed(&self, deformation: &Matrix3) -> Self {
        LatticeMatrix {
            rows: mat_mul(&self.rows, deformation),
        }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.rows;

        let norm = |v: [f64; 3]| (v[0].powi(2) + v[1].powi(2) + v[2].powi(2)).sqrt();
        let dot = |u: [f64; 3], v: [f64; 3]| u.iter().zip(v.iter()).map(|(x, y)| x * y).sum::<f64>();

        let a = norm(a_vec);
        let b = norm(b_vec);
        let c = norm(c_vec);

        let alpha = (dot(b_vec, c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(a_vec, c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(a_vec, b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积 (行列式)
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.rows;
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 逐元素比较
    pub fn approx_eq(&self, other: &LatticeMatrix, tol: f64) -> bool {
        self.rows
            .iter()
            .flatten()
            .zip(other.rows.iter().flatten())
            .all(|(x, y)| (x - y).abs() <= tol)
    }
}
