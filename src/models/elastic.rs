//! # 弹性常数
//!
//! 各向同性线弹性参数：杨氏模量 E、泊松比 v，剪切模量 G = E / (2 + 2v) 始终由 (E, v) 推导。
//!
//! ## 依赖关系
//! - 被 `config/`, `relax/elasticity.rs` 使用

use crate::error::{FixpressError, Result};
use serde::Serialize;

/// 各向同性弹性参数 (单位 kB)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElasticParameters {
    young: f64,
    poisson: f64,
    shear: f64,
}

impl ElasticParameters {
    /// 创建并校验弹性参数
    pub fn new(young: f64, poisson: f64) -> Result<Self> {
        if !young.is_finite() || young <= 0.0 {
            return Err(FixpressError::Config(format!(
                "Young's modulus must be a positive number of kB, got {}",
                young
            )));
        }
        if !poisson.is_finite() || poisson <= -1.0 || poisson >= 0.5 {
            return Err(FixpressError::Config(format!(
                "Poisson ratio must lie in (-1, 0.5), got {}",
                poisson
            )));
        }
        if poisson < 0.0 {
            tracing::warn!(poisson, "negative Poisson ratio (auxetic material)");
        }

        Ok(ElasticParameters {
            young,
            poisson,
            shear: young / (2.0 + 2.0 * poisson),
        })
    }

    pub fn young(&self) -> f64 {
        self.young
    }

    pub fn poisson(&self) -> f64 {
        self.poisson
    }

    /// 剪切模量 G
    pub fn shear(&self) -> f64 {
        self.shear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shear_modulus_derived() {
        let p = ElasticParameters::new(2790.0, 0.21).unwrap();
        assert!((p.shear() - 2790.0 / 2.42).abs() < 1e-9);

        let p0 = ElasticParameters::new(1000.0, 0.0).unwrap();
        assert!((p0.shear() - 500.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_constants_rejected() {
        assert!(ElasticParameters::new(0.0, 0.2).is_err());
        assert!(ElasticParameters::new(-10.0, 0.2).is_err());
        assert!(ElasticParameters::new(f64::NAN, 0.2).is_err());
        assert!(ElasticParameters::new(100.0, 0.5).is_err());
        assert!(ElasticParameters::new(100.0, -1.0).is_err());
        assert!(ElasticParameters::new(100.0, -0.2).is_ok());
    }
}
