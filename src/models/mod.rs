//! # 数据模型模块
//!
//! 定义应力张量、弹性参数、晶格矩阵和模拟结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `relax/` 和 `commands/` 使用
//! - 子模块: stress, elastic, lattice, outcome

pub mod elastic;
pub mod lattice;
pub mod outcome;
pub mod stress;

pub use elastic::ElasticParameters;
pub use lattice::{LatticeMatrix, Matrix3, IDENTITY};
pub use outcome::SimulationOutcome;
pub use stress::{StressTensor, VOIGT_LABELS};
