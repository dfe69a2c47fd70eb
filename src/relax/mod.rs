//! # 弛豫模块
//!
//! 应力目标弛豫的核心：弹性修正模型、迭代控制器和 VASP 后端。
//!
//! ## 控制流
//! ```text
//! VaspBackend::start ──> read_outcome ──> RelaxationController::advance
//!                           ^                   │ Apply: compute_correction, L ← L · (I + C·d)
//!                           └──── submit <──────┘ Finished: Converged / Aborted / Exhausted
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/relax.rs`, `commands/correct.rs` 使用
//! - 子模块: elasticity, controller, backend

pub mod backend;
pub mod controller;
pub mod elasticity;

pub use backend::VaspBackend;
pub use controller::{
    damping_coefficient, AbortReason, ControllerSettings, CycleRecord, RelaxReport, RelaxState,
    RelaxationController, SimulationBackend, Step,
};
pub use elasticity::{compute_correction, CorrectionMatrix};
