//! # 单次模拟结果
//!
//! 每次调用外部模拟器后产生一次，当轮迭代消费后即丢弃。
//!
//! ## 依赖关系
//! - 被 `parsers/outcar.rs` 产生
//! - 被 `relax/controller.rs` 消费

use super::StressTensor;

/// 模拟器一次运行的结果
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// 计算是否完成（日志中存在完成标记）
    pub completed: bool,

    /// 测得的应力，仅在 completed 为 true 时有效
    pub measured_stress: Option<StressTensor>,

    /// 应力记录的原始行，用于写入运行日志
    pub stress_line: Option<String>,
}

impl SimulationOutcome {
    /// 已完成的运行
    pub fn completed(stress: StressTensor) -> Self {
        SimulationOutcome {
            completed: true,
            measured_stress: Some(stress),
            stress_line: None,
        }
    }

    /// 未完成的运行
    pub fn incomplete() -> Self {
        SimulationOutcome {
            completed: false,
            measured_stress: None,
            stress_line: None,
        }
    }

    pub fn with_stress_line(mut self, line: impl Into<String>) -> Self {
        self.stress_line = Some(line.into());
        self
    }
}
