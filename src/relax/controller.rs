//! # 弛豫控制器
//!
//! 迭代状态机：读取上一次模拟结果 → 计算误差 → 判断收敛 → 计算阻尼修正 → 更新晶格 → 再次模拟。
//!
//! ## 状态
//! - `Running`: 循环进行中
//! - `Converged`: max |误差| 小于阈值（唯一的成功出口）
//! - `Aborted(Incomplete)`: 上一次模拟未完成，立即终止，不重试
//! - `Exhausted`: 迭代次数超过上限
//!
//! 阻尼系数 `1 − i / max` 只依赖迭代序号，在 i = max 时恰好为 0。
//! 修正只在 i ≤ max 时施加；最后一次修正之后的模拟结果仍会被检查收敛。
//!
//! ## 依赖关系
//! - 被 `commands/relax.rs`, `commands/correct.rs` 使用
//! - 使用 `relax/elasticity.rs`, `models/`, `config/`

use super::elasticity::{compute_correction, CorrectionMatrix};
use crate::config::RelaxConfig;
use crate::error::{FixpressError, Result};
use crate::models::{ElasticParameters, LatticeMatrix, SimulationOutcome, StressTensor};

/// 阻尼系数 max(0, 1 − iteration / max_iterations)
pub fn damping_coefficient(iteration: usize, max_iterations: usize) -> f64 {
    (1.0 - iteration as f64 / max_iterations as f64).max(0.0)
}

/// 异常终止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// 模拟日志中没有完成标记
    Incomplete,
}

/// 控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxState {
    Running,
    Converged,
    Aborted(AbortReason),
    Exhausted,
}

impl RelaxState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RelaxState::Running)
    }
}

impl std::fmt::Display for RelaxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelaxState::Running => write!(f, "running"),
            RelaxState::Converged => write!(f, "converged"),
            RelaxState::Aborted(AbortReason::Incomplete) => write!(f, "aborted (incomplete run)"),
            RelaxState::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// 迭代状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationState {
    pub iteration: usize,
    pub max_iterations: usize,
    pub damping: f64,
}

impl IterationState {
    fn new(max_iterations: usize) -> Self {
        IterationState {
            iteration: 0,
            max_iterations,
            damping: 1.0,
        }
    }

    fn increment(&mut self) {
        self.iteration += 1;
        self.damping = damping_coefficient(self.iteration, self.max_iterations);
    }
}

/// 控制器常量
#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub target: StressTensor,
    pub threshold: f64,
    pub elastic: ElasticParameters,
    pub max_iterations: usize,
}

impl From<&RelaxConfig> for ControllerSettings {
    fn from(config: &RelaxConfig) -> Self {
        ControllerSettings {
            target: config.target,
            threshold: config.threshold,
            elastic: config.elastic,
            max_iterations: config.max_iterations,
        }
    }
}

/// 单次迭代的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// 晶格已更新，需要写出结构并再次模拟
    Apply {
        correction: CorrectionMatrix,
        lattice: LatticeMatrix,
    },
    /// 进入终止状态
    Finished(RelaxState),
}

/// 单次迭代记录
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRecord {
    pub iteration: usize,
    pub damping: f64,
    pub measured: Option<StressTensor>,
    pub error: Option<StressTensor>,
    /// 本次迭代施加修正后的晶格
    pub lattice: Option<LatticeMatrix>,
    pub state: RelaxState,
}

/// 一次弛豫运行的总结
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxReport {
    pub state: RelaxState,
    pub iteration: usize,
    pub max_iterations: usize,
    pub corrections_applied: usize,
    pub lattice: LatticeMatrix,
    pub last_stress: Option<StressTensor>,
    pub last_max_abs_error: Option<f64>,
}

/// 外部协作者：写结构、调用模拟器、读取结果
pub trait SimulationBackend {
    /// 放置初始结构并运行首次模拟
    fn start(&mut self) -> Result<()>;

    /// 读取最近一次模拟的结果
    fn read_outcome(&mut self, iteration: usize) -> Result<SimulationOutcome>;

    /// 写出新结构、存档并运行模拟
    fn submit(&mut self, lattice: &LatticeMatrix, iteration: usize) -> Result<()>;

    /// 记录终止状态并做收尾清理
    fn finish(&mut self, _report: &RelaxReport) -> Result<()> {
        Ok(())
    }
}

/// 弛豫控制器
#[derive(Debug, Clone)]
pub struct RelaxationController {
    settings: ControllerSettings,
    state: IterationState,
    lattice: LatticeMatrix,
    status: RelaxState,
    corrections: usize,
    last_stress: Option<StressTensor>,
    last_max_abs_error: Option<f64>,
}

impl RelaxationController {
    pub fn new(settings: ControllerSettings, lattice: LatticeMatrix) -> Self {
        RelaxationController {
            state: IterationState::new(settings.max_iterations),
            settings,
            lattice,
            status: RelaxState::Running,
            corrections: 0,
            last_stress: None,
            last_max_abs_error: None,
        }
    }

    pub fn from_config(config: &RelaxConfig, lattice: LatticeMatrix) -> Self {
        Self::new(ControllerSettings::from(config), lattice)
    }

    /// 从第 `iteration` 次迭代开始（用于离线单步修正）
    pub fn starting_at(mut self, iteration: usize) -> Self {
        self.state.iteration = iteration.saturating_sub(1);
        self.state.damping = damping_coefficient(self.state.iteration, self.settings.max_iterations);
        self
    }

    pub fn iteration_state(&self) -> &IterationState {
        &self.state
    }

    /// 执行一次迭代
    pub fn advance(&mut self, outcome: &SimulationOutcome) -> Result<Step> {
        if self.status.is_terminal() {
            return Ok(Step::Finished(self.status));
        }

        self.state.increment();
        let iteration = self.state.iteration;

        if !outcome.completed {
            tracing::warn!(iteration, "previous simulation did not complete");
            return Ok(self.terminate(RelaxState::Aborted(AbortReason::Incomplete)));
        }

        let measured = outcome.measured_stress.ok_or_else(|| FixpressError::StressParse {
            line: outcome.stress_line.clone().unwrap_or_default(),
            reason: "completed run carried no stress tensor".to_string(),
        })?;
        if !measured.is_finite() {
            return Err(FixpressError::StressParse {
                line: outcome.stress_line.clone().unwrap_or_default(),
                reason: "non-finite stress component".to_string(),
            });
        }

        let error = self.settings.target - measured;
        let max_abs = error.max_abs();
        self.last_stress = Some(measured);
        self.last_max_abs_error = Some(max_abs);
        tracing::info!(iteration, %measured, %error, max_abs, "stress read");

        if max_abs < self.settings.threshold {
            return Ok(self.terminate(RelaxState::Converged));
        }

        if iteration > self.settings.max_iterations {
            return Ok(self.terminate(RelaxState::Exhausted));
        }

        let correction = compute_correction(&error, &self.settings.elastic);
        self.lattice = self.lattice.transformed(&correction.deformation(self.state.damping));
        self.corrections += 1;
        tracing::debug!(iteration, damping = self.state.damping, lattice = ?self.lattice.rows, "lattice updated");

        Ok(Step::Apply {
            correction,
            lattice: self.lattice,
        })
    }

    fn terminate(&mut self, state: RelaxState) -> Step {
        self.status = state;
        tracing::info!(iteration = self.state.iteration, %state, "relaxation finished");
        Step::Finished(state)
    }

    /// 运行完整的控制循环
    pub fn run<B, F>(&mut self, backend: &mut B, mut observe: F) -> Result<RelaxReport>
    where
        B: SimulationBackend,
        F: FnMut(&CycleRecord),
    {
        backend.start()?;

        loop {
            let outcome = backend.read_outcome(self.state.iteration + 1)?;
            let step = self.advance(&outcome)?;

            let (lattice, state) = match &step {
                Step::Apply { lattice, .. } => (Some(*lattice), RelaxState::Running),
                Step::Finished(state) => (None, *state),
            };
            observe(&CycleRecord {
                iteration: self.state.iteration,
                damping: self.state.damping,
                measured: outcome.measured_stress,
                error: outcome.measured_stress.map(|m| self.settings.target - m),
                lattice,
                state,
            });

            match step {
                Step::Apply { lattice, .. } => backend.submit(&lattice, self.state.iteration)?,
                Step::Finished(_) => {
                    let report = self.report();
                    backend.finish(&report)?;
                    return Ok(report);
                }
            }
        }
    }

    pub fn report(&self) -> RelaxReport {
        RelaxReport {
            state: self.status,
            iteration: self.state.iteration,
            max_iterations: self.settings.max_iterations,
            corrections_applied: self.corrections,
            lattice: self.lattice,
            last_stress: self.last_stress,
            last_max_abs_error: self.last_max_abs_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// 按顺序返回预设结果的内存后端
    struct ScriptedBackend {
        outcomes: VecDeque<SimulationOutcome>,
        started: bool,
        reads: usize,
        submitted: Vec<(usize, LatticeMatrix)>,
        finished: Option<RelaxState>,
    }

    impl ScriptedBackend {
        fn new(outcomes: Vec<SimulationOutcome>) -> Self {
            ScriptedBackend {
                outcomes: outcomes.into(),
                started: false,
                reads: 0,
                submitted: Vec::new(),
                finished: None,
            }
        }
    }

    impl SimulationBackend for ScriptedBackend {
        fn start(&mut self) -> Result<()> {
            self.started = true;
            Ok(())
        }

        fn read_outcome(&mut self, _iteration: usize) -> Result<SimulationOutcome> {
            self.reads += 1;
            self.outcomes
                .pop_front()
                .ok_or_else(|| FixpressError::Other("script exhausted".to_string()))
        }

        fn submit(&mut self, lattice: &LatticeMatrix, iteration: usize) -> Result<()> {
            self.submitted.push((iteration, *lattice));
            Ok(())
        }

        fn finish(&mut self, report: &RelaxReport) -> Result<()> {
            self.finished = Some(report.state);
            Ok(())
        }
    }

    fn settings(max_iterations: usize) -> ControllerSettings {
        ControllerSettings {
            target: StressTensor::new([120.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            threshold: 0.1,
            elastic: ElasticParameters::new(2790.0, 0.21).unwrap(),
            max_iterations,
        }
    }

    fn cubic() -> LatticeMatrix {
        LatticeMatrix::from_rows([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]])
    }

    fn measured_xx(xx: f64) -> SimulationOutcome {
        SimulationOutcome::completed(StressTensor::new([xx, 0.0, 0.0, 0.0, 0.0, 0.0]))
    }

    #[test]
    fn test_damping_monotonic_reaches_zero() {
        let max = 30;
        let values: Vec<f64> = (0..=max).map(|i| damping_coefficient(i, max)).collect();
        assert_eq!(values[0], 1.0);
        assert!(values.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(values[max], 0.0);
        assert_eq!(damping_coefficient(max + 1, max), 0.0);
    }

    #[test]
    fn test_converges_at_iteration_three() {
        // 误差依次为 50, 8, 0.05
        let mut backend = ScriptedBackend::new(vec![
            measured_xx(70.0),
            measured_xx(112.0),
            measured_xx(119.95),
        ]);
        let mut controller = RelaxationController::new(settings(30), cubic());
        let mut cycles = Vec::new();
        let report = controller.run(&mut backend, |c| cycles.push(c.clone())).unwrap();

        assert!(backend.started);
        assert_eq!(report.state, RelaxState::Converged);
        assert_eq!(report.iteration, 3);
        assert_eq!(report.corrections_applied, 2);
        assert_eq!(backend.reads, 3);
        assert_eq!(backend.submitted.len(), 2);
        assert_eq!(backend.finished, Some(RelaxState::Converged));
        assert_eq!(cycles.len(), 3);
        assert!((report.last_max_abs_error.unwrap() - 0.05).abs() < 1e-9);
        // 收敛后不再修改晶格
        assert_eq!(report.lattice, backend.submitted[1].1);
    }

    #[test]
    fn test_compressive_error_shrinks_cell() {
        let mut controller = RelaxationController::new(settings(30), cubic());
        let step = controller.advance(&measured_xx(70.0)).unwrap();
        match step {
            Step::Apply { lattice, correction } => {
                assert!(correction.is_symmetric());
                assert!(lattice.rows[0][0] < 4.0);
                assert!(lattice.rows[1][1] > 4.0);
            }
            other => panic!("unexpected step: {:?}", other),
        }
        assert_eq!(controller.iteration_state().iteration, 1);
    }

    #[test]
    fn test_incomplete_run_aborts_without_mutation() {
        let mut backend = ScriptedBackend::new(vec![SimulationOutcome::incomplete()]);
        let mut controller = RelaxationController::new(settings(30), cubic());
        let report = controller.run(&mut backend, |_| {}).unwrap();

        assert_eq!(report.state, RelaxState::Aborted(AbortReason::Incomplete));
        assert_eq!(report.iteration, 1);
        assert_eq!(report.corrections_applied, 0);
        assert!(backend.submitted.is_empty());
        assert_eq!(report.lattice, cubic());
    }

    #[test]
    fn test_exhaustion_after_exactly_max_corrections() {
        let outcomes = (0..10).map(|_| measured_xx(70.0)).collect();
        let mut backend = ScriptedBackend::new(outcomes);
        let mut controller = RelaxationController::new(settings(5), cubic());
        let report = controller.run(&mut backend, |_| {}).unwrap();

        assert_eq!(report.state, RelaxState::Exhausted);
        assert_eq!(report.corrections_applied, 5);
        assert_eq!(backend.submitted.len(), 5);
        assert_eq!(
            backend.submitted.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert_eq!(report.iteration, 6);
        // 最后一次修正的阻尼为 0，晶格不再变化
        assert_eq!(backend.submitted[3].1, backend.submitted[4].1);
    }

    #[test]
    fn test_convergence_on_final_allowed_check() {
        let mut backend = ScriptedBackend::new(vec![
            measured_xx(70.0),
            measured_xx(100.0),
            measured_xx(119.99),
        ]);
        let mut controller = RelaxationController::new(settings(2), cubic());
        let report = controller.run(&mut backend, |_| {}).unwrap();
        assert_eq!(report.state, RelaxState::Converged);
        assert_eq!(report.iteration, 3);
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut controller = RelaxationController::new(settings(30), cubic());
        controller.advance(&SimulationOutcome::incomplete()).unwrap();
        let step = controller.advance(&measured_xx(70.0)).unwrap();
        assert_eq!(step, Step::Finished(RelaxState::Aborted(AbortReason::Incomplete)));
        assert_eq!(controller.report().lattice, cubic());
    }

    #[test]
    fn test_completed_without_stress_is_error() {
        let mut controller = RelaxationController::new(settings(30), cubic());
        let outcome = SimulationOutcome {
            completed: true,
            measured_stress: None,
            stress_line: None,
        };
        assert!(matches!(
            controller.advance(&outcome),
            Err(FixpressError::StressParse { .. })
        ));
        assert_eq!(controller.report().lattice, cubic());
    }

    #[test]
    fn test_starting_at_uses_that_iteration_damping() {
        let mut controller = RelaxationController::new(settings(10), cubic()).starting_at(4);
        controller.advance(&measured_xx(70.0)).unwrap();
        let state = controller.iteration_state();
        assert_eq!(state.iteration, 4);
        assert!((state.damping - 0.6).abs() < 1e-12);
    }
}
