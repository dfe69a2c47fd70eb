//! # 解析器模块
//!
//! 提供 VASP 输出、结构文件和运行日志的纯文本解析器。
//!
//! ## 依赖关系
//! - 被 `relax/` 和 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: outcar, poscar, stress_log

pub mod outcar;
pub mod poscar;
pub mod stress_log;

pub use outcar::Markers;
