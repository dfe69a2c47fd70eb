//! # 工具函数模块
//!
//! 提供美化输出、进度提示、日志初始化和收敛曲线绘制。
//!
//! ## 依赖关系
//! - 被 `commands/`, `relax/` 模块使用
//! - 子模块: output, progress, logging, plot

pub mod logging;
pub mod output;
pub mod plot;
pub mod progress;
