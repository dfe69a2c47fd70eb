//! # 美化输出工具
//!
//! 提供统一的终端输出样式。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate

use crate::models::{Matrix3, StressTensor, VOIGT_LABELS};
use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// 打印带标签的应力张量
pub fn print_stress(label: &str, stress: &StressTensor) {
    let parts: Vec<String> = VOIGT_LABELS
        .iter()
        .zip(stress.components())
        .map(|(l, v)| format!("{}={:>11.5}", l.dimmed(), v))
        .collect();
    println!("    {:<10} {}", label, parts.join(" "));
}

/// 打印 3x3 矩阵
pub fn print_matrix(label: &str, m: &Matrix3) {
    println!("    {}", label);
    for row in m {
        println!("      {:18.12}  {:18.12}  {:18.12}", row[0], row[1], row[2]);
    }
}
