//! # fixpress - 定应力晶格弛豫驱动
//!
//! 反复调用外部 DFT 程序 (VASP)，读取计算得到的应力，
//! 用线弹性近似修正晶格，直到应力与目标一致。
//!
//! ## 子命令
//! - `relax`     - 运行弛豫循环
//! - `stress`    - 查看 OUTCAR 中的应力
//! - `correct`   - 离线执行一步晶格修正
//! - `history`   - 分析应力日志 (表格/CSV/曲线)
//! - `snapshots` - 列出每次迭代存档的结构
//! - `init`      - 生成配置文件模板
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── relax/     (控制器与模拟器后端)
//!   │     ├── config/    (TOML 配置)
//!   │     ├── parsers/   (OUTCAR / POSCAR / 应力日志)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出、日志、进度、绘图)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod config;
mod error;
mod models;
mod parsers;
mod relax;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = utils::logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
    {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(e.exit_code());
    }
}
