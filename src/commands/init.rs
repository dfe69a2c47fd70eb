//! # init 命令实现
//!
//! 写出带注释的配置模板。
//!
//! ## 依赖关系
//! - 使用 `cli/init.rs` 定义的参数
//! - 使用 `config/defaults.rs`

use crate::cli::init::InitArgs;
use crate::config::defaults::TEMPLATE;
use crate::error::{FixpressError, Result};
use crate::utils::output;

use std::fs;

/// 执行 init 命令
pub fn execute(args: InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(FixpressError::InvalidArgument(format!(
            "'{}' already exists (use --force to overwrite)",
            args.output.display()
        )));
    }

    fs::write(&args.output, TEMPLATE).map_err(|e| FixpressError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    output::print_success(&format!(
        "Configuration template written to '{}'",
        args.output.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("fixpress.toml");
        fs::write(&output, "keep me").unwrap();

        let err = execute(InitArgs {
            output: output.clone(),
            force: false,
        })
        .unwrap_err();
        assert!(matches!(err, FixpressError::InvalidArgument(_)));
        assert_eq!(fs::read_to_string(&output).unwrap(), "keep me");

        execute(InitArgs {
            output: output.clone(),
            force: true,
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), TEMPLATE);
    }
}
