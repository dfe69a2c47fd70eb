//! # 配置模块
//!
//! 配置来源优先级：命令行覆盖 > TOML 配置文件 > 默认值。
//! 合并并校验后得到不可变的 `RelaxConfig`，在构造控制器时传入。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`（应力张量、弹性参数）和 `parsers/outcar.rs`（日志标记）
//! - 子模块: defaults, file

pub mod defaults;
pub mod file;

use crate::error::{FixpressError, Result};
use crate::models::{ElasticParameters, StressTensor};
use crate::parsers::Markers;
use file::PartialConfig;

use std::path::{Path, PathBuf};

/// 命令行覆盖项
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub target: Option<StressTensor>,
    pub threshold: Option<f64>,
    pub young_modulus: Option<f64>,
    pub poisson_ratio: Option<f64>,
    pub max_iterations: Option<usize>,
    pub command: Option<String>,
    pub seed: Option<String>,
}

/// 模拟器调用设置
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// 在工作目录中通过 `sh -c` 执行的命令
    pub command: String,
    /// 重定向标准输出的文件
    pub stdout: Option<String>,
    /// 初始结构文件
    pub seed: String,
    /// 循环结束后删除的文件
    pub remove_on_exit: Vec<String>,
}

/// 工作目录中的文件名
#[derive(Debug, Clone, PartialEq)]
pub struct FileLayout {
    pub structure: String,
    pub relaxed: String,
    pub outcar: String,
    pub oszicar: String,
    pub stress_log: String,
    pub energy_log: String,
    pub archive_prefix: String,
}

impl Default for FileLayout {
    fn default() -> Self {
        FileLayout {
            structure: defaults::STRUCTURE.to_string(),
            relaxed: defaults::RELAXED.to_string(),
            outcar: defaults::OUTCAR.to_string(),
            oszicar: defaults::OSZICAR.to_string(),
            stress_log: defaults::STRESS_LOG.to_string(),
            energy_log: defaults::ENERGY_LOG.to_string(),
            archive_prefix: defaults::ARCHIVE_PREFIX.to_string(),
        }
    }
}

impl FileLayout {
    /// 第 n 次迭代的结构存档名 (e.g., `poscar.3`)
    pub fn archive_name(&self, iteration: usize) -> String {
        format!("{}.{}", self.archive_prefix, iteration)
    }
}

/// 一次弛豫运行的完整配置
#[derive(Debug, Clone)]
pub struct RelaxConfig {
    pub target: StressTensor,
    pub threshold: f64,
    pub elastic: ElasticParameters,
    pub max_iterations: usize,
    pub run: RunSettings,
    pub files: FileLayout,
    pub markers: Markers,
}

impl RelaxConfig {
    /// 合并配置文件与命令行覆盖并校验
    pub fn build(partial: PartialConfig, overrides: ConfigOverrides) -> Result<Self> {
        let target = overrides
            .target
            .or(partial.target.stress.map(StressTensor::new))
            .unwrap_or_else(|| StressTensor::new(defaults::TARGET_STRESS));
        if !target.is_finite() {
            return Err(FixpressError::Config(
                "target stress must be finite".to_string(),
            ));
        }

        let threshold = overrides
            .threshold
            .or(partial.target.threshold)
            .unwrap_or(defaults::THRESHOLD);
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(FixpressError::Config(format!(
                "convergence threshold must be positive, got {}",
                threshold
            )));
        }

        let elastic = ElasticParameters::new(
            overrides
                .young_modulus
                .or(partial.elastic.young_modulus)
                .unwrap_or(defaults::YOUNG_MODULUS),
            overrides
                .poisson_ratio
                .or(partial.elastic.poisson_ratio)
                .unwrap_or(defaults::POISSON_RATIO),
        )?;

        let max_iterations = overrides
            .max_iterations
            .or(partial.run.max_iterations)
            .unwrap_or(defaults::MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(FixpressError::Config(
                "max-iterations must be at least 1".to_string(),
            ));
        }

        let command = overrides
            .command
            .or(partial.run.command)
            .unwrap_or_else(|| defaults::COMMAND.to_string());
        if command.trim().is_empty() {
            return Err(FixpressError::Config(
                "simulator command must not be empty".to_string(),
            ));
        }

        let run = RunSettings {
            command,
            stdout: match partial.run.stdout {
                Some(s) if s.trim().is_empty() => None,
                Some(s) => Some(s),
                None => Some(defaults::STDOUT.to_string()),
            },
            seed: overrides
                .seed
                .or(partial.run.seed)
                .unwrap_or_else(|| defaults::SEED.to_string()),
            remove_on_exit: partial.run.remove_on_exit.unwrap_or_else(|| {
                defaults::REMOVE_ON_EXIT
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
        };

        let d = FileLayout::default();
        let f = partial.files;
        let files = FileLayout {
            structure: f.structure.unwrap_or(d.structure),
            relaxed: f.relaxed.unwrap_or(d.relaxed),
            outcar: f.outcar.unwrap_or(d.outcar),
            oszicar: f.oszicar.unwrap_or(d.oszicar),
            stress_log: f.stress_log.unwrap_or(d.stress_log),
            energy_log: f.energy_log.unwrap_or(d.energy_log),
            archive_prefix: f.archive_prefix.unwrap_or(d.archive_prefix),
        };

        let dm = Markers::default();
        let markers = Markers {
            completion: partial.markers.completion.unwrap_or(dm.completion),
            stress: partial.markers.stress.unwrap_or(dm.stress),
        };
        if markers.completion.is_empty() || markers.stress.is_empty() {
            return Err(FixpressError::Config(
                "log markers must not be empty".to_string(),
            ));
        }

        Ok(RelaxConfig {
            target,
            threshold,
            elastic,
            max_iterations,
            run,
            files,
            markers,
        })
    }

    /// 加载配置：显式路径必须存在；否则尝试工作目录中的 `fixpress.toml`
    pub fn load(
        explicit: Option<&Path>,
        workdir: &Path,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let partial = match resolve_config_path(explicit, workdir)? {
            Some(path) => PartialConfig::load(&path)?,
            None => {
                tracing::debug!("no configuration file, using defaults and overrides");
                PartialConfig::default()
            }
        };
        Self::build(partial, overrides)
    }
}

fn resolve_config_path(explicit: Option<&Path>, workdir: &Path) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(FixpressError::FileNotFound {
            path: path.display().to_string(),
        }),
        None => {
            let implicit = workdir.join(defaults::CONFIG_FILE);
            Ok(implicit.exists().then_some(implicit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RelaxConfig::build(PartialConfig::default(), ConfigOverrides::default()).unwrap();
        assert_eq!(cfg.target.components(), defaults::TARGET_STRESS);
        assert_eq!(cfg.threshold, 0.1);
        assert_eq!(cfg.max_iterations, 30);
        assert_eq!(cfg.elastic.young(), 2790.0);
        assert_eq!(cfg.run.stdout.as_deref(), Some("results.txt"));
        assert_eq!(cfg.run.remove_on_exit, vec!["WAVECAR".to_string()]);
        assert_eq!(cfg.files.archive_name(7), "poscar.7");
        assert_eq!(cfg.markers, Markers::default());
    }

    #[test]
    fn test_overrides_beat_file() {
        let partial = PartialConfig::from_toml_str(
            "[target]\nthreshold = 0.5\n[run]\nmax-iterations = 10\ncommand = \"vasp\"\n",
            "test",
        )
        .unwrap();
        let overrides = ConfigOverrides {
            threshold: Some(0.05),
            command: Some("srun vasp_std".to_string()),
            ..Default::default()
        };
        let cfg = RelaxConfig::build(partial, overrides).unwrap();
        assert_eq!(cfg.threshold, 0.05);
        assert_eq!(cfg.max_iterations, 10);
        assert_eq!(cfg.run.command, "srun vasp_std");
    }

    #[test]
    fn test_validation_errors() {
        let bad = |o: ConfigOverrides| RelaxConfig::build(PartialConfig::default(), o).is_err();
        assert!(bad(ConfigOverrides {
            threshold: Some(0.0),
            ..Default::default()
        }));
        assert!(bad(ConfigOverrides {
            max_iterations: Some(0),
            ..Default::default()
        }));
        assert!(bad(ConfigOverrides {
            command: Some("  ".to_string()),
            ..Default::default()
        }));
        assert!(bad(ConfigOverrides {
            poisson_ratio: Some(0.5),
            ..Default::default()
        }));
    }

    #[test]
    fn test_empty_stdout_inherits() {
        let partial = PartialConfig::from_toml_str("[run]\nstdout = \"\"\n", "test").unwrap();
        let cfg = RelaxConfig::build(partial, ConfigOverrides::default()).unwrap();
        assert_eq!(cfg.run.stdout, None);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = RelaxConfig::load(Some(&missing), dir.path(), ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, FixpressError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_implicit_file_in_workdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(defaults::CONFIG_FILE),
            "[elastic]\nyoung-modulus = 1500.0\n",
        )
        .unwrap();
        let cfg = RelaxConfig::load(None, dir.path(), ConfigOverrides::default()).unwrap();
        assert_eq!(cfg.elastic.young(), 1500.0);
    }
}
