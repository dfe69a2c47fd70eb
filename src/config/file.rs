//! # 配置文件层
//!
//! TOML 文件反序列化为 `Partial*` 结构，所有字段可选，缺省值由 builder 补齐。

use crate::error::{FixpressError, Result};

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialTargetConfig {
    pub stress: Option<[f64; 6]>,
    pub threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialElasticConfig {
    #[serde(rename = "young-modulus")]
    pub young_modulus: Option<f64>,
    #[serde(rename = "poisson-ratio")]
    pub poisson_ratio: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    #[serde(rename = "max-iterations")]
    pub max_iterations: Option<usize>,
    pub command: Option<String>,
    pub stdout: Option<String>,
    pub seed: Option<String>,
    #[serde(rename = "remove-on-exit")]
    pub remove_on_exit: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialFilesConfig {
    pub structure: Option<String>,
    pub relaxed: Option<String>,
    pub outcar: Option<String>,
    pub oszicar: Option<String>,
    pub stress_log: Option<String>,
    pub energy_log: Option<String>,
    pub archive_prefix: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialMarkersConfig {
    pub completion: Option<String>,
    pub stress: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub target: PartialTargetConfig,
    #[serde(default)]
    pub elastic: PartialElasticConfig,
    #[serde(default)]
    pub run: PartialRunConfig,
    #[serde(default)]
    pub files: PartialFilesConfig,
    #[serde(default)]
    pub markers: PartialMarkersConfig,
}

impl PartialConfig {
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FixpressError::ParseError {
            format: "toml".to_string(),
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| FixpressError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&content, &path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::TEMPLATE;

    #[test]
    fn test_template_parses() {
        let partial = PartialConfig::from_toml_str(TEMPLATE, "template").unwrap();
        assert_eq!(partial.target.stress, Some([120.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(partial.elastic.young_modulus, Some(2790.0));
        assert_eq!(partial.run.max_iterations, Some(30));
        assert_eq!(partial.files, PartialFilesConfig::default());
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let partial = PartialConfig::from_toml_str("", "empty").unwrap();
        assert_eq!(partial, PartialConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PartialConfig::from_toml_str("[elastic]\nshear-modulus = 1.0\n", "bad").unwrap_err();
        assert!(matches!(err, FixpressError::ParseError { .. }));
    }

    #[test]
    fn test_wrong_stress_length_rejected() {
        let content = "[target]\nstress = [1.0, 2.0]\n";
        assert!(PartialConfig::from_toml_str(content, "bad").is_err());
    }

    #[test]
    fn test_files_section_kebab_case() {
        let content = "[files]\nstress-log = \"stress.log\"\narchive-prefix = \"snap\"\n";
        let partial = PartialConfig::from_toml_str(content, "files").unwrap();
        assert_eq!(partial.files.stress_log.as_deref(), Some("stress.log"));
        assert_eq!(partial.files.archive_prefix.as_deref(), Some("snap"));
    }
}
