//! Worker configuration
//!
//! Optional TOML file; every field has a default so an absent file means the
//! pretrained artifacts are read from `model/` next to the executable.

use crate::config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up next to the executable
pub const DEFAULT_CONFIG_FILE: &str = "moodscan.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub resources: ResourceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Location of the pretrained artifacts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResourceConfig {
    /// Relative paths resolve against the installation directory
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            model_file: default_model_file(),
            scaler_file: default_scaler_file(),
        }
    }
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("model")
}
fn default_model_file() -> String {
    "va_model.json".to_string()
}
fn default_scaler_file() -> String {
    "va_scaler.json".to_string()
}

impl WorkerConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: WorkerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Load `moodscan.toml` from `install_dir` if it exists, defaults otherwise
    pub fn load_or_default(install_dir: &Path) -> anyhow::Result<Self> {
        let path = install_dir.join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn model_dir(&self, install_dir: &Path) -> PathBuf {
        if self.resources.model_dir.is_absolute() {
            self.resources.model_dir.clone()
        } else {
            install_dir.join(&self.resources.model_dir)
        }
    }

    pub fn model_path(&self, install_dir: &Path) -> PathBuf {
        self.model_dir(install_dir).join(&self.resources.model_file)
    }

    pub fn scaler_path(&self, install_dir: &Path) -> PathBuf {
        self.model_dir(install_dir).join(&self.resources.scaler_file)
    }
}

/// Directory containing the running executable
pub fn install_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = WorkerConfig::default();
        let base = Path::new("/opt/moodscan");
        assert_eq!(
            config.model_path(base),
            PathBuf::from("/opt/moodscan/model/va_model.json")
        );
        assert_eq!(
            config.scaler_path(base),
            PathBuf::from("/opt/moodscan/model/va_scaler.json")
        );
    }

    #[test]
    fn test_absolute_model_dir() {
        let config = WorkerConfig {
            resources: ResourceConfig {
                model_dir: PathBuf::from("/srv/models"),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.model_path(Path::new("/opt/moodscan")),
            PathBuf::from("/srv/models/va_model.json")
        );
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
            [resources]
            model_file = "va_model.onnx"

            [analysis]
            hop_length = 256
        "#;

        let config: WorkerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.resources.model_file, "va_model.onnx");
        assert_eq!(config.resources.scaler_file, "va_scaler.json");
        assert_eq!(config.analysis.hop_length, 256);
        assert_eq!(config.analysis.n_fft, 2048);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkerConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config, WorkerConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_analysis() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[analysis]\nhop_length = 0\n",
        )
        .unwrap();
        assert!(WorkerConfig::load_or_default(dir.path()).is_err());
    }
}
