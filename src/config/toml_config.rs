use crate::core::DatasetProvider;
use crate::utils::error::{MatchError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_DATASET_DIR: &str = "./data";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub dir: String,
    pub devices: String,
    pub testers: String,
    pub bugs: String,
    pub tester_device: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_DATASET_DIR.to_string(),
            devices: "devices.csv".to_string(),
            testers: "testers.csv".to_string(),
            bugs: "bugs.csv".to_string(),
            tester_device: "tester_device.csv".to_string(),
        }
    }
}

impl DatasetProvider for DatasetConfig {
    fn devices_file(&self) -> &str {
        &self.devices
    }

    fn testers_file(&self) -> &str {
        &self.testers
    }

    fn bugs_file(&self) -> &str {
        &self.bugs
    }

    fn ownership_file(&self) -> &str {
        &self.tester_device
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MatchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MatchError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        validation::validate_bind_addr("server.bind", &self.server.bind)
    }

    pub fn dataset_dir(&self) -> &str {
        &self.dataset.dir
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        validation::validate_path("dataset.dir", &self.dataset.dir)?;
        validation::validate_file_name("dataset.devices", &self.dataset.devices)?;
        validation::validate_file_name("dataset.testers", &self.dataset.testers)?;
        validation::validate_file_name("dataset.bugs", &self.dataset.bugs)?;
        validation::validate_file_name("dataset.tester_device", &self.dataset.tester_device)?;
        if let Some(level) = &self.logging.level {
            validation::validate_log_level("logging.level", level)?;
        }
        Ok(())
    }
}
