use crate::timefmt::TimeFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.npms.io/v2";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    /// 单次请求超时（毫秒）
    pub timeout_ms: u64,
    /// 搜索防抖窗口（毫秒）
    pub debounce_ms: u64,
    /// 启动时是否排除已弃用的包
    pub exclude_deprecated: bool,
    /// 下拉候选上限
    pub suggestion_limit: usize,
    pub time_format: TimeFormat,
    pub log_file: PathBuf,
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_ms: 3000,
            debounce_ms: 200,
            exclude_deprecated: true,
            suggestion_limit: 100,
            time_format: TimeFormat::Relative,
            log_file: home_dir().join(".cache/npm-scanner/npm-scanner.log"),
        }
    }
}

impl Config {
    pub fn config_path() -> PathBuf {
        home_dir().join(".config/npm-scanner/config.toml")
    }

    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        // 去掉末尾斜杠，拼接路径时统一使用 "/"
        while config.api_url.ends_with('/') {
            config.api_url.pop();
        }
        Ok(config)
    }
}
