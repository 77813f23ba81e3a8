//! 查找配置
//!
//! 配置文件为 JSON，所有字段可省略：
//! `$XDG_CONFIG_HOME/zfind/config.json`（或 `$HOME/.config/zfind/config.json`）

use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;

const CONFIG_DIR: &str = "zfind";
const CONFIG_FILE: &str = "config.json";

/// 可见匹配计数的默认上限
pub const DEFAULT_VISIBLE_MATCH_CAP: usize = 100;

/// 驱动器每个时间片的默认预算（毫秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// 遍历时跳过的元素
pub const DEFAULT_IGNORE_TAGS: &[&str] = &[
    "script", "style", "embed", "object", "select", "textarea", "iframe", "noscript",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindConfig {
    pub ignore_tags: Vec<String>,
    /// 可见计数在此饱和；超过上限的页面报告值会偏小
    pub visible_match_cap: usize,
    pub default_timeout_ms: u64,
    /// 驱动器两个时间片之间的间隔；0 表示只让出调度
    pub slice_interval_ms: u64,
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            ignore_tags: DEFAULT_IGNORE_TAGS.iter().map(|t| t.to_string()).collect(),
            visible_match_cap: DEFAULT_VISIBLE_MATCH_CAP,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            slice_interval_ms: 0,
        }
    }
}

impl FindConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn slice_interval(&self) -> Duration {
        Duration::from_millis(self.slice_interval_ms)
    }

    /// 小写化后的忽略集合
    pub fn ignore_set(&self) -> FxHashSet<String> {
        self.ignore_tags
            .iter()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

pub fn config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

pub fn load_config(path: &Path) -> Result<FindConfig> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// 读取默认位置的配置，失败时回退到默认值
pub fn load_or_default() -> FindConfig {
    let Some(path) = config_path() else {
        return FindConfig::default();
    };
    if !path.exists() {
        return FindConfig::default();
    }
    match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            FindConfig::default()
        }
    }
}

/// 文件不存在时写入默认配置
pub fn ensure_config_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&FindConfig::default())?;
        std::fs::write(path, content)?;
    }
    Ok(())
}

fn get_config_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Some(PathBuf::from(xdg));
        }
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config"))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
