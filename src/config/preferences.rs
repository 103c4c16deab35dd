//! 跨工作階段保存的偏好設定
//!
//! 目前只保存介面主題；儲存方式由呼叫端注入，核心邏輯不直接接觸檔案系統。

use crate::config::types::Theme;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const THEME_KEY: &str = "theme";

/// 簡單的鍵值儲存能力
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// 僅存在記憶體中的儲存，測試與不需要保存時使用
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 以 JSON 檔案保存的儲存，每次寫入都會整份寫回
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// 開啟偏好設定檔，檔案無法讀取或解析時從空白開始
    pub fn open(path: &Path) -> Result<Self> {
        let entries = Self::read_entries(path).unwrap_or_else(|e| {
            warn!("偏好設定檔無法使用，改用預設值: {e:#}");
            BTreeMap::new()
        });

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取偏好設定檔案: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("無法解析偏好設定檔案: {}", path.display()))
    }

    fn persist(&self) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&self.entries).context("無法序列化偏好設定")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("無法建立目錄: {}", parent.display()))?;
        }

        fs::write(&self.path, content)
            .with_context(|| format!("無法寫入偏好設定檔案: {}", self.path.display()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }
}

/// 讀取已保存的主題，沒有或無法辨識時回到淺色
pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    match store.get(THEME_KEY) {
        Some(value) => Theme::parse(&value).unwrap_or_else(|| {
            warn!("無法辨識的主題設定: {value}");
            Theme::default()
        }),
        None => Theme::default(),
    }
}

/// 切換主題並寫回儲存
pub fn toggle_theme(store: &mut dyn KeyValueStore, current: Theme) -> Result<Theme> {
    let next = current.toggled();
    store.set(THEME_KEY, next.as_str())?;
    debug!("主題切換為 {next}");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_theme_defaults_to_light() {
        let store = MemoryStore::new();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn test_toggle_theme_persists() {
        let mut store = MemoryStore::new();
        let theme = toggle_theme(&mut store, Theme::Light).unwrap();
        assert_eq!(theme, Theme::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(load_theme(&store), Theme::Dark);
    }

    #[test]
    fn test_unknown_theme_value_falls_back() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn test_json_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        toggle_theme(&mut store, Theme::Light).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(load_theme(&reopened), Theme::Dark);
    }

    #[test]
    fn test_json_file_store_recovers_from_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.get(THEME_KEY).is_none());
        assert_eq!(load_theme(&store), Theme::Light);

        toggle_theme(&mut store, Theme::Light).unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(load_theme(&reopened), Theme::Dark);
    }
}
