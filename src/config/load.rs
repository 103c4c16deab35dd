use crate::config::types::{Config, UserSettings, VideoMimeTable};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// 編譯時嵌入的 MIME 類型表（不需要外部檔案）
const VIDEO_MIME_TABLE_JSON: &str = include_str!("../../data/video_mime_table.json");

pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_settings_path(Path::new(SETTINGS_FILE))
    }

    /// 從指定路徑載入設定，檔案不存在或無法解析時使用預設值
    pub fn from_settings_path(path: &Path) -> Result<Self> {
        let mime_table = Self::load_embedded_mime_table()?;
        let settings = Self::load_settings(path).unwrap_or_else(|e| {
            log::warn!("設定檔無法使用，改用預設值: {e:#}");
            UserSettings::default()
        });

        Ok(Self {
            mime_table,
            settings,
        })
    }

    fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入 MIME 類型表
    fn load_embedded_mime_table() -> Result<VideoMimeTable> {
        serde_json::from_str(VIDEO_MIME_TABLE_JSON).context("無法解析嵌入的 MIME 類型設定")
    }
}
