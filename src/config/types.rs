use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const MAX_RECENT_PATHS: usize = 10;

/// 預設收藏上限
pub const DEFAULT_MAX_COLLECTION_SIZE: usize = 100;

/// 預設檔案大小上限（100 MiB）
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// 可接受的影片 MIME 類型與對應副檔名
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoMimeTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl VideoMimeTable {
    #[must_use]
    pub fn is_accepted(&self, mime_type: &str) -> bool {
        self.entries.contains_key(&mime_type.to_lowercase())
    }

    /// 依副檔名推測 MIME 類型
    #[must_use]
    pub fn mime_for_path(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        let dotted = format!(".{ext}");
        self.entries
            .iter()
            .find(|(_, extensions)| extensions.iter().any(|e| e.eq_ignore_ascii_case(&dotted)))
            .map(|(mime, _)| mime.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    English,
    #[serde(rename = "zh-TW")]
    TraditionalChinese,
}

impl Language {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::TraditionalChinese => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => write!(f, "English"),
            Self::TraditionalChinese => write!(f, "繁體中文"),
        }
    }
}

/// 介面主題，以 `theme` 鍵儲存
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 使用者設定，存放於工作目錄下的 settings.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub max_collection_size: usize,
    pub max_file_size_bytes: u64,
    /// 無法推測幀率時使用的預設值
    pub default_frame_rate: f64,
    /// Shift+方向鍵跳轉的秒數
    pub skip_seconds: f64,
    pub seek_timeout_ms: u64,
    pub metadata_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub output_directory: PathBuf,
    pub recent_paths: Vec<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            max_collection_size: DEFAULT_MAX_COLLECTION_SIZE,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            default_frame_rate: 30.0,
            skip_seconds: 5.0,
            seek_timeout_ms: 5_000,
            metadata_timeout_ms: 10_000,
            poll_interval_ms: 16,
            output_directory: PathBuf::from("."),
            recent_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mime_table: VideoMimeTable,
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VideoMimeTable {
        serde_json::from_str(include_str!("../../data/video_mime_table.json")).unwrap()
    }

    #[test]
    fn test_mime_table_accepts_known_types() {
        let table = table();
        assert!(table.is_accepted("video/mp4"));
        assert!(table.is_accepted("VIDEO/WEBM"));
        assert!(table.is_accepted("video/quicktime"));
        assert!(table.is_accepted("video/x-msvideo"));
        assert!(!table.is_accepted("video/x-matroska"));
        assert!(!table.is_accepted("image/png"));
    }

    #[test]
    fn test_mime_for_path() {
        let table = table();
        assert_eq!(table.mime_for_path(Path::new("a/clip.MP4")), Some("video/mp4"));
        assert_eq!(table.mime_for_path(Path::new("clip.mov")), Some("video/quicktime"));
        assert_eq!(table.mime_for_path(Path::new("clip.avi")), Some("video/x-msvideo"));
        assert_eq!(table.mime_for_path(Path::new("clip.mkv")), None);
        assert_eq!(table.mime_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse(" light "), Some(Theme::Light));
        assert_eq!(Theme::parse("blue"), None);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().as_str(), "light");
    }

    #[test]
    fn test_settings_partial_json_uses_defaults() {
        let settings: UserSettings =
            serde_json::from_str(r#"{"max_collection_size": 5, "language": "zh-TW"}"#).unwrap();
        assert_eq!(settings.max_collection_size, 5);
        assert_eq!(settings.language, Language::TraditionalChinese);
        assert_eq!(settings.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE);
        assert!((settings.skip_seconds - 5.0).abs() < f64::EPSILON);
    }
}
