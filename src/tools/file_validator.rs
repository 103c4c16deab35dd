use crate::config::VideoMimeTable;
use crate::error::{ExtractorError, ExtractorResult};
use crate::tools::video_source::VideoFile;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

/// 檢查 MIME 類型與檔案大小，不符合時不做任何狀態變更
pub fn validate_video_file(
    file: &VideoFile,
    mime_table: &VideoMimeTable,
    max_size: u64,
) -> ExtractorResult<()> {
    if !mime_table.is_accepted(&file.mime_type) {
        return Err(ExtractorError::InvalidFormat {
            mime_type: file.mime_type.clone(),
        });
    }

    if file.size() > max_size {
        return Err(ExtractorError::TooLarge {
            size: file.size(),
            limit: max_size,
        });
    }

    Ok(())
}

/// 從磁碟讀取影片，MIME 類型依副檔名推測
///
/// 無法辨識的副檔名會得到 `application/octet-stream`，交由驗證階段拒絕。
pub fn read_video_file(path: &Path, mime_table: &VideoMimeTable) -> Result<VideoFile> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_file() {
        bail!("路徑不是檔案: {}", path.display());
    }

    let bytes = fs::read(path).with_context(|| format!("無法讀取影片: {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| "video".to_string(), |n| n.to_string_lossy().to_string());
    let mime_type = mime_table
        .mime_for_path(path)
        .unwrap_or("application/octet-stream")
        .to_string();

    Ok(VideoFile::new(name, mime_type, bytes))
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("無法建立目錄: {}", path.display()))?;
    }
    Ok(())
}
