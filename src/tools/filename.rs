//! 輸出檔名規則

use chrono::{DateTime, Utc};

/// 收藏壓縮檔內的資料夾名稱
pub const ARCHIVE_ROOT_DIR: &str = "extracted-frames";

pub const METADATA_FILENAME: &str = "frame_collection_info.json";

/// 時間戳記取到小數兩位，並以 `-` 取代小數點（5.0 -> "5-00"）
#[must_use]
pub fn dashed_timestamp(seconds: f64) -> String {
    format!("{seconds:.2}").replace('.', "-")
}

/// 單張下載的檔名：`frame_000150_5-00s.png`
#[must_use]
pub fn single_frame_filename(frame_index: u64, timestamp_seconds: f64) -> String {
    format!(
        "frame_{frame_index:06}_{}s.png",
        dashed_timestamp(timestamp_seconds)
    )
}

/// 收藏中第 `position` 張（從 1 開始）的檔名：`frame_001_000150_5-00s.png`
#[must_use]
pub fn collection_frame_filename(position: usize, frame_index: u64, timestamp_seconds: f64) -> String {
    format!(
        "frame_{position:03}_{frame_index:06}_{}s.png",
        dashed_timestamp(timestamp_seconds)
    )
}

/// 壓縮檔名稱：`frames_2024-05-01.zip`
#[must_use]
pub fn archive_filename(now: DateTime<Utc>) -> String {
    format!("frames_{}.zip", now.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dashed_timestamp() {
        assert_eq!(dashed_timestamp(5.0), "5-00");
        assert_eq!(dashed_timestamp(12.346), "12-35");
        assert_eq!(dashed_timestamp(0.0), "0-00");
    }

    #[test]
    fn test_single_frame_filename() {
        assert_eq!(single_frame_filename(150, 5.0), "frame_000150_5-00s.png");
        assert_eq!(single_frame_filename(0, 0.0), "frame_000000_0-00s.png");
    }

    #[test]
    fn test_collection_frame_filename() {
        assert_eq!(
            collection_frame_filename(1, 150, 5.0),
            "frame_001_000150_5-00s.png"
        );
        assert_eq!(
            collection_frame_filename(42, 1234567, 41.152),
            "frame_042_1234567_41-15s.png"
        );
    }

    #[test]
    fn test_archive_filename() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap();
        assert_eq!(archive_filename(now), "frames_2024-05-01.zip");
    }
}
