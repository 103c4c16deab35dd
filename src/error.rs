use thiserror::Error;

/// 擷取流程中所有可回復的錯誤
///
/// 每一種錯誤都在使用者操作的邊界被攔截並顯示，
/// 不會讓播放控制器或收藏清單停留在不一致的狀態。
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("unsupported video type: {mime_type}")]
    InvalidFormat { mime_type: String },
    #[error("video file too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    #[error("failed to load video source: {0}")]
    SourceLoadFailure(String),
    #[error("video source has no displayable frame yet")]
    NotReady,
    #[error("failed to capture frame: {0}")]
    CaptureFailure(String),
    #[error("collection is full ({max} frames)")]
    CollectionFull { max: usize },
    #[error("collection is empty")]
    EmptyCollection,
    #[error("failed to build archive: {0}")]
    ArchiveBuildFailure(String),
    #[error("timed out after {millis} ms waiting for {waiting_for}")]
    Timeout {
        waiting_for: &'static str,
        millis: u64,
    },
    #[error("operation cancelled")]
    Cancelled,
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExtractorResult<T> = std::result::Result<T, ExtractorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ExtractorError::TooLarge {
            size: 200,
            limit: 100,
        };
        assert_eq!(
            err.to_string(),
            "video file too large: 200 bytes (limit 100 bytes)"
        );

        let err = ExtractorError::CollectionFull { max: 100 };
        assert_eq!(err.to_string(), "collection is full (100 frames)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ExtractorError = io.into();
        assert!(matches!(err, ExtractorError::Io(_)));
    }
}
