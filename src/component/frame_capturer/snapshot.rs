use crate::tools::single_frame_filename;

/// 一張擷取的靜態畫面與擷取當下的資訊
///
/// 影像內容為 PNG 編碼後的位元組，建立後不可修改。
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp_seconds: f64,
    /// `floor(timestamp × 推測幀率)`，不是實際解碼的幀編號
    pub frame_index: u64,
    pub width: u32,
    pub height: u32,
    image: Vec<u8>,
}

impl Snapshot {
    #[must_use]
    pub const fn new(
        timestamp_seconds: f64,
        frame_index: u64,
        width: u32,
        height: u32,
        image: Vec<u8>,
    ) -> Self {
        Self {
            timestamp_seconds,
            frame_index,
            width,
            height,
            image,
        }
    }

    #[must_use]
    pub fn image_bytes(&self) -> &[u8] {
        &self.image
    }

    /// `"<寬>x<高>"`
    #[must_use]
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// 單張下載時使用的檔名
    #[must_use]
    pub fn filename(&self) -> String {
        single_frame_filename(self.frame_index, self.timestamp_seconds)
    }
}
