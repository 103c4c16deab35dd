use serde::{Deserialize, Serialize};

/// 收藏清單的 JSON 摘要（frame_collection_info.json）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub frame_count: usize,
    pub frames: Vec<CollectionFrameInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFrameInfo {
    /// 從 1 開始的位置
    pub index: usize,
    pub timestamp: f64,
    pub frame_index: u64,
    pub resolution: String,
    pub filename: String,
}

impl CollectionInfo {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let info = CollectionInfo {
            frame_count: 1,
            frames: vec![CollectionFrameInfo {
                index: 1,
                timestamp: 5.0,
                frame_index: 150,
                resolution: "1920x1080".to_string(),
                filename: "frame_001_000150_5-00s.png".to_string(),
            }],
        };

        let value: serde_json::Value = serde_json::from_str(&info.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["frameCount"], 1);
        assert_eq!(value["frames"][0]["frameIndex"], 150);
        assert_eq!(value["frames"][0]["resolution"], "1920x1080");
        assert_eq!(value["frames"][0]["filename"], "frame_001_000150_5-00s.png");
    }
}
