//! 影片來源能力介面
//!
//! 解碼與繪製流程被視為外部黑盒：只需要能回報長度、目前時間，
//! 並在需要時把目前畫面畫到指定的 RGBA 畫布上。

use anyhow::Result;
use image::RgbaImage;

/// 使用者選擇的影片檔案
#[derive(Debug, Clone)]
pub struct VideoFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl VideoFile {
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// 來源載入完成後可取得的資訊
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceMetadata {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
}

/// 來源的緩衝程度，數值越大代表資料越完整
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

impl ReadyState {
    /// 是否已有可繪製的目前畫面
    #[must_use]
    pub fn has_current_frame(self) -> bool {
        self >= Self::HaveCurrentData
    }
}

/// 來源自己發出的狀態通知
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceEvent {
    Play,
    Pause,
    Ended,
    Seeked(f64),
    TimeUpdate(f64),
}

pub trait VideoSource {
    /// 開始載入新的影片，取代目前的來源
    fn open(&mut self, file: &VideoFile) -> Result<()>;

    /// 輪詢中繼資料；尚未就緒時回傳 `None`
    fn poll_metadata(&mut self) -> Result<Option<SourceMetadata>>;

    fn ready_state(&self) -> ReadyState;

    /// 原始畫面尺寸，中繼資料就緒前為 `None`
    fn dimensions(&self) -> Option<(u32, u32)>;

    fn current_time(&self) -> f64;

    /// 要求跳轉；實際位置以 `SourceEvent::Seeked` 通知
    fn set_current_time(&mut self, seconds: f64);

    /// 是否仍在跳轉中，每次呼叫都讓來源有機會推進
    fn is_seeking(&mut self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// 把目前畫面畫到畫布上，畫布大小已與來源原始尺寸一致
    fn render_frame(&mut self, surface: &mut RgbaImage) -> Result<()>;

    /// 取出自上次呼叫以來累積的通知
    fn drain_events(&mut self) -> Vec<SourceEvent>;

    /// 釋放目前來源佔用的資源
    fn close(&mut self);
}
