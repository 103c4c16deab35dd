use super::snapshot::Snapshot;
use crate::component::playback_controller::frame_index_at;
use crate::error::{ExtractorError, ExtractorResult};
use crate::signal::CancelToken;
use crate::tools::{VideoSource, WaitPolicy, wait_until};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageEncoder, RgbaImage};
use log::debug;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// 畫面擷取器
///
/// 擷取時把來源目前的畫面畫到一塊重複使用的離屏畫布，
/// 畫布在每次擷取前調整成來源的原始尺寸，接著以 PNG 無損編碼。
/// 所有擷取方法都需要 `&mut self`，同一時間只會有一次擷取使用這塊畫布。
pub struct FrameCapturer {
    surface: RgbaImage,
    seek_wait: WaitPolicy,
    cancel: CancelToken,
}

impl FrameCapturer {
    #[must_use]
    pub fn new(seek_wait: WaitPolicy, cancel: CancelToken) -> Self {
        Self {
            surface: RgbaImage::new(0, 0),
            seek_wait,
            cancel,
        }
    }

    /// 擷取來源目前的畫面
    ///
    /// 時間戳記與幀編號在繪製前讀取；來源還沒有可顯示的畫面時回傳 `NotReady`。
    pub fn capture_snapshot<S: VideoSource + ?Sized>(
        &mut self,
        source: &mut S,
        frame_rate: f64,
    ) -> ExtractorResult<Snapshot> {
        if !source.ready_state().has_current_frame() {
            return Err(ExtractorError::NotReady);
        }

        let (width, height) = source
            .dimensions()
            .filter(|&(w, h)| w > 0 && h > 0)
            .ok_or(ExtractorError::NotReady)?;

        if self.surface.dimensions() != (width, height) {
            debug!("調整擷取畫布尺寸: {width}x{height}");
            self.surface = RgbaImage::new(width, height);
        }

        let timestamp_seconds = source.current_time();
        let frame_index = frame_index_at(timestamp_seconds, frame_rate);

        source
            .render_frame(&mut self.surface)
            .map_err(|e| ExtractorError::CaptureFailure(format!("{e:#}")))?;

        let image = self.encode_surface()?;
        debug!(
            "擷取畫面 {frame_index} ({timestamp_seconds:.3}s): {} bytes",
            image.len()
        );

        Ok(Snapshot::new(
            timestamp_seconds,
            frame_index,
            width,
            height,
            image,
        ))
    }

    /// 與 `capture_snapshot` 相同，並確認影像是可直接寫入壓縮檔的 PNG 位元組
    pub fn capture_snapshot_as_buffer<S: VideoSource + ?Sized>(
        &mut self,
        source: &mut S,
        frame_rate: f64,
    ) -> ExtractorResult<Snapshot> {
        let snapshot = self.capture_snapshot(source, frame_rate)?;
        if !snapshot.image_bytes().starts_with(&PNG_SIGNATURE) {
            return Err(ExtractorError::CaptureFailure(
                "encoded frame is not a PNG buffer".to_string(),
            ));
        }
        Ok(snapshot)
    }

    /// 跳到指定時間擷取一張，完成後回到原本的位置
    pub fn capture_at_time<S: VideoSource + ?Sized>(
        &mut self,
        source: &mut S,
        seconds: f64,
        frame_rate: f64,
    ) -> ExtractorResult<Snapshot> {
        let original_time = source.current_time();

        source.set_current_time(seconds);
        let result = self
            .wait_for_seek(source)
            .and_then(|()| self.capture_snapshot_as_buffer(source, frame_rate));

        self.restore_position(source, original_time);
        result
    }

    pub(super) fn wait_for_seek<S: VideoSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> ExtractorResult<()> {
        wait_until(self.seek_wait, &self.cancel, "seek", || {
            Ok(!source.is_seeking())
        })
    }

    pub(super) fn restore_position<S: VideoSource + ?Sized>(
        &self,
        source: &mut S,
        original_time: f64,
    ) {
        source.set_current_time(original_time);
        if let Err(e) = self.wait_for_seek(source) {
            log::warn!("回到原本位置時等待跳轉失敗: {e}");
        }
    }

    pub(super) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn encode_surface(&self) -> ExtractorResult<Vec<u8>> {
        let (width, height) = self.surface.dimensions();
        let mut buffer = Vec::new();
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Default, FilterType::Adaptive)
            .write_image(self.surface.as_raw(), width, height, ColorType::Rgba8)?;
        Ok(buffer)
    }
}
