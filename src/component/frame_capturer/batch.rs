use super::main::FrameCapturer;
use super::snapshot::Snapshot;
use crate::error::{ExtractorError, ExtractorResult};
use crate::tools::VideoSource;
use log::{info, warn};

impl FrameCapturer {
    /// 依序擷取多個時間點
    ///
    /// 每個時間點都等跳轉完成後才擷取，下一個時間點在前一個完成後才開始。
    /// 單一時間點失敗（逾時、無畫面、解碼失敗）會被略過，輸出順序與輸入相同；
    /// 收到取消時停止並回傳 `Cancelled`。結束後回到原本的位置。
    pub fn capture_at_timestamps<S: VideoSource + ?Sized>(
        &mut self,
        source: &mut S,
        timestamps: &[f64],
        frame_rate: f64,
    ) -> ExtractorResult<Vec<Snapshot>> {
        let original_time = source.current_time();
        let mut snapshots = Vec::with_capacity(timestamps.len());

        for (index, &timestamp) in timestamps.iter().enumerate() {
            if self.is_cancelled() {
                warn!("收到中斷信號，停止批次擷取");
                self.restore_position(source, original_time);
                return Err(ExtractorError::Cancelled);
            }

            source.set_current_time(timestamp);

            let result = match self.wait_for_seek(source) {
                Ok(()) => self.capture_snapshot_as_buffer(source, frame_rate),
                Err(e) => Err(e),
            };

            match result {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(ExtractorError::Cancelled) => {
                    warn!("收到中斷信號，停止批次擷取");
                    self.restore_position(source, original_time);
                    return Err(ExtractorError::Cancelled);
                }
                Err(e) => {
                    warn!("略過時間點 [{index}] {timestamp:.3}s: {e}");
                }
            }
        }

        self.restore_position(source, original_time);

        info!(
            "批次擷取完成: 成功 {}, 略過 {}",
            snapshots.len(),
            timestamps.len() - snapshots.len()
        );

        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use crate::component::frame_capturer::FrameCapturer;
    use crate::error::ExtractorError;
    use crate::signal::CancelToken;
    use crate::tools::{ScriptedSource, VideoFile, VideoSource, WaitPolicy};

    fn loaded_source(source: ScriptedSource) -> ScriptedSource {
        let mut source = source;
        source
            .open(&VideoFile::new("clip.mp4", "video/mp4", Vec::new()))
            .unwrap();
        source.poll_metadata().unwrap();
        source
    }

    #[test]
    fn test_batch_preserves_order_and_restores_position() {
        let mut source = loaded_source(ScriptedSource::new(10.0, 8, 8).with_seek_delay(3));
        source.set_current_time(2.0);
        while source.is_seeking() {}

        let mut capturer =
            FrameCapturer::new(WaitPolicy::from_millis(1_000, 0), CancelToken::new());
        let snapshots = capturer
            .capture_at_timestamps(&mut source, &[6.0, 1.0, 3.5], 30.0)
            .unwrap();

        let times: Vec<f64> = snapshots.iter().map(|s| s.timestamp_seconds).collect();
        assert_eq!(times, vec![6.0, 1.0, 3.5]);
        assert_eq!(snapshots[0].frame_index, 180);
        assert!((source.current_time() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_batch_skips_failed_timestamp() {
        let mut source = loaded_source(ScriptedSource::new(10.0, 8, 8).with_render_failure_at(2.0));

        let mut capturer =
            FrameCapturer::new(WaitPolicy::from_millis(1_000, 0), CancelToken::new());
        let snapshots = capturer
            .capture_at_timestamps(&mut source, &[1.0, 2.0, 3.0], 30.0)
            .unwrap();

        assert_eq!(snapshots.len(), 2);
        assert!((snapshots[1].timestamp_seconds - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_batch_skips_seek_timeout() {
        let mut source = loaded_source(ScriptedSource::new(10.0, 8, 8).with_seek_delay(u32::MAX));

        let mut capturer = FrameCapturer::new(WaitPolicy::from_millis(5, 1), CancelToken::new());
        let snapshots = capturer
            .capture_at_timestamps(&mut source, &[1.0, 2.0], 30.0)
            .unwrap();

        assert!(snapshots.is_empty());
        assert_eq!(source.render_count(), 0);
    }

    #[test]
    fn test_batch_cancelled() {
        let mut source = loaded_source(ScriptedSource::new(10.0, 8, 8));
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut capturer = FrameCapturer::new(WaitPolicy::from_millis(1_000, 0), cancel);
        let err = capturer
            .capture_at_timestamps(&mut source, &[1.0, 2.0], 30.0)
            .unwrap_err();

        assert!(matches!(err, ExtractorError::Cancelled));
        assert_eq!(source.render_count(), 0);
    }

    #[test]
    fn test_batch_empty_input() {
        let mut source = loaded_source(ScriptedSource::new(10.0, 8, 8));
        let mut capturer =
            FrameCapturer::new(WaitPolicy::from_millis(1_000, 0), CancelToken::new());
        let snapshots = capturer.capture_at_timestamps(&mut source, &[], 30.0).unwrap();
        assert!(snapshots.is_empty());
    }
}
