use super::frame_rate::estimate_frame_rate;
use super::state::{PlaybackEvent, PlaybackPhase, PlaybackState, VideoInfo, frame_index_at};
use crate::config::{Config, UserSettings, VideoMimeTable};
use crate::error::{ExtractorError, ExtractorResult};
use crate::signal::CancelToken;
use crate::tools::{
    SourceEvent, SourceMetadata, VideoFile, VideoSource, WaitPolicy, validate_video_file,
    wait_until,
};
use log::{debug, info, warn};
use std::sync::mpsc::{self, Receiver, Sender};

/// 播放控制器的可調整參數
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    pub max_file_size: u64,
    pub default_frame_rate: f64,
    pub skip_seconds: f64,
    pub metadata_wait: WaitPolicy,
    pub seek_wait: WaitPolicy,
}

impl PlaybackOptions {
    #[must_use]
    pub const fn from_settings(settings: &UserSettings) -> Self {
        Self {
            max_file_size: settings.max_file_size_bytes,
            default_frame_rate: settings.default_frame_rate,
            skip_seconds: settings.skip_seconds,
            metadata_wait: WaitPolicy::from_millis(
                settings.metadata_timeout_ms,
                settings.poll_interval_ms,
            ),
            seek_wait: WaitPolicy::from_millis(settings.seek_timeout_ms, settings.poll_interval_ms),
        }
    }
}

/// 播放控制器
///
/// 持有播放位置、長度、播放狀態與推測幀率。實際播放由來源自己的時鐘推進，
/// 控制器只送出開始／停止／跳轉指令，並依來源的通知更新狀態。
///
/// 狀態：`Empty → Loading → ReadyPaused ⇄ ReadyPlaying`，載入失敗回到 `Empty`。
pub struct PlaybackController<S: VideoSource> {
    source: S,
    mime_table: VideoMimeTable,
    options: PlaybackOptions,
    cancel: CancelToken,
    phase: PlaybackPhase,
    state: Option<PlaybackState>,
    file_name: Option<String>,
    subscribers: Vec<Sender<PlaybackEvent>>,
}

impl<S: VideoSource> PlaybackController<S> {
    pub fn new(source: S, config: &Config, cancel: CancelToken) -> Self {
        Self::with_options(
            source,
            config.mime_table.clone(),
            PlaybackOptions::from_settings(&config.settings),
            cancel,
        )
    }

    pub const fn with_options(
        source: S,
        mime_table: VideoMimeTable,
        options: PlaybackOptions,
        cancel: CancelToken,
    ) -> Self {
        Self {
            source,
            mime_table,
            options,
            cancel,
            phase: PlaybackPhase::Empty,
            state: None,
            file_name: None,
            subscribers: Vec::new(),
        }
    }

    /// 訂閱位置與狀態變化；接收端被丟棄後自動取消訂閱
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    #[must_use]
    pub const fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    #[must_use]
    pub const fn state(&self) -> Option<&PlaybackState> {
        self.state.as_ref()
    }

    #[must_use]
    pub const fn options(&self) -> &PlaybackOptions {
        &self.options
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// 擷取畫面或批次跳轉時需要直接操作來源
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[must_use]
    pub fn position(&self) -> f64 {
        self.state.map_or(0.0, |s| s.position_seconds)
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.state.map_or(0.0, |s| s.duration_seconds)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state.is_some_and(|s| s.is_playing)
    }

    /// 目前使用的幀率；尚未載入時回傳預設值
    #[must_use]
    pub fn frame_rate(&self) -> f64 {
        self.state
            .map_or(self.options.default_frame_rate, |s| s.estimated_frame_rate)
    }

    /// 載入影片並等待中繼資料
    ///
    /// 格式或大小不符時直接拒絕，不改變任何狀態。
    pub fn load_source(&mut self, file: VideoFile) -> ExtractorResult<VideoInfo> {
        if let Err(e) = validate_video_file(&file, &self.mime_table, self.options.max_file_size) {
            warn!("拒絕載入影片 {}: {e}", file.name);
            return Err(e);
        }

        if self.phase != PlaybackPhase::Empty {
            self.release();
        }

        info!("載入影片: {} ({} bytes)", file.name, file.size());
        self.set_phase(PlaybackPhase::Loading);

        if let Err(e) = self.source.open(&file) {
            warn!("影片來源初始化失敗: {e:#}");
            self.set_phase(PlaybackPhase::Empty);
            return Err(ExtractorError::SourceLoadFailure(format!("{e:#}")));
        }

        let metadata = match self.wait_for_metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("等待影片中繼資料失敗: {e}");
                self.release();
                return Err(e);
            }
        };

        let frame_rate = estimate_frame_rate(
            metadata.width,
            metadata.height,
            self.options.default_frame_rate,
        );

        // 丟棄載入期間累積的通知
        let _ = self.source.drain_events();

        self.state = Some(PlaybackState {
            position_seconds: 0.0,
            duration_seconds: metadata.duration_seconds,
            is_playing: false,
            estimated_frame_rate: frame_rate,
            width: metadata.width,
            height: metadata.height,
        });
        self.file_name = Some(file.name);
        self.set_phase(PlaybackPhase::ReadyPaused);

        let video_info = self.video_info().ok_or(ExtractorError::NotReady)?;
        info!(
            "影片已就緒: {:.2}s, {}x{}, 推測 {} fps",
            video_info.duration, video_info.width, video_info.height, video_info.frame_rate
        );
        self.notify(&PlaybackEvent::Loaded(video_info.clone()));
        self.notify_position();

        Ok(video_info)
    }

    fn wait_for_metadata(&mut self) -> ExtractorResult<SourceMetadata> {
        let source = &mut self.source;
        let mut metadata = None;

        wait_until(
            self.options.metadata_wait,
            &self.cancel,
            "video metadata",
            || match source.poll_metadata() {
                Ok(Some(m)) => {
                    metadata = Some(m);
                    Ok(true)
                }
                Ok(None) => Ok(false),
                Err(e) => Err(ExtractorError::SourceLoadFailure(format!("{e:#}"))),
            },
        )?;

        let metadata = metadata.ok_or(ExtractorError::NotReady)?;
        if !metadata.duration_seconds.is_finite()
            || metadata.duration_seconds < 0.0
            || metadata.width == 0
            || metadata.height == 0
        {
            return Err(ExtractorError::SourceLoadFailure(format!(
                "invalid metadata: {:.2}s, {}x{}",
                metadata.duration_seconds, metadata.width, metadata.height
            )));
        }

        Ok(metadata)
    }

    /// 釋放目前的來源並回到 `Empty`
    pub fn release(&mut self) {
        self.source.close();
        self.state = None;
        self.file_name = None;
        self.set_phase(PlaybackPhase::Empty);
    }

    pub fn play(&mut self) {
        if self.phase != PlaybackPhase::ReadyPaused {
            debug!("略過播放指令，目前狀態: {}", self.phase);
            return;
        }
        self.source.play();
        self.sync();
    }

    pub fn pause(&mut self) {
        if self.phase != PlaybackPhase::ReadyPlaying {
            return;
        }
        self.source.pause();
        self.sync();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// 跳到指定時間，超出範圍時夾到 `[0, duration]`
    pub fn seek_to_time(&mut self, seconds: f64) -> ExtractorResult<()> {
        let duration = self.ready_state()?.duration_seconds;
        let target = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, duration)
        };

        debug!("跳轉至 {target:.3}s");
        self.source.set_current_time(target);
        self.sync();
        Ok(())
    }

    pub fn seek_to_percent(&mut self, percent: f64) -> ExtractorResult<()> {
        let duration = self.ready_state()?.duration_seconds;
        self.seek_to_time(percent / 100.0 * duration)
    }

    /// 以推測幀率換算並移動 `frames` 格
    ///
    /// 目標對齊到格線 `(目前格號 + frames) / fps`，重複逐格不會累積浮點誤差。
    pub fn seek_by_frames(&mut self, frames: i64) -> ExtractorResult<()> {
        let frame_rate = self.ready_state()?.estimated_frame_rate;
        let current = frame_index_at(self.source.current_time(), frame_rate) as i64;
        let target = (current + frames).max(0) as f64 / frame_rate;
        self.seek_to_time(target)
    }

    pub fn next_frame(&mut self) -> ExtractorResult<()> {
        self.ready_state()?;
        self.pause();
        self.seek_by_frames(1)
    }

    pub fn previous_frame(&mut self) -> ExtractorResult<()> {
        self.ready_state()?;
        self.pause();
        self.seek_by_frames(-1)
    }

    /// 前後跳 `skip_seconds` 秒，換算成 `round(skip_seconds × fps)` 格
    pub fn skip(&mut self, forward: bool) -> ExtractorResult<()> {
        let frame_rate = self.ready_state()?.estimated_frame_rate;
        let frames = (self.options.skip_seconds * frame_rate).round() as i64;
        self.seek_by_frames(if forward { frames } else { -frames })
    }

    /// 等待來源完成跳轉並套用通知
    pub fn settle(&mut self) -> ExtractorResult<()> {
        self.ready_state()?;
        let source = &mut self.source;
        wait_until(self.options.seek_wait, &self.cancel, "seek", || {
            Ok(!source.is_seeking())
        })?;
        self.sync();
        Ok(())
    }

    /// 讀取來源累積的通知並更新狀態
    pub fn sync(&mut self) {
        for event in self.source.drain_events() {
            let Some(state) = self.state.as_mut() else {
                continue;
            };

            match event {
                SourceEvent::Play => {
                    state.is_playing = true;
                    self.set_phase(PlaybackPhase::ReadyPlaying);
                }
                SourceEvent::Pause | SourceEvent::Ended => {
                    state.is_playing = false;
                    self.set_phase(PlaybackPhase::ReadyPaused);
                }
                SourceEvent::Seeked(position) | SourceEvent::TimeUpdate(position) => {
                    state.position_seconds = position.clamp(0.0, state.duration_seconds);
                    self.notify_position();
                }
            }
        }
    }

    #[must_use]
    pub fn current_frame_number(&self) -> u64 {
        self.state.map_or(0, |s| {
            frame_index_at(self.source.current_time(), s.estimated_frame_rate)
        })
    }

    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.state
            .map_or(0, |s| frame_index_at(s.duration_seconds, s.estimated_frame_rate))
    }

    #[must_use]
    pub fn video_info(&self) -> Option<VideoInfo> {
        let state = self.state?;
        Some(VideoInfo {
            name: self
                .file_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            duration: state.duration_seconds,
            frame_rate: state.estimated_frame_rate,
            total_frames: self.total_frames(),
            width: state.width,
            height: state.height,
            current_time: self.source.current_time(),
            current_frame: self.current_frame_number(),
        })
    }

    fn ready_state(&self) -> ExtractorResult<PlaybackState> {
        match self.state {
            Some(state) if self.phase.is_ready() => Ok(state),
            _ => Err(ExtractorError::NotReady),
        }
    }

    fn set_phase(&mut self, phase: PlaybackPhase) {
        if self.phase == phase {
            return;
        }
        debug!("播放狀態: {} -> {}", self.phase, phase);
        self.phase = phase;
        self.notify(&PlaybackEvent::StateChanged(phase));
    }

    fn notify_position(&mut self) {
        if let Some(state) = self.state {
            self.notify(&PlaybackEvent::PositionChanged {
                position_seconds: state.position_seconds,
                duration_seconds: state.duration_seconds,
            });
        }
    }

    fn notify(&mut self, event: &PlaybackEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ScriptedSource;

    fn options() -> PlaybackOptions {
        PlaybackOptions {
            max_file_size: 1024,
            default_frame_rate: 30.0,
            skip_seconds: 5.0,
            metadata_wait: WaitPolicy::from_millis(1_000, 0),
            seek_wait: WaitPolicy::from_millis(1_000, 0),
        }
    }

    fn controller(source: ScriptedSource) -> PlaybackController<ScriptedSource> {
        let config = Config::from_settings_path(std::path::Path::new("/nonexistent/settings.json"))
            .unwrap();
        PlaybackController::with_options(source, config.mime_table, options(), CancelToken::new())
    }

    fn mp4() -> VideoFile {
        VideoFile::new("clip.mp4", "video/mp4", vec![0; 16])
    }

    #[test]
    fn test_load_source_enters_ready_paused() {
        let mut controller = controller(ScriptedSource::new(10.0, 1920, 1080).with_metadata_delay(3));
        let info = controller.load_source(mp4()).unwrap();

        assert_eq!(controller.phase(), PlaybackPhase::ReadyPaused);
        assert!((info.frame_rate - 30.0).abs() < f64::EPSILON);
        assert_eq!(info.total_frames, 300);
        assert_eq!(info.name, "clip.mp4");
        assert!(controller.position().abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejected_file_leaves_state_untouched() {
        let mut controller = controller(ScriptedSource::new(10.0, 640, 360));
        let err = controller
            .load_source(VideoFile::new("clip.mkv", "video/x-matroska", vec![0; 16]))
            .unwrap_err();
        assert!(matches!(err, ExtractorError::InvalidFormat { .. }));
        assert_eq!(controller.phase(), PlaybackPhase::Empty);

        let err = controller
            .load_source(VideoFile::new("big.mp4", "video/mp4", vec![0; 2048]))
            .unwrap_err();
        assert!(matches!(err, ExtractorError::TooLarge { .. }));
        assert_eq!(controller.phase(), PlaybackPhase::Empty);
    }

    #[test]
    fn test_open_failure_returns_to_empty() {
        let mut controller = controller(ScriptedSource::new(10.0, 640, 360).with_open_failure());
        let events = controller.subscribe();

        let err = controller.load_source(mp4()).unwrap_err();
        assert!(matches!(err, ExtractorError::SourceLoadFailure(_)));
        assert_eq!(controller.phase(), PlaybackPhase::Empty);

        let phases: Vec<_> = events.try_iter().collect();
        assert_eq!(
            phases,
            vec![
                PlaybackEvent::StateChanged(PlaybackPhase::Loading),
                PlaybackEvent::StateChanged(PlaybackPhase::Empty),
            ]
        );
    }

    #[test]
    fn test_metadata_timeout() {
        let mut opts = options();
        opts.metadata_wait = WaitPolicy::from_millis(5, 1);
        let config = Config::from_settings_path(std::path::Path::new("/nonexistent/settings.json"))
            .unwrap();
        let mut controller = PlaybackController::with_options(
            ScriptedSource::new(10.0, 640, 360).with_metadata_delay(u32::MAX),
            config.mime_table,
            opts,
            CancelToken::new(),
        );

        let err = controller.load_source(mp4()).unwrap_err();
        assert!(matches!(err, ExtractorError::Timeout { .. }));
        assert_eq!(controller.phase(), PlaybackPhase::Empty);
    }

    #[test]
    fn test_play_pause_toggle() {
        let mut controller = controller(ScriptedSource::new(10.0, 640, 360));
        controller.load_source(mp4()).unwrap();

        controller.play();
        assert_eq!(controller.phase(), PlaybackPhase::ReadyPlaying);
        assert!(controller.is_playing());

        controller.play();
        assert_eq!(controller.phase(), PlaybackPhase::ReadyPlaying);

        controller.toggle_play_pause();
        assert_eq!(controller.phase(), PlaybackPhase::ReadyPaused);
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_ended_returns_to_paused() {
        let mut controller = controller(ScriptedSource::new(1.0, 640, 360));
        controller.load_source(mp4()).unwrap();
        controller.play();

        controller.source_mut().advance(5.0);
        controller.sync();

        assert_eq!(controller.phase(), PlaybackPhase::ReadyPaused);
        assert!((controller.position() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_seek_is_clamped() {
        let mut controller = controller(ScriptedSource::new(10.0, 640, 360));
        controller.load_source(mp4()).unwrap();

        controller.seek_to_time(25.0).unwrap();
        assert!((controller.position() - 10.0).abs() < f64::EPSILON);

        controller.seek_to_time(-3.0).unwrap();
        assert!(controller.position().abs() < f64::EPSILON);

        controller.seek_to_percent(25.0).unwrap();
        assert!((controller.position() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_seek_before_load_is_not_ready() {
        let mut controller = controller(ScriptedSource::new(10.0, 640, 360));
        assert!(matches!(
            controller.seek_to_time(1.0),
            Err(ExtractorError::NotReady)
        ));
        assert!(matches!(controller.next_frame(), Err(ExtractorError::NotReady)));
    }

    #[test]
    fn test_step_frame_pauses_first() {
        let mut controller = controller(ScriptedSource::new(10.0, 1920, 1080));
        controller.load_source(mp4()).unwrap();
        controller.seek_to_time(1.0).unwrap();
        controller.play();

        controller.next_frame().unwrap();
        assert_eq!(controller.phase(), PlaybackPhase::ReadyPaused);
        assert!((controller.position() - (1.0 + 1.0 / 30.0)).abs() < 1e-9);

        controller.previous_frame().unwrap();
        assert!((controller.position() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_steps_land_on_each_frame() {
        let mut controller = controller(ScriptedSource::new(10.0, 1920, 1080));
        controller.load_source(mp4()).unwrap();

        for k in 1..=30 {
            controller.next_frame().unwrap();
            assert_eq!(controller.current_frame_number(), k, "step {k}");
        }
        assert!((controller.position() - 1.0).abs() < 1e-9);

        for k in (0..30).rev() {
            controller.previous_frame().unwrap();
            assert_eq!(controller.current_frame_number(), k, "step back to {k}");
        }
    }

    #[test]
    fn test_step_from_mid_frame_moves_to_next_frame() {
        let mut controller = controller(ScriptedSource::new(10.0, 1920, 1080));
        controller.load_source(mp4()).unwrap();
        controller.seek_to_time(1.06).unwrap();
        assert_eq!(controller.current_frame_number(), 31);

        controller.next_frame().unwrap();
        assert_eq!(controller.current_frame_number(), 32);
        assert!((controller.position() - 32.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_skip_uses_frame_rate() {
        let mut controller = controller(ScriptedSource::new(20.0, 3840, 2160));
        controller.load_source(mp4()).unwrap();

        controller.skip(true).unwrap();
        assert!((controller.position() - 5.0).abs() < 1e-9);

        controller.skip(false).unwrap();
        assert!(controller.position().abs() < 1e-9);
    }

    #[test]
    fn test_delayed_seek_updates_after_settle() {
        let mut controller = controller(ScriptedSource::new(10.0, 640, 360).with_seek_delay(3));
        controller.load_source(mp4()).unwrap();

        controller.seek_to_time(4.0).unwrap();
        assert!(controller.position().abs() < f64::EPSILON);

        controller.settle().unwrap();
        assert!((controller.position() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_subscriber_receives_position_changes() {
        let mut controller = controller(ScriptedSource::new(10.0, 640, 360));
        controller.load_source(mp4()).unwrap();
        let events = controller.subscribe();

        controller.seek_to_time(3.0).unwrap();

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![PlaybackEvent::PositionChanged {
                position_seconds: 3.0,
                duration_seconds: 10.0
            }]
        );
    }

    #[test]
    fn test_dropped_subscriber_is_removed() {
        let mut controller = controller(ScriptedSource::new(10.0, 640, 360));
        drop(controller.subscribe());
        controller.load_source(mp4()).unwrap();
        assert!(controller.subscribers.is_empty());
    }
}
