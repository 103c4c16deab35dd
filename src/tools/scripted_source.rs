//! 可預期行為的記憶體內影片來源
//!
//! 不解碼任何資料：長度與尺寸由建構時決定，畫面以時間推算出的單色填滿。
//! 可設定中繼資料與跳轉需要輪詢幾次才完成，以及哪些時間點繪製會失敗。

use crate::tools::video_source::{ReadyState, SourceEvent, SourceMetadata, VideoFile, VideoSource};
use anyhow::{Result, bail};
use image::{Rgba, RgbaImage};
use std::collections::VecDeque;

const TIME_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct ScriptedSource {
    duration_seconds: f64,
    width: u32,
    height: u32,
    metadata_delay: u32,
    seek_delay: u32,
    failing_times: Vec<f64>,
    fail_open: bool,

    opened: bool,
    metadata_polls_left: u32,
    metadata_ready: bool,
    current_time: f64,
    seek_polls_left: Option<u32>,
    paused: bool,
    render_count: usize,
    events: VecDeque<SourceEvent>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(duration_seconds: f64, width: u32, height: u32) -> Self {
        Self {
            duration_seconds,
            width,
            height,
            metadata_delay: 0,
            seek_delay: 0,
            failing_times: Vec::new(),
            fail_open: false,
            opened: false,
            metadata_polls_left: 0,
            metadata_ready: false,
            current_time: 0.0,
            seek_polls_left: None,
            paused: true,
            render_count: 0,
            events: VecDeque::new(),
        }
    }

    /// 中繼資料在第 `polls + 1` 次輪詢時才就緒
    #[must_use]
    pub const fn with_metadata_delay(mut self, polls: u32) -> Self {
        self.metadata_delay = polls;
        self
    }

    /// 每次跳轉需要 `polls` 次 `is_seeking` 才完成
    #[must_use]
    pub const fn with_seek_delay(mut self, polls: u32) -> Self {
        self.seek_delay = polls;
        self
    }

    #[must_use]
    pub fn with_render_failure_at(mut self, seconds: f64) -> Self {
        self.failing_times.push(seconds);
        self
    }

    #[must_use]
    pub const fn with_open_failure(mut self) -> Self {
        self.fail_open = true;
        self
    }

    #[must_use]
    pub const fn render_count(&self) -> usize {
        self.render_count
    }

    /// 模擬播放時鐘前進
    pub fn advance(&mut self, seconds: f64) {
        if self.paused || !self.metadata_ready {
            return;
        }

        self.current_time = (self.current_time + seconds).min(self.duration_seconds);
        self.events.push_back(SourceEvent::TimeUpdate(self.current_time));

        if self.current_time >= self.duration_seconds {
            self.paused = true;
            self.events.push_back(SourceEvent::Pause);
            self.events.push_back(SourceEvent::Ended);
        }
    }

    /// 依時間推算的畫面顏色
    #[must_use]
    pub fn color_at(seconds: f64) -> Rgba<u8> {
        let centis = (seconds * 100.0).round() as u64;
        Rgba([
            (centis % 256) as u8,
            ((centis / 256) % 256) as u8,
            128,
            255,
        ])
    }
}

impl VideoSource for ScriptedSource {
    fn open(&mut self, _file: &VideoFile) -> Result<()> {
        self.close();
        if self.fail_open {
            bail!("無法解碼影片");
        }
        self.opened = true;
        self.metadata_polls_left = self.metadata_delay;
        Ok(())
    }

    fn poll_metadata(&mut self) -> Result<Option<SourceMetadata>> {
        if !self.opened {
            bail!("尚未載入影片");
        }

        if !self.metadata_ready {
            if self.metadata_polls_left > 0 {
                self.metadata_polls_left -= 1;
                return Ok(None);
            }
            self.metadata_ready = true;
        }

        Ok(Some(SourceMetadata {
            duration_seconds: self.duration_seconds,
            width: self.width,
            height: self.height,
        }))
    }

    fn ready_state(&self) -> ReadyState {
        if !self.metadata_ready {
            ReadyState::HaveNothing
        } else if self.seek_polls_left.is_some() {
            ReadyState::HaveMetadata
        } else {
            ReadyState::HaveEnoughData
        }
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.metadata_ready.then_some((self.width, self.height))
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds.clamp(0.0, self.duration_seconds);
        if self.seek_delay == 0 {
            self.seek_polls_left = None;
            self.events.push_back(SourceEvent::Seeked(self.current_time));
        } else {
            self.seek_polls_left = Some(self.seek_delay);
        }
    }

    fn is_seeking(&mut self) -> bool {
        match self.seek_polls_left {
            Some(0) | None => {
                if self.seek_polls_left.take().is_some() {
                    self.events.push_back(SourceEvent::Seeked(self.current_time));
                }
                false
            }
            Some(left) => {
                self.seek_polls_left = Some(left - 1);
                true
            }
        }
    }

    fn play(&mut self) {
        if !self.paused || !self.metadata_ready {
            return;
        }
        if self.current_time >= self.duration_seconds {
            self.current_time = 0.0;
        }
        self.paused = false;
        self.events.push_back(SourceEvent::Play);
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.events.push_back(SourceEvent::Pause);
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn render_frame(&mut self, surface: &mut RgbaImage) -> Result<()> {
        if !self.metadata_ready {
            bail!("尚未載入影片");
        }
        if self
            .failing_times
            .iter()
            .any(|t| (t - self.current_time).abs() < TIME_EPSILON)
        {
            bail!("無法解碼 {:.2}s 的畫面", self.current_time);
        }

        let color = Self::color_at(self.current_time);
        for pixel in surface.pixels_mut() {
            *pixel = color;
        }
        self.render_count += 1;
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<SourceEvent> {
        self.events.drain(..).collect()
    }

    fn close(&mut self) {
        self.opened = false;
        self.metadata_ready = false;
        self.current_time = 0.0;
        self.seek_polls_left = None;
        self.paused = true;
        self.events.clear();
    }
}
