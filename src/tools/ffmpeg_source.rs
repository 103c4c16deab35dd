//! 以 ffprobe / ffmpeg 實作的桌面影片來源
//!
//! 載入的影片先寫入暫存檔，中繼資料由 ffprobe 取得；
//! 播放時以系統時鐘推進播放頭，畫面則在需要時由 ffmpeg 解出單張 RGBA。

use crate::tools::ffprobe_info::probe_video;
use crate::tools::video_source::{ReadyState, SourceEvent, SourceMetadata, VideoFile, VideoSource};
use anyhow::{Context, Result, bail};
use image::RgbaImage;
use log::{debug, info};
use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tempfile::NamedTempFile;

/// 兩段式 seek 的前置緩衝時間（秒）
const SEEK_MARGIN: f64 = 2.0;

/// 擷取位置與影片結尾至少保留的距離（秒）
const END_MARGIN: f64 = 0.001;

#[derive(Default)]
pub struct FfmpegSource {
    file: Option<NamedTempFile>,
    metadata: Option<SourceMetadata>,
    /// 最後一次跳轉或暫停時的位置
    base_time: f64,
    /// 播放中時記錄開始計時的時間點
    playing_since: Option<Instant>,
    events: VecDeque<SourceEvent>,
}

impl FfmpegSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn duration(&self) -> f64 {
        self.metadata.map_or(0.0, |m| m.duration_seconds)
    }

    fn raw_time(&self) -> f64 {
        match self.playing_since {
            Some(started) => self.base_time + started.elapsed().as_secs_f64(),
            None => self.base_time,
        }
    }
}

impl VideoSource for FfmpegSource {
    fn open(&mut self, file: &VideoFile) -> Result<()> {
        self.close();

        let mut temp = tempfile::Builder::new()
            .prefix("frame_extractor_")
            .tempfile()
            .context("無法建立暫存檔")?;
        temp.write_all(&file.bytes)
            .with_context(|| format!("無法寫入暫存檔: {}", file.name))?;
        temp.flush()?;

        debug!("影片已寫入暫存檔: {}", temp.path().display());
        self.file = Some(temp);
        Ok(())
    }

    fn poll_metadata(&mut self) -> Result<Option<SourceMetadata>> {
        if self.metadata.is_some() {
            return Ok(self.metadata);
        }

        let Some(file) = self.file.as_ref() else {
            bail!("尚未載入影片");
        };

        let probe = probe_video(file.path())?;
        let metadata = SourceMetadata {
            duration_seconds: probe.duration_seconds,
            width: probe.width,
            height: probe.height,
        };
        info!(
            "影片資訊: {:.2}s, {}x{}",
            metadata.duration_seconds, metadata.width, metadata.height
        );

        self.metadata = Some(metadata);
        Ok(self.metadata)
    }

    fn ready_state(&self) -> ReadyState {
        if self.metadata.is_some() {
            ReadyState::HaveEnoughData
        } else {
            ReadyState::HaveNothing
        }
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.metadata.map(|m| (m.width, m.height))
    }

    fn current_time(&self) -> f64 {
        self.raw_time().min(self.duration())
    }

    fn set_current_time(&mut self, seconds: f64) {
        let target = seconds.clamp(0.0, self.duration());
        self.base_time = target;
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
        self.events.push_back(SourceEvent::Seeked(target));
    }

    fn is_seeking(&mut self) -> bool {
        // 畫面在繪製時才解碼，跳轉本身立即完成
        false
    }

    fn play(&mut self) {
        if self.playing_since.is_some() || self.metadata.is_none() {
            return;
        }
        if self.base_time >= self.duration() {
            self.base_time = 0.0;
        }
        self.playing_since = Some(Instant::now());
        self.events.push_back(SourceEvent::Play);
    }

    fn pause(&mut self) {
        if self.playing_since.is_none() {
            return;
        }
        self.base_time = self.current_time();
        self.playing_since = None;
        self.events.push_back(SourceEvent::Pause);
    }

    fn is_paused(&self) -> bool {
        self.playing_since.is_none()
    }

    fn render_frame(&mut self, surface: &mut RgbaImage) -> Result<()> {
        let Some(file) = self.file.as_ref() else {
            bail!("尚未載入影片");
        };

        let expected = surface.as_raw().len();
        let timestamp = self
            .current_time()
            .min(self.duration() - END_MARGIN)
            .max(0.0);

        let mut pixels = decode_at(file.path(), timestamp)?;
        if pixels.is_empty() {
            // 位置落在最後一格之後，ffmpeg 不會輸出任何畫面
            debug!("{timestamp:.3}s 之後沒有畫面，改取影片最後一格");
            let tail = decode_tail(file.path())?;
            pixels = last_frame(&tail, expected)
                .with_context(|| format!("影片結尾沒有完整畫面: {} bytes", tail.len()))?
                .to_vec();
        }

        if pixels.len() != expected {
            bail!(
                "畫面資料大小不符: 預期 {} bytes，實際 {} bytes",
                expected,
                pixels.len()
            );
        }

        surface.copy_from_slice(&pixels);
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<SourceEvent> {
        if self.playing_since.is_some() {
            if self.raw_time() >= self.duration() {
                self.base_time = self.duration();
                self.playing_since = None;
                self.events.push_back(SourceEvent::Ended);
            } else {
                self.events.push_back(SourceEvent::TimeUpdate(self.current_time()));
            }
        }
        self.events.drain(..).collect()
    }

    fn close(&mut self) {
        if let Some(file) = self.file.take() {
            debug!("釋放暫存檔: {}", file.path().display());
        }
        self.metadata = None;
        self.base_time = 0.0;
        self.playing_since = None;
        self.events.clear();
    }
}

/// 以兩段式 seek 解碼指定時間的一格畫面（RGBA）
fn decode_at(path: &Path, timestamp: f64) -> Result<Vec<u8>> {
    let t0 = (timestamp - SEEK_MARGIN).max(0.0);
    let delta = timestamp - t0;

    let mut command = Command::new("ffmpeg");
    command.args(["-hide_banner", "-loglevel", "error"]);

    // 第一個 -ss（在 -i 前）：快速跳到附近的關鍵幀
    if t0 > 0.0 {
        command.arg("-ss").arg(format!("{t0:.3}"));
    }
    command.arg("-i").arg(path);
    // 第二個 -ss（在 -i 後）：精準解碼到目標時間
    if delta > 0.0 {
        command.arg("-ss").arg(format!("{delta:.3}"));
    }
    command.args([
        "-frames:v", "1", "-an", "-sn", "-dn", "-f", "rawvideo", "-pix_fmt", "rgba", "-",
    ]);

    run_ffmpeg(&mut command)
}

/// 解碼影片最後一秒的所有畫面
fn decode_tail(path: &Path) -> Result<Vec<u8>> {
    let mut command = Command::new("ffmpeg");
    command
        .args(["-hide_banner", "-loglevel", "error", "-sseof", "-1", "-i"])
        .arg(path)
        .args(["-an", "-sn", "-dn", "-f", "rawvideo", "-pix_fmt", "rgba", "-"]);

    run_ffmpeg(&mut command)
}

fn run_ffmpeg(command: &mut Command) -> Result<Vec<u8>> {
    let output = command.output().context("無法執行 ffmpeg 擷取畫面")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffmpeg 擷取畫面失敗: {}", stderr.trim());
    }

    Ok(output.stdout)
}

/// 從連續的原始畫面資料中取出最後一格
fn last_frame(pixels: &[u8], frame_len: usize) -> Option<&[u8]> {
    if frame_len == 0 || pixels.len() < frame_len || pixels.len() % frame_len != 0 {
        return None;
    }
    Some(&pixels[pixels.len() - frame_len..])
}
