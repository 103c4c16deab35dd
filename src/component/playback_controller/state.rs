use serde::Serialize;
use std::fmt;

/// 播放控制器的狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackPhase {
    Empty,
    Loading,
    ReadyPaused,
    ReadyPlaying,
}

impl PlaybackPhase {
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::ReadyPaused | Self::ReadyPlaying)
    }
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Loading => "loading",
            Self::ReadyPaused => "paused",
            Self::ReadyPlaying => "playing",
        };
        f.write_str(name)
    }
}

/// 目前載入影片的播放狀態
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub is_playing: bool,
    /// 依解析度推測的幀率，只用於把「一格」換算成時間
    pub estimated_frame_rate: f64,
    pub width: u32,
    pub height: u32,
}

/// 影片資訊摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub name: String,
    pub duration: f64,
    pub frame_rate: f64,
    pub total_frames: u64,
    pub width: u32,
    pub height: u32,
    pub current_time: f64,
    pub current_frame: u64,
}

/// 推送給訂閱者的通知
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    StateChanged(PlaybackPhase),
    PositionChanged {
        position_seconds: f64,
        duration_seconds: f64,
    },
    Loaded(VideoInfo),
}

/// 由通知累積出的播放狀態，供畫面顯示使用
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackStatus {
    pub phase: PlaybackPhase,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub video: Option<VideoInfo>,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self {
            phase: PlaybackPhase::Empty,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            video: None,
        }
    }
}

impl PlaybackStatus {
    pub fn apply(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::StateChanged(phase) => {
                self.phase = *phase;
                if matches!(phase, PlaybackPhase::Empty | PlaybackPhase::Loading) {
                    self.video = None;
                    self.position_seconds = 0.0;
                    self.duration_seconds = 0.0;
                }
            }
            PlaybackEvent::PositionChanged {
                position_seconds,
                duration_seconds,
            } => {
                self.position_seconds = *position_seconds;
                self.duration_seconds = *duration_seconds;
            }
            PlaybackEvent::Loaded(info) => {
                self.position_seconds = info.current_time;
                self.duration_seconds = info.duration;
                self.video = Some(info.clone());
            }
        }
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.phase, PlaybackPhase::ReadyPlaying)
    }

    /// 目前位置所在的格號
    #[must_use]
    pub fn current_frame(&self) -> u64 {
        self.video
            .as_ref()
            .map_or(0, |v| frame_index_at(self.position_seconds, v.frame_rate))
    }
}

/// 浮點誤差容忍值，`k / fps` 換算回來仍落在第 k 格
const FRAME_EPSILON: f64 = 1e-6;

/// `floor(seconds × frame_rate)`，負值視為 0
#[must_use]
pub fn frame_index_at(seconds: f64, frame_rate: f64) -> u64 {
    let frames = (seconds * frame_rate + FRAME_EPSILON).floor();
    if frames.is_finite() && frames > 0.0 {
        frames as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_index_at() {
        assert_eq!(frame_index_at(5.0, 30.0), 150);
        assert_eq!(frame_index_at(0.999, 30.0), 29);
        assert_eq!(frame_index_at(0.0, 60.0), 0);
        assert_eq!(frame_index_at(-1.0, 30.0), 0);
    }

    #[test]
    fn test_frame_index_at_frame_boundaries() {
        for k in 0..=300_u32 {
            let seconds = f64::from(k) / 30.0;
            assert_eq!(frame_index_at(seconds, 30.0), u64::from(k), "frame {k}");
        }
        assert_eq!(frame_index_at(7.0 / 60.0, 60.0), 7);
    }

    #[test]
    fn test_status_follows_events() {
        let info = VideoInfo {
            name: "clip.mp4".to_string(),
            duration: 10.0,
            frame_rate: 30.0,
            total_frames: 300,
            width: 1920,
            height: 1080,
            current_time: 0.0,
            current_frame: 0,
        };
        let mut status = PlaybackStatus::default();

        status.apply(&PlaybackEvent::StateChanged(PlaybackPhase::Loading));
        status.apply(&PlaybackEvent::Loaded(info.clone()));
        status.apply(&PlaybackEvent::StateChanged(PlaybackPhase::ReadyPaused));
        status.apply(&PlaybackEvent::PositionChanged {
            position_seconds: 2.0,
            duration_seconds: 10.0,
        });
        assert_eq!(status.video.as_ref(), Some(&info));
        assert_eq!(status.current_frame(), 60);
        assert!(!status.is_playing());

        status.apply(&PlaybackEvent::StateChanged(PlaybackPhase::Empty));
        assert_eq!(status, PlaybackStatus::default());
    }

    #[test]
    fn test_phase_is_ready() {
        assert!(!PlaybackPhase::Empty.is_ready());
        assert!(!PlaybackPhase::Loading.is_ready());
        assert!(PlaybackPhase::ReadyPaused.is_ready());
        assert!(PlaybackPhase::ReadyPlaying.is_ready());
    }

    #[test]
    fn test_video_info_serializes_camel_case() {
        let info = VideoInfo {
            name: "clip.mp4".to_string(),
            duration: 10.0,
            frame_rate: 30.0,
            total_frames: 300,
            width: 1920,
            height: 1080,
            current_time: 0.0,
            current_frame: 0,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["frameRate"], 30.0);
        assert_eq!(json["totalFrames"], 300);
        assert_eq!(json["currentFrame"], 0);
    }
}
