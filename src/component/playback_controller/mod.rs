//! 播放控制元件
//!
//! 管理播放頭、長度、播放／暫停狀態與推測幀率，
//! 提供逐格移動與時間跳轉，並以通道通知訂閱者。

mod frame_rate;
mod main;
mod state;

pub use frame_rate::estimate_frame_rate;
pub use main::{PlaybackController, PlaybackOptions};
pub use state::{
    PlaybackEvent, PlaybackPhase, PlaybackState, PlaybackStatus, VideoInfo, frame_index_at,
};
