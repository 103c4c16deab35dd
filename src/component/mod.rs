//! 功能元件模組
//!
//! 播放控制、畫面擷取與收藏清單，各自只依賴 `tools` 中的能力介面

pub mod collection_store;
pub mod frame_capturer;
pub mod playback_controller;

pub use collection_store::{CollectionStore, ZipArchiveWriter};
pub use frame_capturer::{FrameCapturer, Snapshot};
pub use playback_controller::PlaybackController;
