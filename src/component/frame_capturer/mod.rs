//! 畫面擷取元件
//!
//! 把來源目前的畫面轉成 PNG 靜態圖，並支援依序擷取多個時間點。

mod batch;
mod main;
mod snapshot;

pub use main::FrameCapturer;
pub use snapshot::Snapshot;
