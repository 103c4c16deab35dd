//! 收藏清單元件
//!
//! 保存擷取的畫面，並可打包成壓縮檔或輸出 JSON 摘要。

mod archive;
mod main;
mod metadata;

pub use archive::{ArchiveEntry, ArchiveWriter, ZipArchiveWriter};
pub use main::{CollectedFrame, CollectionStore};
pub use metadata::{CollectionFrameInfo, CollectionInfo};
