use super::archive::{ArchiveEntry, ArchiveWriter};
use super::metadata::{CollectionFrameInfo, CollectionInfo};
use crate::component::frame_capturer::Snapshot;
use crate::error::{ExtractorError, ExtractorResult};
use crate::tools::{ARCHIVE_ROOT_DIR, collection_frame_filename};
use chrono::Utc;
use log::{debug, info};
use std::collections::HashSet;
use uuid::Uuid;

/// 收藏清單中的一張畫面
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedFrame {
    /// 加入收藏時產生，清單生命週期內不重複
    pub id: String,
    pub added_at_epoch_millis: i64,
    pub snapshot: Snapshot,
}

/// 收藏清單
///
/// 依加入順序保存畫面，數量不超過上限。
pub struct CollectionStore {
    frames: Vec<CollectedFrame>,
    max_size: usize,
    issued_ids: HashSet<String>,
}

impl CollectionStore {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_size,
            issued_ids: HashSet::new(),
        }
    }

    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.max_size
    }

    #[must_use]
    pub fn frames(&self) -> &[CollectedFrame] {
        &self.frames
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CollectedFrame> {
        self.frames.iter().find(|frame| frame.id == id)
    }

    /// 加入一張畫面；已達上限時回傳 `CollectionFull`，清單不變
    pub fn add(&mut self, snapshot: Snapshot) -> ExtractorResult<&CollectedFrame> {
        if self.is_full() {
            return Err(ExtractorError::CollectionFull { max: self.max_size });
        }

        let added_at_epoch_millis = Utc::now().timestamp_millis();
        let id = self.issue_id(added_at_epoch_millis);
        debug!(
            "加入收藏 {id}: 第 {} 幀 ({:.2}s)",
            snapshot.frame_index, snapshot.timestamp_seconds
        );

        let index = self.frames.len();
        self.frames.push(CollectedFrame {
            id,
            added_at_epoch_millis,
            snapshot,
        });
        Ok(&self.frames[index])
    }

    /// 移除指定 id；不存在時不做任何事
    pub fn remove(&mut self, id: &str) -> Option<CollectedFrame> {
        let position = self.frames.iter().position(|frame| frame.id == id)?;
        Some(self.frames.remove(position))
    }

    /// 清空，回傳移除的數量
    pub fn clear(&mut self) -> usize {
        let removed = self.frames.len();
        self.frames.clear();
        removed
    }

    /// 將所有畫面打包成一個壓縮檔
    ///
    /// 檔名依目前順序編號，全部放在 `extracted-frames/` 底下。
    pub fn export_archive(&self, writer: &dyn ArchiveWriter) -> ExtractorResult<Vec<u8>> {
        if self.frames.is_empty() {
            return Err(ExtractorError::EmptyCollection);
        }

        let filenames = self.archive_filenames();
        let entries: Vec<ArchiveEntry<'_>> = filenames
            .iter()
            .zip(&self.frames)
            .map(|(filename, frame)| ArchiveEntry {
                filename,
                bytes: frame.snapshot.image_bytes(),
            })
            .collect();

        let bytes = writer
            .write_archive(ARCHIVE_ROOT_DIR, &entries)
            .map_err(|e| ExtractorError::ArchiveBuildFailure(format!("{e:#}")))?;

        info!("已打包 {} 張畫面", entries.len());
        Ok(bytes)
    }

    /// 目前收藏的摘要，檔名與壓縮檔內一致
    #[must_use]
    pub fn export_metadata(&self) -> CollectionInfo {
        let frames = self
            .archive_filenames()
            .into_iter()
            .zip(&self.frames)
            .enumerate()
            .map(|(i, (filename, frame))| CollectionFrameInfo {
                index: i + 1,
                timestamp: frame.snapshot.timestamp_seconds,
                frame_index: frame.snapshot.frame_index,
                resolution: frame.snapshot.resolution(),
                filename,
            })
            .collect();

        CollectionInfo {
            frame_count: self.frames.len(),
            frames,
        }
    }

    fn archive_filenames(&self) -> Vec<String> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                collection_frame_filename(
                    i + 1,
                    frame.snapshot.frame_index,
                    frame.snapshot.timestamp_seconds,
                )
            })
            .collect()
    }

    fn issue_id(&mut self, added_at_epoch_millis: i64) -> String {
        loop {
            let id = format!(
                "frame_{added_at_epoch_millis}_{}",
                Uuid::new_v4().simple()
            );
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
        }
    }
}
