use crate::component::collection_store::{CollectionStore, ZipArchiveWriter};
use crate::component::frame_capturer::{FrameCapturer, Snapshot};
use crate::component::playback_controller::{
    PlaybackController, PlaybackEvent, PlaybackStatus, VideoInfo,
};
use crate::config::{Config, KeyValueStore, Theme, load_theme, toggle_theme};
use crate::error::ExtractorResult;
use crate::signal::CancelToken;
use crate::tools::{
    METADATA_FILENAME, VideoFile, VideoSource, archive_filename, ensure_directory_exists,
};
use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

/// 加入收藏的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedFrame {
    pub id: String,
    pub count: usize,
    /// 收藏原本是空的，可提示使用者切換到收藏清單
    pub is_first: bool,
}

/// 一次互動期間的所有狀態
///
/// 把播放控制器、擷取器與收藏清單接在一起，選單只負責提示與顯示。
pub struct Session<S: VideoSource> {
    config: Config,
    controller: PlaybackController<S>,
    capturer: FrameCapturer,
    collection: CollectionStore,
    preferences: Box<dyn KeyValueStore>,
    theme: Theme,
    /// 播放控制器的通知，畫面狀態只從這裡更新
    events: Receiver<PlaybackEvent>,
    status: PlaybackStatus,
}

impl<S: VideoSource> Session<S> {
    pub fn new(
        source: S,
        config: Config,
        cancel: CancelToken,
        preferences: Box<dyn KeyValueStore>,
    ) -> Self {
        let mut controller = PlaybackController::new(source, &config, cancel.clone());
        let events = controller.subscribe();
        let capturer = FrameCapturer::new(controller.options().seek_wait, cancel);
        let collection = CollectionStore::new(config.settings.max_collection_size);
        let theme = load_theme(&*preferences);

        Self {
            config,
            controller,
            capturer,
            collection,
            preferences,
            theme,
            events,
            status: PlaybackStatus::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    #[must_use]
    pub const fn controller(&self) -> &PlaybackController<S> {
        &self.controller
    }

    pub const fn controller_mut(&mut self) -> &mut PlaybackController<S> {
        &mut self.controller
    }

    #[must_use]
    pub const fn collection(&self) -> &CollectionStore {
        &self.collection
    }

    pub const fn collection_mut(&mut self) -> &mut CollectionStore {
        &mut self.collection
    }

    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// 同步來源後套用所有待處理的通知
    pub fn refresh_status(&mut self) -> &PlaybackStatus {
        self.controller.sync();
        for event in self.events.try_iter() {
            self.status.apply(&event);
        }
        &self.status
    }

    pub fn load(&mut self, file: VideoFile) -> ExtractorResult<VideoInfo> {
        self.controller.load_source(file)
    }

    /// 擷取目前畫面
    pub fn capture_current(&mut self) -> ExtractorResult<Snapshot> {
        self.controller.sync();
        let frame_rate = self.controller.frame_rate();
        self.capturer
            .capture_snapshot_as_buffer(self.controller.source_mut(), frame_rate)
    }

    /// 擷取目前畫面並存到輸出資料夾
    pub fn extract_current_frame(&mut self) -> Result<PathBuf> {
        let snapshot = self.capture_current()?;
        self.write_output(&snapshot.filename(), snapshot.image_bytes())
    }

    /// 擷取目前畫面並加入收藏
    pub fn add_current_frame(&mut self) -> ExtractorResult<AddedFrame> {
        let snapshot = self.capture_current()?;
        let is_first = self.collection.is_empty();
        let id = self.collection.add(snapshot)?.id.clone();
        Ok(AddedFrame {
            id,
            count: self.collection.len(),
            is_first,
        })
    }

    /// 下載收藏中的單張畫面
    pub fn download_item(&self, id: &str) -> Result<PathBuf> {
        let frame = self
            .collection
            .get(id)
            .with_context(|| format!("找不到收藏項目: {id}"))?;
        self.write_output(&frame.snapshot.filename(), frame.snapshot.image_bytes())
    }

    /// 打包所有收藏畫面並寫入 `frames_<日期>.zip`
    pub fn download_collection(&self, show_progress: bool) -> Result<PathBuf> {
        let writer = if show_progress {
            ZipArchiveWriter::new().with_progress()
        } else {
            ZipArchiveWriter::new()
        };
        let bytes = self.collection.export_archive(&writer)?;
        self.write_output(&archive_filename(Utc::now()), &bytes)
    }

    /// 輸出收藏摘要 JSON
    pub fn export_metadata(&self) -> Result<PathBuf> {
        let json = self
            .collection
            .export_metadata()
            .to_json_pretty()
            .context("無法序列化收藏摘要")?;
        self.write_output(METADATA_FILENAME, json.as_bytes())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.theme = toggle_theme(&mut *self.preferences, self.theme)?;
        Ok(self.theme)
    }

    fn write_output(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let directory: &Path = &self.config.settings.output_directory;
        ensure_directory_exists(directory)?;

        let path = directory.join(filename);
        fs::write(&path, bytes).with_context(|| format!("無法寫入檔案: {}", path.display()))?;
        info!("已輸出 {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
