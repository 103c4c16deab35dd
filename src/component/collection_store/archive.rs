use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 壓縮檔中的一個檔案
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

/// 壓縮能力：接收具名的位元組，回傳單一壓縮檔
pub trait ArchiveWriter {
    /// 所有檔案放在 `root_dir` 資料夾底下
    fn write_archive(&self, root_dir: &str, entries: &[ArchiveEntry<'_>]) -> Result<Vec<u8>>;
}

/// 以 ZIP（Deflate 等級 6）寫入記憶體
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter {
    show_progress: bool,
}

impl ZipArchiveWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            show_progress: false,
        }
    }

    /// 在終端機顯示逐檔進度
    #[must_use]
    pub const fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }

        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        progress_bar.set_message("建立壓縮檔中...");
        Ok(progress_bar)
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn write_archive(&self, root_dir: &str, entries: &[ArchiveEntry<'_>]) -> Result<Vec<u8>> {
        let progress_bar = self.progress_bar(entries.len())?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6));

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .add_directory(format!("{root_dir}/"), options)
            .with_context(|| format!("無法建立壓縮檔資料夾: {root_dir}"))?;

        for entry in entries {
            writer
                .start_file(format!("{root_dir}/{}", entry.filename), options)
                .with_context(|| format!("無法加入檔案: {}", entry.filename))?;
            writer
                .write_all(entry.bytes)
                .with_context(|| format!("無法寫入檔案: {}", entry.filename))?;
            progress_bar.inc(1);
        }

        let cursor = writer.finish().context("無法完成壓縮檔")?;
        progress_bar.finish_with_message("完成");

        let bytes = cursor.into_inner();
        debug!("壓縮檔大小: {} bytes, {} 個檔案", bytes.len(), entries.len());
        Ok(bytes)
    }
}
