use console::Key;
use rust_i18n::t;

/// 使用者可執行的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadVideo,
    TogglePlay,
    PreviousFrame,
    NextFrame,
    SkipBackward,
    SkipForward,
    SeekPercent,
    ExtractFrame,
    AddToCollection,
    ViewCollection,
    DownloadCollection,
    ExportMetadata,
    KeyboardMode,
    ToggleTheme,
    Settings,
    Exit,
}

impl Action {
    /// 主選單的顯示順序
    pub const MENU: [Self; 16] = [
        Self::LoadVideo,
        Self::TogglePlay,
        Self::PreviousFrame,
        Self::NextFrame,
        Self::SkipBackward,
        Self::SkipForward,
        Self::SeekPercent,
        Self::ExtractFrame,
        Self::AddToCollection,
        Self::ViewCollection,
        Self::DownloadCollection,
        Self::ExportMetadata,
        Self::KeyboardMode,
        Self::ToggleTheme,
        Self::Settings,
        Self::Exit,
    ];

    /// 鍵盤快捷鍵對應
    ///
    /// Shift+方向鍵在終端機中是 `ESC [1;2D` / `ESC [1;2C` 序列，console 會回傳成未知序列。
    #[must_use]
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Char(' ') => Some(Self::TogglePlay),
            Key::ArrowLeft => Some(Self::PreviousFrame),
            Key::ArrowRight => Some(Self::NextFrame),
            Key::UnknownEscSeq(seq) if seq.ends_with(&[';', '2', 'D']) => Some(Self::SkipBackward),
            Key::UnknownEscSeq(seq) if seq.ends_with(&[';', '2', 'C']) => Some(Self::SkipForward),
            Key::Char('e' | 'E') => Some(Self::ExtractFrame),
            Key::Char('a' | 'A') => Some(Self::AddToCollection),
            Key::Char('c' | 'C') => Some(Self::ViewCollection),
            // Ctrl+D
            Key::Char('\u{4}') => Some(Self::DownloadCollection),
            _ => None,
        }
    }

    #[must_use]
    pub const fn shortcut(self) -> Option<&'static str> {
        match self {
            Self::TogglePlay => Some("Space"),
            Self::PreviousFrame => Some("←"),
            Self::NextFrame => Some("→"),
            Self::SkipBackward => Some("Shift+←"),
            Self::SkipForward => Some("Shift+→"),
            Self::ExtractFrame => Some("E"),
            Self::AddToCollection => Some("A"),
            Self::ViewCollection => Some("C"),
            Self::DownloadCollection => Some("Ctrl+D"),
            _ => None,
        }
    }

    /// 顯示名稱，跳轉項目帶入設定的秒數
    #[must_use]
    pub fn label(self, skip_seconds: f64) -> String {
        let label = match self {
            Self::LoadVideo => t!("action.load_video"),
            Self::TogglePlay => t!("action.toggle_play"),
            Self::PreviousFrame => t!("action.previous_frame"),
            Self::NextFrame => t!("action.next_frame"),
            Self::SkipBackward => t!("action.skip_backward", seconds = skip_seconds),
            Self::SkipForward => t!("action.skip_forward", seconds = skip_seconds),
            Self::SeekPercent => t!("action.seek_percent"),
            Self::ExtractFrame => t!("action.extract_frame"),
            Self::AddToCollection => t!("action.add_to_collection"),
            Self::ViewCollection => t!("action.view_collection"),
            Self::DownloadCollection => t!("action.download_collection"),
            Self::ExportMetadata => t!("action.export_metadata"),
            Self::KeyboardMode => t!("action.keyboard_mode"),
            Self::ToggleTheme => t!("action.toggle_theme"),
            Self::Settings => t!("action.settings"),
            Self::Exit => t!("action.exit"),
        };
        label.into_owned()
    }

    /// 選單項目文字，附上快捷鍵
    #[must_use]
    pub fn menu_item(self, skip_seconds: f64) -> String {
        let label = self.label(skip_seconds);
        match self.shortcut() {
            Some(shortcut) => format!("{label} [{shortcut}]"),
            None => label,
        }
    }
}
