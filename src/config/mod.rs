pub mod load;
pub mod preferences;
pub mod save;
pub mod types;

pub use preferences::{JsonFileStore, KeyValueStore, MemoryStore, THEME_KEY, load_theme, toggle_theme};
pub use types::{
    Config, DEFAULT_MAX_COLLECTION_SIZE, DEFAULT_MAX_FILE_SIZE, Language, MAX_RECENT_PATHS, Theme,
    UserSettings, VideoMimeTable,
};
