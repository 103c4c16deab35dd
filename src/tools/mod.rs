mod ffmpeg_source;
mod ffprobe_info;
mod file_validator;
mod filename;
mod scripted_source;
mod time_format;
mod video_source;
mod wait;

pub use ffmpeg_source::FfmpegSource;
pub use ffprobe_info::{ProbeInfo, probe_video};
pub use file_validator::{ensure_directory_exists, read_video_file, validate_video_file};
pub use filename::{
    ARCHIVE_ROOT_DIR, METADATA_FILENAME, archive_filename, collection_frame_filename,
    dashed_timestamp, single_frame_filename,
};
pub use scripted_source::ScriptedSource;
pub use time_format::{format_time, format_timestamp};
pub use video_source::{ReadyState, SourceEvent, SourceMetadata, VideoFile, VideoSource};
pub use wait::{WaitPolicy, wait_until};
