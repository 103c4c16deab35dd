/// 播放頭顯示用：`m:ss`
#[must_use]
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{mins}:{secs:02}")
}

/// 畫面時間戳記顯示用：`m:ss.ss`
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0).floor() as u64;
    let secs = seconds % 60.0;
    format!("{mins}:{secs:05.2}")
}
