/// 依解析度推測幀率
///
/// 不讀取容器內的實際幀時間：1080p 視為 30，4K 視為 60，其餘使用預設值。
/// 推測可能是錯的，只用來把「前進一格」換算成時間差。
#[must_use]
pub fn estimate_frame_rate(width: u32, height: u32, default_rate: f64) -> f64 {
    match (width, height) {
        (1920, 1080) => 30.0,
        (3840, 2160) => 60.0,
        _ if default_rate.is_finite() && default_rate > 0.0 => default_rate,
        _ => 30.0,
    }
}
