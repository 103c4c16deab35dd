//! 有上限的輪詢等待
//!
//! 等待中繼資料或跳轉完成時使用，逾時或取消都會結束等待。

use crate::error::{ExtractorError, ExtractorResult};
use crate::signal::CancelToken;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitPolicy {
    #[must_use]
    pub const fn from_millis(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            poll_interval: Duration::from_millis(poll_interval_ms),
        }
    }
}

/// 重複呼叫 `ready` 直到回傳 `true`
///
/// 每次輪詢之間讓出 `poll_interval`；`ready` 回傳錯誤時立即結束。
pub fn wait_until<F>(
    policy: WaitPolicy,
    cancel: &CancelToken,
    waiting_for: &'static str,
    mut ready: F,
) -> ExtractorResult<()>
where
    F: FnMut() -> ExtractorResult<bool>,
{
    let started = Instant::now();

    loop {
        if cancel.is_cancelled() {
            return Err(ExtractorError::Cancelled);
        }
        if ready()? {
            return Ok(());
        }
        if started.elapsed() >= policy.timeout {
            return Err(ExtractorError::Timeout {
                waiting_for,
                millis: u64::try_from(policy.timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
        thread::sleep(policy.poll_interval);
    }
}
