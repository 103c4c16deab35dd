use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 可在執行緒間共享的取消旗標
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// 清除旗標，讓下一個等待可以繼續
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// 安裝 Ctrl-C 處理器，收到中斷時設定取消旗標
#[must_use]
pub fn setup_shutdown_signal() -> CancelToken {
    let token = CancelToken::new();
    let handler_token = token.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        handler_token.cancel();
        eprintln!("\n收到中斷信號，正在取消目前的等待...");
    }) {
        warn!("無法設定 Ctrl-C 處理器: {e}");
    }

    token
}
