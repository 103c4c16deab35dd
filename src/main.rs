use anyhow::Result;
use console::{Term, style};
use frame_extractor::config::save::{add_recent_path, save_settings};
use frame_extractor::config::{Config, JsonFileStore};
use frame_extractor::init;
use frame_extractor::menu::handlers::user_message;
use frame_extractor::menu::{Session, show_main_menu};
use frame_extractor::signal::setup_shutdown_signal;
use frame_extractor::tools::{FfmpegSource, read_video_file};
use log::{info, warn};
use rust_i18n::t;
use std::path::Path;

rust_i18n::i18n!("locales", fallback = "en-US");

const PREFERENCES_FILE: &str = "preferences.json";

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal();

    // Load config and set locale
    let config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    let preferences = JsonFileStore::open(Path::new(PREFERENCES_FILE))?;
    let mut session = Session::new(
        FfmpegSource::new(),
        config,
        shutdown_signal.clone(),
        Box::new(preferences),
    );

    // 可直接在命令列指定要載入的影片
    if let Some(path) = std::env::args().nth(1) {
        match read_video_file(Path::new(&path), &session.config().mime_table) {
            Ok(file) => match session.load(file) {
                Ok(_) => {
                    add_recent_path(&mut session.config_mut().settings, &path);
                    if let Err(e) = save_settings(&session.config().settings) {
                        warn!("無法儲存最近使用的路徑: {e:#}");
                    }
                }
                Err(e) => eprintln!("{} {}", style("✗").red().bold(), user_message(&e)),
            },
            Err(e) => eprintln!("{} {e:#}", style("✗").red().bold()),
        }
    }

    loop {
        shutdown_signal.reset();
        match show_main_menu(&term, &mut session) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style(t!("main_menu.error_prefix")).red().bold(), e);
                break;
            }
        }
    }

    session.controller_mut().release();
    Ok(())
}
