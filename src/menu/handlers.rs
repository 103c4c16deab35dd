use crate::config::save::{add_recent_path, save_settings};
use crate::error::ExtractorError;
use crate::menu::action::Action;
use crate::menu::main_menu::{dialog_theme, show_settings_menu};
use crate::menu::session::Session;
use crate::tools::{VideoSource, format_time, format_timestamp, read_video_file};
use anyhow::Result;
use console::{Key, Term, style};
use dialoguer::{Confirm, Input, Select};
use log::warn;
use rust_i18n::t;
use std::path::Path;

/// 執行一個操作，回傳 `false` 表示結束程式
pub fn run_action<S: VideoSource>(
    term: &Term,
    session: &mut Session<S>,
    action: Action,
) -> Result<bool> {
    match action {
        Action::LoadVideo => load_video(session)?,
        Action::TogglePlay => {
            if ensure_loaded(session) {
                session.controller_mut().toggle_play_pause();
                if session.controller().is_playing() {
                    print_success(&t!("player.playing"));
                } else {
                    print_success(&t!("player.paused"));
                }
            }
        }
        Action::PreviousFrame => step(session, |s| s.controller_mut().previous_frame()),
        Action::NextFrame => step(session, |s| s.controller_mut().next_frame()),
        Action::SkipBackward => step(session, |s| s.controller_mut().skip(false)),
        Action::SkipForward => step(session, |s| s.controller_mut().skip(true)),
        Action::SeekPercent => seek_percent(session)?,
        Action::ExtractFrame => extract_frame(session),
        Action::AddToCollection => add_to_collection(session),
        Action::ViewCollection => view_collection(term, session)?,
        Action::DownloadCollection => download_collection(session),
        Action::ExportMetadata => export_metadata(session),
        Action::KeyboardMode => keyboard_mode(term, session)?,
        Action::ToggleTheme => match session.toggle_theme() {
            Ok(theme) => print_success(&t!("theme.changed", theme = theme)),
            Err(e) => print_error(&format!("{e:#}")),
        },
        Action::Settings => show_settings_menu(term, session)?,
        Action::Exit => return Ok(false),
    }
    Ok(true)
}

/// 播放狀態摘要，內容來自播放控制器的通知
pub fn print_status<S: VideoSource>(session: &mut Session<S>) {
    let collected = session.collection().len();
    let status = session.refresh_status();

    let Some(info) = status.video.as_ref() else {
        println!("{}", style(t!("player.no_video")).dim());
        return;
    };

    let state = if status.is_playing() {
        t!("player.playing")
    } else {
        t!("player.paused")
    };

    println!(
        "{} {}  {} / {}  {}",
        style(t!("player.video")).dim(),
        style(&info.name).bold(),
        format_time(status.position_seconds),
        format_time(status.duration_seconds),
        style(state).yellow()
    );
    println!(
        "{} {} / {}  ({} fps, {}x{})  {} {}",
        style(t!("player.frame")).dim(),
        status.current_frame(),
        info.total_frames,
        info.frame_rate,
        info.width,
        info.height,
        style(t!("collection.count")).dim(),
        collected
    );
}

/// 將錯誤轉成給使用者看的訊息
pub fn user_message(err: &ExtractorError) -> String {
    match err {
        ExtractorError::InvalidFormat { .. } => t!("error.invalid_format").to_string(),
        ExtractorError::TooLarge { limit, .. } => {
            t!("error.too_large", max = limit / (1024 * 1024)).to_string()
        }
        ExtractorError::NotReady => t!("error.not_ready").to_string(),
        ExtractorError::CollectionFull { max } => {
            t!("error.collection_full", max = max).to_string()
        }
        ExtractorError::EmptyCollection => t!("error.empty_collection").to_string(),
        other => other.to_string(),
    }
}

fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ExtractorError>() {
        Some(e) => print_error(&user_message(e)),
        None => print_error(&format!("{err:#}")),
    }
}

fn ensure_loaded<S: VideoSource>(session: &Session<S>) -> bool {
    if session.controller().phase().is_ready() {
        return true;
    }
    print_error(&t!("player.no_video"));
    false
}

fn step<S, F>(session: &mut Session<S>, op: F)
where
    S: VideoSource,
    F: FnOnce(&mut Session<S>) -> crate::error::ExtractorResult<()>,
{
    if !ensure_loaded(session) {
        return;
    }
    let result = op(session).and_then(|()| session.controller_mut().settle());
    match result {
        Ok(()) => {
            let controller = session.controller();
            print_success(&t!(
                "player.position",
                time = format_timestamp(controller.position()),
                frame = controller.current_frame_number()
            ));
        }
        Err(e) => print_error(&user_message(&e)),
    }
}

fn load_video<S: VideoSource>(session: &mut Session<S>) -> Result<()> {
    let recent = session.config().settings.recent_paths.first().cloned();

    let mut input = Input::<String>::new().with_prompt(t!("load.prompt"));
    if let Some(recent) = recent {
        input = input.default(recent);
    }
    let path: String = input.interact_text()?;
    let path = path.trim().to_string();

    let file = match read_video_file(Path::new(&path), &session.config().mime_table) {
        Ok(file) => file,
        Err(e) => {
            print_error(&format!("{e:#}"));
            return Ok(());
        }
    };

    match session.load(file) {
        Ok(info) => {
            print_success(&t!(
                "load.loaded",
                name = info.name,
                duration = format_time(info.duration),
                width = info.width,
                height = info.height,
                fps = info.frame_rate
            ));

            add_recent_path(&mut session.config_mut().settings, &path);
            if let Err(e) = save_settings(&session.config().settings) {
                warn!("無法儲存最近使用的路徑: {e:#}");
            }
        }
        Err(e) => print_error(&user_message(&e)),
    }

    Ok(())
}

fn seek_percent<S: VideoSource>(session: &mut Session<S>) -> Result<()> {
    if !ensure_loaded(session) {
        return Ok(());
    }

    let percent: f64 = Input::new()
        .with_prompt(t!("player.seek_prompt"))
        .validate_with(|value: &f64| {
            if (0.0..=100.0).contains(value) {
                Ok(())
            } else {
                Err(t!("player.seek_invalid").to_string())
            }
        })
        .interact_text()?;

    step(session, |s| s.controller_mut().seek_to_percent(percent));
    Ok(())
}

fn extract_frame<S: VideoSource>(session: &mut Session<S>) {
    if !ensure_loaded(session) {
        return;
    }
    match session.extract_current_frame() {
        Ok(path) => print_success(&t!("extract.saved", path = path.display())),
        Err(e) => report(&e),
    }
}

fn add_to_collection<S: VideoSource>(session: &mut Session<S>) {
    if !ensure_loaded(session) {
        return;
    }
    match session.add_current_frame() {
        Ok(added) => {
            print_success(&t!(
                "collection.added",
                count = added.count,
                max = session.collection().max_size()
            ));
            if added.is_first {
                println!("{}", style(t!("collection.first_hint")).dim());
            }
        }
        Err(e) => print_error(&user_message(&e)),
    }
}

fn download_collection<S: VideoSource>(session: &Session<S>) {
    match session.download_collection(true) {
        Ok(path) => print_success(&t!("collection.downloaded", path = path.display())),
        Err(e) => report(&e),
    }
}

fn export_metadata<S: VideoSource>(session: &Session<S>) {
    match session.export_metadata() {
        Ok(path) => print_success(&t!("collection.metadata_saved", path = path.display())),
        Err(e) => report(&e),
    }
}

/// 收藏清單：逐項下載或移除，或清空全部
fn view_collection<S: VideoSource>(term: &Term, session: &mut Session<S>) -> Result<()> {
    loop {
        term.clear_screen()?;
        println!(
            "{}",
            style(t!(
                "collection.title",
                count = session.collection().len(),
                max = session.collection().max_size()
            ))
            .cyan()
            .bold()
        );
        println!("{}", style(t!("common.esc_hint")).dim());

        if session.collection().is_empty() {
            println!("\n{}", style(t!("collection.empty")).dim());
            return Ok(());
        }

        let mut items: Vec<String> = session
            .collection()
            .frames()
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                format!(
                    "#{:<3} {}  {} {}  {}",
                    i + 1,
                    format_timestamp(frame.snapshot.timestamp_seconds),
                    t!("player.frame"),
                    frame.snapshot.frame_index,
                    frame.snapshot.resolution()
                )
            })
            .collect();
        let clear_index = items.len();
        items.push(t!("collection.clear_all").to_string());
        items.push(t!("common.back").to_string());

        let theme = dialog_theme(session.theme());
        let selection = Select::with_theme(&*theme)
            .with_prompt(t!("collection.prompt"))
            .items(&items)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(i) if i < clear_index => {
                let id = session.collection().frames()[i].id.clone();
                collection_item_menu(term, session, &id)?;
            }
            Some(i) if i == clear_index => {
                let confirmed = Confirm::with_theme(&*theme)
                    .with_prompt(t!("collection.clear_confirm"))
                    .default(false)
                    .interact()?;
                if confirmed {
                    let removed = session.collection_mut().clear();
                    print_success(&t!("collection.cleared", count = removed));
                    return Ok(());
                }
            }
            _ => return Ok(()),
        }
    }
}

fn collection_item_menu<S: VideoSource>(
    term: &Term,
    session: &mut Session<S>,
    id: &str,
) -> Result<()> {
    let items = vec![
        t!("collection.item_download"),
        t!("collection.item_remove"),
        t!("common.back"),
    ];

    let theme = dialog_theme(session.theme());
    let selection = Select::with_theme(&*theme)
        .with_prompt(id)
        .items(&items)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => match session.download_item(id) {
            Ok(path) => print_success(&t!("extract.saved", path = path.display())),
            Err(e) => report(&e),
        },
        Some(1) => {
            if session.collection_mut().remove(id).is_some() {
                print_success(&t!("collection.removed"));
            }
        }
        _ => return Ok(()),
    }

    std::thread::sleep(std::time::Duration::from_millis(800));
    Ok(())
}

/// 以快捷鍵直接操作，Esc 或 q 離開
fn keyboard_mode<S: VideoSource>(term: &Term, session: &mut Session<S>) -> Result<()> {
    if !ensure_loaded(session) {
        return Ok(());
    }

    term.clear_screen()?;
    println!("{}", style(t!("keyboard.title")).cyan().bold());
    println!("{}", style(t!("keyboard.hint")).dim());
    let skip_seconds = session.config().settings.skip_seconds;
    for action in Action::MENU {
        if let Some(shortcut) = action.shortcut() {
            println!(
                "  {:<8} {}",
                style(shortcut).bold(),
                action.label(skip_seconds)
            );
        }
    }
    println!();
    print_status(session);

    loop {
        let key = term.read_key()?;
        if matches!(key, Key::Escape | Key::CtrlC | Key::Char('q' | 'Q')) {
            break;
        }

        let Some(action) = Action::from_key(&key) else {
            continue;
        };

        println!();
        run_action(term, session, action)?;
        print_status(session);
    }

    Ok(())
}
