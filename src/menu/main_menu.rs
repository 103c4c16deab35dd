use crate::config::save::save_settings;
use crate::config::{Language, Theme};
use crate::menu::action::Action;
use crate::menu::handlers::{print_status, run_action};
use crate::menu::session::Session;
use crate::pause;
use crate::tools::VideoSource;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme as DialogTheme};
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::path::PathBuf;

/// 依介面主題選擇選單樣式
pub(crate) fn dialog_theme(theme: Theme) -> Box<dyn DialogTheme> {
    match theme {
        Theme::Light => Box::new(ColorfulTheme::default()),
        Theme::Dark => Box::new(SimpleTheme),
    }
}

pub fn show_main_menu<S: VideoSource>(term: &Term, session: &mut Session<S>) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());
    println!();
    print_status(session);
    println!();

    let skip_seconds = session.config().settings.skip_seconds;
    let options: Vec<String> = Action::MENU
        .iter()
        .map(|a| a.menu_item(skip_seconds))
        .collect();

    let theme = dialog_theme(session.theme());
    let selection = Select::with_theme(&*theme)
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    // ESC pressed - exit
    let Some(selection) = selection else {
        return Ok(false);
    };

    let action = Action::MENU[selection];
    let keep_running = run_action(term, session, action)?;

    if keep_running
        && !matches!(
            action,
            Action::ViewCollection | Action::KeyboardMode | Action::Settings
        )
    {
        pause(term)?;
    }

    Ok(keep_running)
}

/// 設定選單
pub(crate) fn show_settings_menu<S: VideoSource>(
    term: &Term,
    session: &mut Session<S>,
) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_language"),
            t!("settings.opt_output_directory"),
            t!("settings.back"),
        ];

        let theme = dialog_theme(session.theme());
        let selection = Select::with_theme(&*theme)
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_language_menu(term, session)?,
            Some(1) => show_output_directory_menu(session)?,
            Some(2) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu<S: VideoSource>(term: &Term, session: &mut Session<S>) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::English, Language::TraditionalChinese];
    let items: Vec<String> = languages.iter().map(ToString::to_string).collect();

    let current = session.config().settings.language;
    let default_index = languages.iter().position(|&l| l == current).unwrap_or(0);

    let theme = dialog_theme(session.theme());
    let selection = Select::with_theme(&*theme)
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != current {
        let settings = &mut session.config_mut().settings;
        settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_lang
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 輸出資料夾設定
fn show_output_directory_menu<S: VideoSource>(session: &mut Session<S>) -> Result<()> {
    let current = session
        .config()
        .settings
        .output_directory
        .display()
        .to_string();

    let path: String = Input::new()
        .with_prompt(t!("settings.output_directory.prompt"))
        .default(current.clone())
        .interact_text()?;
    let path = path.trim().to_string();

    if !path.is_empty() && path != current {
        let settings = &mut session.config_mut().settings;
        settings.output_directory = PathBuf::from(&path);
        save_settings(settings)?;
        println!("\n{} {}", style(t!("settings.saved")).green(), path);
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}
