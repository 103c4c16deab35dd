pub mod action;
pub mod handlers;
pub mod main_menu;
pub mod session;

pub use action::Action;
pub use main_menu::show_main_menu;
pub use session::{AddedFrame, Session};
