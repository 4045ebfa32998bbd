//! Inline menus: generation and callback routing

pub mod callback_router;
pub mod menus;

pub use callback_router::{handle_menu_callback, Callback};
pub use menus::{parse_label, reply_menu, to_keyboard, to_reply_keyboard, MenuItem, MenuLabel};
