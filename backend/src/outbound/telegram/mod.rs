//! Telegram outbound adapter implementing the `Notifier` port.

mod bot_notifier;

pub use bot_notifier::{TelegramNotifier, TelegramSetupError, TelegramTarget};
