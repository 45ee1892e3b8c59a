//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use bistro::domain::CheckoutSettings;
use bistro::inbound::http::session_config::SessionSettings;
use bistro::outbound::persistence::DbPool;
use bistro::settings::{AppSettings, PaypalSettings, SettingsError, TelegramSettings};

/// Everything `create_server` needs, resolved from settings at start-up.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) upload_dir: PathBuf,
    pub(crate) checkout: CheckoutSettings,
    pub(crate) paypal: Option<PaypalSettings>,
    pub(crate) telegram: Option<TelegramSettings>,
    pub(crate) chat_poll_interval: Duration,
}

impl ServerConfig {
    /// Resolve the server configuration from loaded settings.
    ///
    /// # Errors
    ///
    /// Propagates [`SettingsError`] for malformed addresses, pricing or
    /// PayPal URLs.
    pub fn from_settings(
        settings: &AppSettings,
        session: SessionSettings,
        db_pool: DbPool,
    ) -> Result<Self, SettingsError> {
        Ok(Self {
            session,
            bind_addr: settings.bind_addr()?,
            db_pool,
            upload_dir: settings.upload_dir(),
            checkout: settings.checkout()?,
            paypal: settings.paypal()?,
            telegram: settings.telegram(),
            chat_poll_interval: settings.chat_poll_interval(),
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
