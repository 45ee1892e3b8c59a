//! Application settings loaded via OrthoConfig.
//!
//! Every field reads from a `BISTRO_`-prefixed environment variable (or the
//! matching command-line flag). Optional integrations switch themselves off
//! when their credentials are absent.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use mockable::Env;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{CheckoutSettings, Money};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_PAYPAL_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
const FALLBACK_DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Invalid or incomplete settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("BISTRO_DATABASE_URL (or DATABASE_URL) must be set")]
    MissingDatabaseUrl,
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// PayPal REST credentials.
pub struct PaypalSettings {
    pub base_url: Url,
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
}

/// Telegram bot destination.
pub struct TelegramSettings {
    pub bot_token: Zeroizing<String>,
    pub chat_id: String,
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BISTRO")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Listen address, `0.0.0.0:8080` by default.
    pub bind_addr: Option<String>,
    /// Directory holding uploaded images.
    pub upload_dir: Option<PathBuf>,
    /// Flat delivery fee added to every order.
    #[ortho_config(default = 0)]
    pub delivery_fee_cents: i64,
    /// Minutes added to the slowest item's preparation time.
    #[ortho_config(default = 15)]
    pub delivery_minutes: u32,
    /// ISO 4217 currency code for PayPal orders.
    pub currency: Option<String>,
    pub paypal_client_id: Option<String>,
    pub paypal_client_secret: Option<String>,
    /// Sandbox unless overridden.
    pub paypal_base_url: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    /// Chat event stream poll interval in milliseconds.
    #[ortho_config(default = 2000)]
    pub chat_poll_ms: u64,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    pub db_checkout_timeout_ms: Option<u64>,
}

fn invalid(name: &'static str, reason: impl ToString) -> SettingsError {
    SettingsError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

impl AppSettings {
    /// Database URL, falling back to the conventional `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// [`SettingsError::MissingDatabaseUrl`] when neither is set.
    pub fn database_url(&self, env: &impl Env) -> Result<String, SettingsError> {
        non_blank(self.database_url.as_ref())
            .map(str::to_owned)
            .or_else(|| {
                env.string(FALLBACK_DATABASE_URL_ENV)
                    .filter(|url| !url.trim().is_empty())
            })
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// When the configured address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        non_blank(self.bind_addr.as_ref())
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| invalid("BISTRO_BIND_ADDR", err))
    }

    /// Pool sizing for the resolved database URL.
    pub fn pool_config(&self, database_url: String) -> PoolConfig {
        let config = PoolConfig::new(database_url);
        let config = match self.db_max_connections {
            Some(max) => config.with_max_connections(max),
            None => config,
        };
        match self.db_checkout_timeout_ms {
            Some(ms) => config.with_checkout_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// Pricing knobs for checkout.
    ///
    /// # Errors
    ///
    /// When the delivery fee is negative or the currency is not three letters.
    pub fn checkout(&self) -> Result<CheckoutSettings, SettingsError> {
        let delivery_fee = Money::from_cents(self.delivery_fee_cents)
            .map_err(|err| invalid("BISTRO_DELIVERY_FEE_CENTS", err))?;
        let currency = non_blank(self.currency.as_ref())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid("BISTRO_CURRENCY", "expected a three-letter code"));
        }
        Ok(CheckoutSettings {
            delivery_fee,
            delivery_minutes: self.delivery_minutes,
            currency,
        })
    }

    /// PayPal credentials, or `None` when either half is missing.
    ///
    /// # Errors
    ///
    /// When the base URL does not parse.
    pub fn paypal(&self) -> Result<Option<PaypalSettings>, SettingsError> {
        let (Some(client_id), Some(secret)) = (
            non_blank(self.paypal_client_id.as_ref()),
            non_blank(self.paypal_client_secret.as_ref()),
        ) else {
            return Ok(None);
        };
        let base_url = Url::parse(
            non_blank(self.paypal_base_url.as_ref()).unwrap_or(DEFAULT_PAYPAL_BASE_URL),
        )
        .map_err(|err| invalid("BISTRO_PAYPAL_BASE_URL", err))?;
        Ok(Some(PaypalSettings {
            base_url,
            client_id: client_id.to_owned(),
            client_secret: Zeroizing::new(secret.to_owned()),
        }))
    }

    /// Telegram target, or `None` when either half is missing.
    pub fn telegram(&self) -> Option<TelegramSettings> {
        let bot_token = non_blank(self.telegram_bot_token.as_ref())?;
        let chat_id = non_blank(self.telegram_chat_id.as_ref())?;
        Some(TelegramSettings {
            bot_token: Zeroizing::new(bot_token.to_owned()),
            chat_id: chat_id.to_owned(),
        })
    }

    pub fn chat_poll_interval(&self) -> Duration {
        Duration::from_millis(self.chat_poll_ms.max(1))
    }
}
