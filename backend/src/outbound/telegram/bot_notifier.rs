//! Telegram Bot API notifier.
//!
//! Each notification is sent from its own spawned task so request handlers
//! never wait on Telegram. Failures are logged with the originating trace id.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::domain::TraceId;
use crate::domain::ports::Notifier;

const DEFAULT_API_BASE: &str = "https://api.telegram.org/";

/// Bot token and destination chat.
pub struct TelegramTarget {
    pub bot_token: Zeroizing<String>,
    pub chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessageDto<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

struct Inner {
    client: Client,
    send_url: Url,
    chat_id: String,
}

/// [`Notifier`] that posts HTML messages to one Telegram chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    inner: Arc<Inner>,
}

impl TelegramNotifier {
    /// Notifier against the public Bot API.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// token does not form a valid URL.
    pub fn new(target: TelegramTarget, timeout: Duration) -> Result<Self, TelegramSetupError> {
        let base = Url::parse(DEFAULT_API_BASE).map_err(TelegramSetupError::Url)?;
        Self::with_base(base, target, timeout)
    }

    /// Notifier against a custom API base, such as a local stub.
    ///
    /// # Errors
    ///
    /// See [`TelegramNotifier::new`].
    pub fn with_base(
        base: Url,
        target: TelegramTarget,
        timeout: Duration,
    ) -> Result<Self, TelegramSetupError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TelegramSetupError::Client)?;
        let send_url = send_message_url(&base, &target.bot_token)?;
        Ok(Self {
            inner: Arc::new(Inner {
                client,
                send_url,
                chat_id: target.chat_id,
            }),
        })
    }
}

/// Reasons a notifier could not be built.
#[derive(Debug, thiserror::Error)]
pub enum TelegramSetupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid Telegram API URL: {0}")]
    Url(#[source] url::ParseError),
    #[error("Telegram API base cannot hold a path: {0}")]
    OpaqueBase(Url),
}

/// `{base}/bot{token}/sendMessage`. The token is pushed as a path segment
/// because `bot123:abc` would otherwise parse as a URL scheme.
fn send_message_url(base: &Url, token: &str) -> Result<Url, TelegramSetupError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| TelegramSetupError::OpaqueBase(base.clone()))?
        .pop_if_empty()
        .push(&format!("bot{token}"))
        .push("sendMessage");
    Ok(url)
}

impl Inner {
    async fn send(&self, text: &str) {
        let body = SendMessageDto {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };
        match self.client.post(self.send_url.clone()).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("telegram notification delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    status = response.status().as_u16(),
                    trace_id = ?TraceId::current().map(|id| id.to_string()),
                    "telegram rejected notification"
                );
            }
            Err(error) => {
                // The token is part of the URL; log without it.
                tracing::warn!(
                    error = %error.without_url(),
                    trace_id = ?TraceId::current().map(|id| id.to_string()),
                    "telegram notification failed"
                );
            }
        }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, text: String) {
        let inner = Arc::clone(&self.inner);
        let task = async move { inner.send(&text).await };
        match TraceId::current() {
            Some(trace_id) => {
                tokio::spawn(TraceId::scope(trace_id, task));
            }
            None => {
                tokio::spawn(task);
            }
        }
    }
}
