//! Port for staff notifications.

/// Fire-and-forget delivery of an HTML-formatted text.
///
/// Implementations must return immediately and never surface failures to
/// the caller; they log them instead.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Queue `text` for delivery.
    fn notify(&self, text: String);
}

/// Notifier used when no bot is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _text: String) {
        tracing::debug!("notification dropped: no notifier configured");
    }
}
