//! Port for the PayPal orders API.

use async_trait::async_trait;

use crate::domain::Money;

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment gateway adapters.
    pub enum PaymentGatewayError {
        /// No credentials are configured.
        Disabled => "payments are not configured",
        /// The request never produced a response.
        Transport { message: String } => "payment provider unreachable: {message}",
        /// The provider answered with an error status.
        Rejected { status: u16, message: String } =>
            "payment provider rejected the request ({status}): {message}",
        /// The provider answered with a body we could not read.
        Decode { message: String } => "payment provider response invalid: {message}",
    }
}

/// Money a provider reports as captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAmount {
    pub amount: Money,
    /// ISO 4217 code as reported by the provider.
    pub currency: String,
}

/// Result of capturing an approved PayPal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// PayPal's order status after capture, `COMPLETED` on success.
    pub status: String,
    /// Sum of the completed captures, `None` when nothing was captured.
    pub captured: Option<CapturedAmount>,
}

impl CaptureOutcome {
    /// Whether money was actually taken.
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }

    /// Whether exactly `expected` in `currency` was captured.
    pub fn settles(&self, expected: Money, currency: &str) -> bool {
        self.captured.as_ref().is_some_and(|captured| {
            captured.amount == expected && captured.currency.eq_ignore_ascii_case(currency)
        })
    }
}

/// Port for creating and capturing provider-side orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a capture-intent order and return the provider's order id.
    async fn create_order(
        &self,
        amount: Money,
        currency: &str,
    ) -> Result<String, PaymentGatewayError>;

    /// Capture a previously approved order.
    async fn capture_order(
        &self,
        provider_order_id: &str,
    ) -> Result<CaptureOutcome, PaymentGatewayError>;
}
