//! PayPal outbound adapters.
//!
//! [`PaypalHttpGateway`] implements the `PaymentGateway` port over the REST
//! API; [`DisabledPaymentGateway`] stands in when no credentials are set.

mod dto;
mod http_gateway;

pub use http_gateway::{DisabledPaymentGateway, PaypalCredentials, PaypalHttpGateway};
