//! Reqwest-backed PayPal gateway.
//!
//! Owns transport details only: the OAuth client-credentials exchange, the
//! Orders v2 create/capture calls, HTTP error mapping and JSON decoding.
//! Access tokens are cached until shortly before they expire.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use zeroize::Zeroizing;

use super::dto::{CreateOrderDto, OrderResponseDto, TokenResponseDto};
use crate::domain::Money;
use crate::domain::ports::{CaptureOutcome, CapturedAmount, PaymentGateway, PaymentGatewayError};

/// Tokens are refreshed this long before PayPal says they expire.
const TOKEN_EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// Credentials for one PayPal REST app.
pub struct PaypalCredentials {
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
}

struct CachedToken {
    value: Zeroizing<String>,
    refresh_at: Instant,
}

/// [`PaymentGateway`] speaking to the PayPal REST API.
pub struct PaypalHttpGateway {
    client: Client,
    base_url: Url,
    credentials: PaypalCredentials,
    token: Mutex<Option<CachedToken>>,
}

impl PaypalHttpGateway {
    /// Build a gateway against `base_url` (sandbox or live).
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        credentials: PaypalCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            credentials,
            token: Mutex::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentGatewayError> {
        self.base_url
            .join(path)
            .map_err(|err| PaymentGatewayError::transport(format!("invalid PayPal URL: {err}")))
    }

    /// `v2/checkout/orders/{id}/capture` with `id` pushed as one escaped
    /// segment, so it can never climb out of the orders collection.
    fn capture_endpoint(&self, provider_order_id: &str) -> Result<Url, PaymentGatewayError> {
        let mut url = self.endpoint("v2/checkout/orders/")?;
        url.path_segments_mut()
            .map_err(|()| PaymentGatewayError::transport("PayPal base URL cannot hold a path"))?
            .pop_if_empty()
            .push(provider_order_id)
            .push("capture");
        Ok(url)
    }

    async fn access_token(&self) -> Result<Zeroizing<String>, PaymentGatewayError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|token| Instant::now() < token.refresh_at) {
            return Ok(token.value.clone());
        }
        let response = self
            .client
            .post(self.endpoint("v1/oauth2/token")?)
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.as_str()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(map_transport_error)?;
        let decoded: TokenResponseDto = decode(response).await?;
        let lifetime = Duration::from_secs(decoded.expires_in).saturating_sub(TOKEN_EXPIRY_SLACK);
        let value = Zeroizing::new(decoded.access_token);
        *cached = Some(CachedToken {
            value: value.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(value)
    }
}

#[async_trait]
impl PaymentGateway for PaypalHttpGateway {
    async fn create_order(
        &self,
        amount: Money,
        currency: &str,
    ) -> Result<String, PaymentGatewayError> {
        let token = self.access_token().await?;
        let body = CreateOrderDto::capture(currency, amount.to_decimal_string());
        let response = self
            .client
            .post(self.endpoint("v2/checkout/orders")?)
            .bearer_auth(token.as_str())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;
        let order: OrderResponseDto = decode(response).await?;
        tracing::info!(paypal_order_id = %order.id, status = %order.status, "PayPal order created");
        Ok(order.id)
    }

    async fn capture_order(
        &self,
        provider_order_id: &str,
    ) -> Result<CaptureOutcome, PaymentGatewayError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(self.capture_endpoint(provider_order_id)?)
            .bearer_auth(token.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{}")
            .send()
            .await
            .map_err(map_transport_error)?;
        let order: OrderResponseDto = decode(response).await?;
        tracing::info!(paypal_order_id = %order.id, status = %order.status, "PayPal order captured");
        let captured = captured_amount(&order)?;
        Ok(CaptureOutcome {
            status: order.status,
            captured,
        })
    }
}

/// Total of the completed captures. Mixed currencies or unreadable values
/// are decode errors.
fn captured_amount(order: &OrderResponseDto) -> Result<Option<CapturedAmount>, PaymentGatewayError> {
    let mut total: Option<CapturedAmount> = None;
    for amount in order.completed_captures() {
        let value = Money::from_decimal_str(&amount.value).ok_or_else(|| {
            PaymentGatewayError::decode(format!("invalid capture amount: {}", amount.value))
        })?;
        total = Some(match total {
            None => CapturedAmount {
                amount: value,
                currency: amount.currency_code.clone(),
            },
            Some(sum) if sum.currency.eq_ignore_ascii_case(&amount.currency_code) => {
                CapturedAmount {
                    amount: sum.amount.checked_add(value).ok_or_else(|| {
                        PaymentGatewayError::decode("capture total overflows")
                    })?,
                    currency: sum.currency,
                }
            }
            Some(sum) => {
                return Err(PaymentGatewayError::decode(format!(
                    "captures mix {} and {}",
                    sum.currency, amount.currency_code
                )));
            }
        });
    }
    Ok(total)
}

/// Gateway used when no PayPal credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledPaymentGateway;

#[async_trait]
impl PaymentGateway for DisabledPaymentGateway {
    async fn create_order(
        &self,
        _amount: Money,
        _currency: &str,
    ) -> Result<String, PaymentGatewayError> {
        Err(PaymentGatewayError::Disabled)
    }

    async fn capture_order(
        &self,
        _provider_order_id: &str,
    ) -> Result<CaptureOutcome, PaymentGatewayError> {
        Err(PaymentGatewayError::Disabled)
    }
}

/// `Url::join` replaces the last segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PaymentGatewayError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    parse_body(body.as_ref())
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, PaymentGatewayError> {
    serde_json::from_slice(body)
        .map_err(|err| PaymentGatewayError::decode(format!("invalid PayPal JSON payload: {err}")))
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    PaymentGatewayError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    PaymentGatewayError::rejected(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
