//! Wire shapes for the PayPal OAuth and Orders v2 endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub(super) expires_in: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateOrderDto<'a> {
    pub(super) intent: &'static str,
    pub(super) purchase_units: [PurchaseUnitDto<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(super) struct PurchaseUnitDto<'a> {
    pub(super) amount: AmountDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct AmountDto<'a> {
    pub(super) currency_code: &'a str,
    pub(super) value: String,
}

impl<'a> CreateOrderDto<'a> {
    pub(super) fn capture(currency_code: &'a str, value: String) -> Self {
        Self {
            intent: "CAPTURE",
            purchase_units: [PurchaseUnitDto {
                amount: AmountDto {
                    currency_code,
                    value,
                },
            }],
        }
    }
}

/// Subset of the order resource returned by create and capture.
#[derive(Debug, Deserialize)]
pub(super) struct OrderResponseDto {
    pub(super) id: String,
    pub(super) status: String,
    /// Present on capture responses.
    #[serde(default)]
    pub(super) purchase_units: Vec<PurchaseUnitResponseDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PurchaseUnitResponseDto {
    #[serde(default)]
    pub(super) payments: Option<PaymentsDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PaymentsDto {
    #[serde(default)]
    pub(super) captures: Vec<CaptureDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CaptureDto {
    pub(super) status: String,
    pub(super) amount: AmountResponseDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct AmountResponseDto {
    pub(super) currency_code: String,
    pub(super) value: String,
}

impl OrderResponseDto {
    pub(super) fn completed_captures(&self) -> impl Iterator<Item = &AmountResponseDto> {
        self.purchase_units
            .iter()
            .filter_map(|unit| unit.payments.as_ref())
            .flat_map(|payments| payments.captures.iter())
            .filter(|capture| capture.status == "COMPLETED")
            .map(|capture| &capture.amount)
    }
}
