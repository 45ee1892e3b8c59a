//! Checkout endpoints.
//!
//! ```text
//! POST /api/v1/orders                                   pay on delivery
//! POST /api/v1/checkout/paypal                          open a PayPal order
//! POST /api/v1/checkout/paypal/{paypalOrderId}/capture  capture and place
//! ```
//!
//! Every body carries the same delivery form so the order can be placed
//! from the capture call without server-side checkout state.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::order::CheckoutValidationError;
use crate::domain::ports::CheckoutRequest;
use crate::domain::{DeliveryDetails, Error, PaymentMethod};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::orders::OrderResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;

/// Delivery and payment form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[schema(example = "1 Main Street")]
    pub delivery_address: String,
    #[schema(example = "+44 20 7946 0000")]
    pub phone: String,
    pub notes: Option<String>,
    #[schema(example = "card")]
    pub payment_method: String,
}

impl TryFrom<CheckoutBody> for CheckoutRequest {
    type Error = CheckoutValidationError;

    fn try_from(body: CheckoutBody) -> Result<Self, Self::Error> {
        let delivery =
            DeliveryDetails::new(&body.delivery_address, &body.phone, body.notes.as_deref())?;
        let payment_method: PaymentMethod = body.payment_method.trim().parse()?;
        Ok(Self {
            delivery,
            payment_method,
        })
    }
}

fn checkout_request(body: CheckoutBody) -> Result<CheckoutRequest, Error> {
    CheckoutRequest::try_from(body).map_err(|err| field_error(err.field(), &err))
}

/// Id of the PayPal order the client should approve.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaypalOrderResponse {
    #[schema(example = "5O190127TN364715T")]
    pub paypal_order_id: String,
}

/// Place a pay-on-delivery order from the cart.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CheckoutBody,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid form, empty cart or PayPal method", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["checkout"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CheckoutBody>,
) -> ApiResult<HttpResponse> {
    let user = require_user(&state, &session).await?;
    let request = checkout_request(payload.into_inner())?;
    let order = state.checkout.place_order(user.id(), request).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// Open a PayPal order for the cart total.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/paypal",
    request_body = CheckoutBody,
    responses(
        (status = 200, description = "PayPal order opened", body = PaypalOrderResponse),
        (status = 400, description = "Invalid form or empty cart", body = ErrorSchema),
        (status = 503, description = "PayPal unavailable", body = ErrorSchema)
    ),
    tags = ["checkout"],
    operation_id = "startPaypalCheckout"
)]
#[post("/checkout/paypal")]
pub async fn start_paypal(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CheckoutBody>,
) -> ApiResult<web::Json<PaypalOrderResponse>> {
    let user = require_user(&state, &session).await?;
    let request = checkout_request(payload.into_inner())?;
    let paypal_order_id = state.checkout.start_paypal(user.id(), request).await?;
    Ok(web::Json(PaypalOrderResponse { paypal_order_id }))
}

/// Capture an approved PayPal order and place the order.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/paypal/{paypalOrderId}/capture",
    params(("paypalOrderId" = String, Path, description = "PayPal order id")),
    request_body = CheckoutBody,
    responses(
        (status = 201, description = "Paid order placed", body = OrderResponse),
        (status = 400, description = "Malformed id, payment not completed or amount mismatch", body = ErrorSchema),
        (status = 503, description = "PayPal unavailable", body = ErrorSchema)
    ),
    tags = ["checkout"],
    operation_id = "capturePaypalCheckout"
)]
#[post("/checkout/paypal/{paypal_order_id}/capture")]
pub async fn capture_paypal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CheckoutBody>,
) -> ApiResult<HttpResponse> {
    let user = require_user(&state, &session).await?;
    let paypal_order_id = paypal_order_id(path.into_inner())?;
    let request = checkout_request(payload.into_inner())?;
    let order = state
        .checkout
        .capture_paypal(user.id(), &paypal_order_id, request)
        .await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

const PAYPAL_ORDER_ID_MAX: usize = 64;

/// PayPal order ids are short runs of uppercase letters and digits.
fn paypal_order_id(raw: String) -> Result<String, Error> {
    let well_formed = (1..=PAYPAL_ORDER_ID_MAX).contains(&raw.len())
        && raw
            .bytes()
            .all(|byte| byte.is_ascii_uppercase() || byte.is_ascii_digit());
    if well_formed {
        Ok(raw)
    } else {
        Err(field_error("paypalOrderId", "must be 1-64 uppercase letters or digits"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderStage, OrderStatus, PaymentStatus, Role};
    use crate::inbound::http::test_utils::{call_json, signed_in};
    use crate::test_support::order;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(place_order)
            .service(start_paypal)
            .service(capture_paypal);
    }

    fn form(method: &str) -> Value {
        json!({
            "deliveryAddress": "1 Main Street",
            "phone": "+44 20 7946 0000",
            "notes": "ring twice",
            "paymentMethod": method
        })
    }

    #[rstest]
    #[case(json!({"deliveryAddress": "  "}), "deliveryAddress")]
    #[case(json!({"phone": "call me"}), "phone")]
    #[case(json!({"paymentMethod": "cash"}), "paymentMethod")]
    #[actix_web::test]
    async fn invalid_forms_name_the_field(#[case] overrides: Value, #[case] field: &str) {
        let (ports, customer) = signed_in(Role::Customer);
        let mut body = form("card");
        for (key, value) in overrides.as_object().expect("object") {
            body[key] = value.clone();
        }
        let (status, payload) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::post().uri("/api/v1/orders").set_json(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["details"]["field"], field);
    }

    #[actix_web::test]
    async fn card_orders_are_created_pending() {
        let (mut ports, customer) = signed_in(Role::Customer);
        let owner = *customer.id();
        ports
            .checkout
            .expect_place_order()
            .withf(|_, request| {
                request.payment_method == PaymentMethod::Card
                    && request.delivery.notes.as_deref() == Some("ring twice")
            })
            .returning(move |_, _| Ok(order(owner, OrderStatus::Pending, OrderStage::Received)));
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::post()
                .uri("/api/v1/orders")
                .set_json(form("card")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "PENDING");
        assert_eq!(body["stage"], "RECEIVED");
    }

    #[actix_web::test]
    async fn paypal_start_returns_the_order_id() {
        let (mut ports, customer) = signed_in(Role::Customer);
        ports
            .checkout
            .expect_start_paypal()
            .returning(|_, _| Ok(String::from("5O190127TN364715T")));
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::post()
                .uri("/api/v1/checkout/paypal")
                .set_json(form("paypal")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["paypalOrderId"], "5O190127TN364715T");
    }

    #[actix_web::test]
    async fn captured_paypal_orders_are_paid() {
        let (mut ports, customer) = signed_in(Role::Customer);
        let owner = *customer.id();
        ports
            .checkout
            .expect_capture_paypal()
            .withf(|_, id, _| id == "5O190127TN364715T")
            .returning(move |_, id, _| {
                let mut placed = order(owner, OrderStatus::Confirmed, OrderStage::Received);
                placed.payment_status = PaymentStatus::Paid;
                placed.paypal_order_id = Some(id.to_owned());
                Ok(placed)
            });
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::post()
                .uri("/api/v1/checkout/paypal/5O190127TN364715T/capture")
                .set_json(form("paypal")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["paymentStatus"], "paid");
        assert_eq!(body["paypalOrderId"], "5O190127TN364715T");
    }

    #[rstest]
    #[case("..%2F..%2Fv1%2Foauth2%2Ftoken")]
    #[case("abc-def")]
    #[case("5O190127TN364715T5O190127TN364715T5O190127TN364715T5O190127TN3647")]
    #[actix_web::test]
    async fn malformed_paypal_order_ids_never_reach_checkout(#[case] id: &str) {
        let (mut ports, customer) = signed_in(Role::Customer);
        ports.checkout.expect_capture_paypal().times(0);
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::post()
                .uri(&format!("/api/v1/checkout/paypal/{id}/capture"))
                .set_json(form("paypal")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "paypalOrderId");
    }

    #[actix_web::test]
    async fn paypal_outages_are_service_unavailable() {
        let (mut ports, customer) = signed_in(Role::Customer);
        ports
            .checkout
            .expect_start_paypal()
            .returning(|_, _| Err(Error::service_unavailable("payment provider unavailable")));
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::post()
                .uri("/api/v1/checkout/paypal")
                .set_json(form("paypal")),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "service_unavailable");
    }
}
