//! Customer order tracking and the order wire format.
//!
//! ```text
//! GET  /api/v1/orders
//! GET  /api/v1/orders/{id}
//! POST /api/v1/orders/{id}/cancel
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::OrderItem;
use crate::domain::{Order, TrackedOrder};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

pub(crate) const ORDER_ID: FieldName = FieldName::new("id");

/// Purchased product snapshot.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    /// `null` once the product has been deleted from the menu.
    pub product_id: Option<Uuid>,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_total_cents: i64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            line_total_cents: item.line_total().cents(),
            product_id: item.product_id,
            name: item.name,
            unit_price_cents: item.unit_price.cents(),
            quantity: item.quantity.get(),
        }
    }
}

/// Order with its delivery progress.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: String,
    #[schema(example = "PENDING")]
    pub status: String,
    #[schema(example = "PREPARING")]
    pub stage: String,
    #[schema(example = "card")]
    pub payment_method: String,
    #[schema(example = "unpaid")]
    pub payment_status: String,
    pub paypal_order_id: Option<String>,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub delivery_address: String,
    pub phone: String,
    pub notes: Option<String>,
    #[schema(example = 30)]
    pub estimated_minutes: u32,
    /// Whole percent in `0..=100`.
    #[schema(example = 40)]
    pub progress_percent: u8,
    pub created_at: DateTime<Utc>,
    pub stage_updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    fn build(order: Order, progress_percent: u8) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id.to_string(),
            status: order.status.as_str().to_owned(),
            stage: order.stage.as_str().to_owned(),
            payment_method: order.payment_method.as_str().to_owned(),
            payment_status: order.payment_status.as_str().to_owned(),
            paypal_order_id: order.paypal_order_id,
            subtotal_cents: order.pricing.subtotal.cents(),
            delivery_fee_cents: order.pricing.delivery_fee.cents(),
            total_cents: order.pricing.total.cents(),
            delivery_address: order.delivery.address,
            phone: order.delivery.phone,
            notes: order.delivery.notes,
            estimated_minutes: order.estimated_minutes.get(),
            progress_percent,
            created_at: order.created_at,
            stage_updated_at: order.stage_updated_at,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

impl From<TrackedOrder> for OrderResponse {
    fn from(tracked: TrackedOrder) -> Self {
        Self::build(tracked.order, tracked.progress_percent)
    }
}

/// A freshly placed order has made no progress yet.
impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self::build(order, 0)
    }
}

/// The caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders", body = [OrderResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "myOrders"
)]
#[get("/orders")]
pub async fn my_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OrderResponse>>> {
    let user = require_user(&state, &session).await?;
    let orders = state.orders.my_orders(user.id()).await?;
    Ok(web::Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// One of the caller's orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "myOrder"
)]
#[get("/orders/{id}")]
pub async fn my_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderResponse>> {
    let user = require_user(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), ORDER_ID)?;
    let order = state.orders.my_order(user.id(), id).await?;
    Ok(web::Json(order.into()))
}

/// Cancel an order the kitchen has not started.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Cancelled order", body = OrderResponse),
        (status = 404, description = "Unknown order", body = ErrorSchema),
        (status = 409, description = "Order can no longer be cancelled", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "cancelOrder"
)]
#[post("/orders/{id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderResponse>> {
    let user = require_user(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), ORDER_ID)?;
    let order = state.orders.cancel(user.id(), id).await?;
    Ok(web::Json(order.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, OrderStage, OrderStatus, Role, UserId};
    use crate::inbound::http::test_utils::{call_json, signed_in};
    use crate::test_support::order;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(my_orders).service(my_order).service(cancel_order);
    }

    #[actix_web::test]
    async fn order_list_reports_stage_and_progress() {
        let (mut ports, customer) = signed_in(Role::Customer);
        let owner = *customer.id();
        ports.orders.expect_my_orders().returning(move |_| {
            Ok(vec![TrackedOrder {
                order: order(owner, OrderStatus::Pending, OrderStage::Preparing),
                progress_percent: 40,
            }])
        });
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::get().uri("/api/v1/orders"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let first = &body[0];
        assert_eq!(first["stage"], "PREPARING");
        assert_eq!(first["status"], "PENDING");
        assert_eq!(first["paymentStatus"], "unpaid");
        assert_eq!(first["paymentMethod"], "card");
        assert_eq!(first["progressPercent"], 40);
        assert_eq!(first["estimatedMinutes"], 20);
        assert_eq!(first["items"][0]["lineTotalCents"], 1250);
        assert!(first.get("stageUpdatedAt").is_some());
    }

    #[actix_web::test]
    async fn foreign_orders_are_not_found() {
        let (mut ports, customer) = signed_in(Role::Customer);
        ports
            .orders
            .expect_my_order()
            .returning(|_, _| Err(Error::not_found("order not found")));
        let (status, _) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::get().uri(&format!("/api/v1/orders/{}", Uuid::new_v4())),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn late_cancellations_conflict() {
        let (mut ports, customer) = signed_in(Role::Customer);
        ports
            .orders
            .expect_cancel()
            .returning(|_, _| Err(Error::conflict("order can no longer be cancelled")));
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::post().uri(&format!("/api/v1/orders/{}/cancel", Uuid::new_v4())),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");
    }

    #[rstest]
    #[::core::prelude::v1::test]
    fn fresh_orders_start_without_progress() {
        let placed = order(UserId::random(), OrderStatus::Confirmed, OrderStage::Received);
        let response = OrderResponse::from(placed);
        assert_eq!(response.progress_percent, 0);
        assert_eq!(response.stage, "RECEIVED");
    }
}
