//! Back-office order management.
//!
//! ```text
//! GET    /api/v1/admin/orders?status=PENDING&page=1&limit=20
//! GET    /api/v1/admin/orders/{id}
//! PATCH  /api/v1/admin/orders/{id} {"status":"COMPLETED"}
//! DELETE /api/v1/admin/orders/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, web};
use pagination::PageLimits;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{OrderFilter, OrderStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::orders::{ORDER_ID, OrderResponse};
use crate::inbound::http::schemas::{ErrorSchema, PageResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, page_request, parse_uuid};

/// Listing query.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct OrderListQuery {
    /// One of `PENDING`, `CONFIRMED`, `COMPLETED`, `CANCELLED`.
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Body for `PATCH /api/v1/admin/orders/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusRequest {
    #[schema(example = "CONFIRMED")]
    pub status: String,
}

fn parse_status(raw: &str) -> ApiResult<OrderStatus> {
    raw.trim().parse().map_err(|err| field_error("status", err))
}

/// Page through every order, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders", body = PageResponse<OrderResponse>),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListOrders"
)]
#[get("/admin/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OrderListQuery>,
) -> ApiResult<web::Json<PageResponse<OrderResponse>>> {
    require_admin(&state, &session).await?;
    let filter = OrderFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
    };
    let request = page_request(PageLimits::new(20, 100), query.page, query.limit)?;
    let page = state.order_admin.list_orders(filter, request).await?;
    Ok(web::Json(PageResponse::from_page(page, OrderResponse::from)))
}

/// Any order by id.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminGetOrder"
)]
#[get("/admin/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderResponse>> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), ORDER_ID)?;
    Ok(web::Json(state.order_admin.order(id).await?.into()))
}

/// Set an order's status. `COMPLETED` also marks it delivered.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = OrderStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminSetOrderStatus"
)]
#[patch("/admin/orders/{id}")]
pub async fn set_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<OrderStatusRequest>,
) -> ApiResult<web::Json<OrderResponse>> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), ORDER_ID)?;
    let status = parse_status(&payload.status)?;
    Ok(web::Json(state.order_admin.set_status(id, status).await?.into()))
}

/// Delete an order and its items.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteOrder"
)]
#[delete("/admin/orders/{id}")]
pub async fn delete_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), ORDER_ID)?;
    state.order_admin.delete_order(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderStage, Role, TrackedOrder, UserId};
    use crate::inbound::http::test_utils::{call_json, signed_in};
    use crate::test_support::order;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use pagination::Page;
    use serde_json::json;
    use uuid::Uuid;

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(list_orders)
            .service(get_order)
            .service(set_status)
            .service(delete_order);
    }

    fn tracked(status: OrderStatus, stage: OrderStage, progress: u8) -> TrackedOrder {
        TrackedOrder {
            order: order(UserId::random(), status, stage),
            progress_percent: progress,
        }
    }

    #[actix_web::test]
    async fn status_filter_reaches_the_port() {
        let (mut ports, admin) = signed_in(Role::Admin);
        ports
            .order_admin
            .expect_list_orders()
            .withf(|filter, request| {
                filter.status == Some(OrderStatus::Pending) && request.limit() == 20
            })
            .returning(|_, request| {
                Ok(Page::new(
                    vec![tracked(OrderStatus::Pending, OrderStage::Preparing, 30)],
                    1,
                    request,
                ))
            });
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::get().uri("/api/v1/admin/orders?status=PENDING"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["progressPercent"], 30);
    }

    #[actix_web::test]
    async fn unknown_status_filters_are_rejected() {
        let (ports, admin) = signed_in(Role::Admin);
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::get().uri("/api/v1/admin/orders?status=LOST"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "status");
    }

    #[actix_web::test]
    async fn completing_an_order_delivers_it() {
        let (mut ports, admin) = signed_in(Role::Admin);
        ports
            .order_admin
            .expect_set_status()
            .withf(|_, status| *status == OrderStatus::Completed)
            .returning(|_, _| Ok(tracked(OrderStatus::Completed, OrderStage::Delivered, 100)));
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/admin/orders/{}", Uuid::new_v4()))
                .set_json(json!({"status": "COMPLETED"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stage"], "DELIVERED");
        assert_eq!(body["progressPercent"], 100);
    }

    #[actix_web::test]
    async fn deleting_returns_no_content() {
        let (mut ports, admin) = signed_in(Role::Admin);
        ports
            .order_admin
            .expect_delete_order()
            .times(1)
            .returning(|_| Ok(()));
        let (status, _) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::delete().uri(&format!("/api/v1/admin/orders/{}", Uuid::new_v4())),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn customers_cannot_manage_orders() {
        let (ports, customer) = signed_in(Role::Customer);
        let (status, _) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::get().uri("/api/v1/admin/orders"),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
