//! Shopping cart endpoints. Every route needs a session.
//!
//! ```text
//! GET    /api/v1/cart
//! POST   /api/v1/cart/items {"productId":"…","quantity":2}
//! PATCH  /api/v1/cart/items/{productId} {"quantity":0}
//! DELETE /api/v1/cart/items/{productId}
//! DELETE /api/v1/cart
//! ```

use actix_web::{delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Cart, CartLine, Quantity};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_uuid};

const PRODUCT_ID: FieldName = FieldName::new("productId");

/// One cart line priced at the current menu price.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_total_cents: i64,
    pub image_url: Option<String>,
}

impl From<&CartLine> for CartItemResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            unit_price_cents: line.unit_price.cents(),
            quantity: line.quantity.get(),
            line_total_cents: line.line_total().cents(),
            image_url: line.image_url.clone(),
        }
    }
}

/// The caller's cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub subtotal_cents: i64,
    pub item_count: u32,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemResponse::from).collect(),
            subtotal_cents: cart.subtotal().cents(),
            item_count: cart.item_count(),
        }
    }
}

/// Body for `POST /api/v1/cart/items`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[schema(example = 1)]
    pub quantity: u32,
}

/// Body for `PATCH /api/v1/cart/items/{productId}`; zero removes the line.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

fn quantity(value: u32) -> ApiResult<Quantity> {
    Quantity::new(value).map_err(|err| field_error("quantity", err))
}

/// View the cart.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart", body = CartResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["cart"],
    operation_id = "viewCart"
)]
#[get("/cart")]
pub async fn view_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CartResponse>> {
    let user = require_user(&state, &session).await?;
    let cart = state.cart.view(user.id()).await?;
    Ok(web::Json(cart.into()))
}

/// Add a product, merging with an existing line.
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Quantity out of range", body = ErrorSchema),
        (status = 404, description = "Unknown or unavailable product", body = ErrorSchema)
    ),
    tags = ["cart"],
    operation_id = "addCartItem"
)]
#[post("/cart/items")]
pub async fn add_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddItemRequest>,
) -> ApiResult<web::Json<CartResponse>> {
    let user = require_user(&state, &session).await?;
    let AddItemRequest {
        product_id,
        quantity: raw,
    } = payload.into_inner();
    let cart = state
        .cart
        .add_item(user.id(), product_id, quantity(raw)?)
        .await?;
    Ok(web::Json(cart.into()))
}

/// Set a line's quantity.
#[utoipa::path(
    patch,
    path = "/api/v1/cart/items/{productId}",
    params(("productId" = Uuid, Path, description = "Product id")),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Quantity out of range", body = ErrorSchema),
        (status = 404, description = "Product not in cart", body = ErrorSchema)
    ),
    tags = ["cart"],
    operation_id = "setCartQuantity"
)]
#[patch("/cart/items/{product_id}")]
pub async fn set_quantity(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SetQuantityRequest>,
) -> ApiResult<web::Json<CartResponse>> {
    let user = require_user(&state, &session).await?;
    let product_id = parse_uuid(path.into_inner(), PRODUCT_ID)?;
    let requested = match payload.quantity {
        0 => None,
        raw => Some(quantity(raw)?),
    };
    let cart = state
        .cart
        .set_quantity(user.id(), product_id, requested)
        .await?;
    Ok(web::Json(cart.into()))
}

/// Drop one line.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{productId}",
    params(("productId" = Uuid, Path, description = "Product id")),
    responses((status = 200, description = "Updated cart", body = CartResponse)),
    tags = ["cart"],
    operation_id = "removeCartItem"
)]
#[delete("/cart/items/{product_id}")]
pub async fn remove_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CartResponse>> {
    let user = require_user(&state, &session).await?;
    let product_id = parse_uuid(path.into_inner(), PRODUCT_ID)?;
    let cart = state.cart.remove_item(user.id(), product_id).await?;
    Ok(web::Json(cart.into()))
}

/// Empty the cart.
#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    responses((status = 200, description = "Empty cart", body = CartResponse)),
    tags = ["cart"],
    operation_id = "clearCart"
)]
#[delete("/cart")]
pub async fn clear_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CartResponse>> {
    let user = require_user(&state, &session).await?;
    let cart = state.cart.clear(user.id()).await?;
    Ok(web::Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, Role};
    use crate::inbound::http::test_utils::{TestPorts, call_json, signed_in, test_app};
    use crate::test_support::{cart_line, product};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(view_cart)
            .service(add_item)
            .service(set_quantity)
            .service(remove_item)
            .service(clear_cart);
    }

    #[actix_web::test]
    async fn cart_totals_use_current_prices() {
        let (mut ports, customer) = signed_in(Role::Customer);
        let pizza = product(1250, 15);
        let cart = Cart::new(vec![cart_line(&pizza, 3)]);
        ports.cart.expect_view().returning(move |_| Ok(cart.clone()));
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::get().uri("/api/v1/cart"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["unitPriceCents"], 1250);
        assert_eq!(body["items"][0]["lineTotalCents"], 3750);
        assert_eq!(body["subtotalCents"], 3750);
        assert_eq!(body["itemCount"], 3);
    }

    #[rstest]
    #[case(0)]
    #[case(100)]
    #[actix_web::test]
    async fn add_rejects_out_of_range_quantities(#[case] raw: u32) {
        let (ports, customer) = signed_in(Role::Customer);
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::post()
                .uri("/api/v1/cart/items")
                .set_json(json!({"productId": Uuid::nil(), "quantity": raw})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "quantity");
    }

    #[actix_web::test]
    async fn unavailable_products_are_not_found() {
        let (mut ports, customer) = signed_in(Role::Customer);
        ports
            .cart
            .expect_add_item()
            .returning(|_, _, _| Err(Error::not_found("product not found")));
        let (status, _) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::post()
                .uri("/api/v1/cart/items")
                .set_json(json!({"productId": Uuid::nil(), "quantity": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn zero_quantity_removes_the_line() {
        let (mut ports, customer) = signed_in(Role::Customer);
        ports
            .cart
            .expect_set_quantity()
            .withf(|_, _, quantity| quantity.is_none())
            .times(1)
            .returning(|_, _, _| Ok(Cart::default()));
        let (status, body) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/cart/items/{}", Uuid::nil()))
                .set_json(json!({"quantity": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"], json!([]));
        assert_eq!(body["itemCount"], 0);
    }

    #[actix_web::test]
    async fn anonymous_callers_have_no_cart() {
        let app = test::init_service(test_app(TestPorts::default().into_state(), routes)).await;
        let res = test::call_service(&app, test::TestRequest::delete().uri("/api/v1/cart").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
