//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `/api/v1` plus the health
//! probes. Request and response schemas are collected from the handler
//! annotations; the error wrappers are listed explicitly so the document
//! names every error code. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it for client generators.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Session cookie issued by POST /api/v1/login or /api/v1/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bistro API",
        description = "Menu browsing, carts, checkout, order tracking and the staff back office."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::change_role,
        crate::inbound::http::catalogue::list_categories,
        crate::inbound::http::catalogue::list_products,
        crate::inbound::http::catalogue::product_by_slug,
        crate::inbound::http::admin_catalogue::create_category,
        crate::inbound::http::admin_catalogue::update_category,
        crate::inbound::http::admin_catalogue::delete_category,
        crate::inbound::http::admin_catalogue::list_all_products,
        crate::inbound::http::admin_catalogue::create_product,
        crate::inbound::http::admin_catalogue::update_product,
        crate::inbound::http::admin_catalogue::delete_product,
        crate::inbound::http::cart::view_cart,
        crate::inbound::http::cart::add_item,
        crate::inbound::http::cart::set_quantity,
        crate::inbound::http::cart::remove_item,
        crate::inbound::http::cart::clear_cart,
        crate::inbound::http::checkout::place_order,
        crate::inbound::http::checkout::start_paypal,
        crate::inbound::http::checkout::capture_paypal,
        crate::inbound::http::orders::my_orders,
        crate::inbound::http::orders::my_order,
        crate::inbound::http::orders::cancel_order,
        crate::inbound::http::admin_orders::list_orders,
        crate::inbound::http::admin_orders::get_order,
        crate::inbound::http::admin_orders::set_status,
        crate::inbound::http::admin_orders::delete_order,
        crate::inbound::http::testimonials::published,
        crate::inbound::http::testimonials::submit,
        crate::inbound::http::testimonials::list_all,
        crate::inbound::http::testimonials::set_published,
        crate::inbound::http::testimonials::delete_testimonial,
        crate::inbound::http::subscribers::subscribe,
        crate::inbound::http::subscribers::list_subscribers,
        crate::inbound::http::subscribers::delete_subscriber,
        crate::inbound::http::contact::send_message,
        crate::inbound::http::contact::inbox,
        crate::inbound::http::contact::mark_read,
        crate::inbound::http::contact::delete_message,
        crate::inbound::http::chat::list_groups,
        crate::inbound::http::chat::create_group,
        crate::inbound::http::chat::delete_group,
        crate::inbound::http::chat::list_messages,
        crate::inbound::http::chat::post_message,
        crate::inbound::http::chat::set_presence,
        crate::inbound::http::chat::presence,
        crate::inbound::http::chat_stream::stream_messages,
        crate::inbound::http::uploads::upload_image,
        crate::inbound::http::uploads::fetch_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "users", description = "Registration, sign-in and accounts"),
        (name = "catalogue", description = "Public menu"),
        (name = "cart", description = "The signed-in customer's cart"),
        (name = "checkout", description = "Placing orders and PayPal payments"),
        (name = "orders", description = "Order history and delivery tracking"),
        (name = "testimonials", description = "Customer reviews"),
        (name = "newsletter", description = "Newsletter sign-up"),
        (name = "contact", description = "Contact form"),
        (name = "chat", description = "Staff chat rooms"),
        (name = "uploads", description = "Product and category images"),
        (name = "admin", description = "Back-office management"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    #[rstest]
    #[case("/api/v1/register")]
    #[case("/api/v1/products/{slug}")]
    #[case("/api/v1/checkout/paypal/{paypalOrderId}/capture")]
    #[case("/api/v1/orders/{id}/cancel")]
    #[case("/api/v1/admin/chat/stream")]
    #[case("/health/ready")]
    fn document_lists_the_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn error_schema_has_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        // utoipa replaces :: with . in schema names
        match schemas.get("crate.domain.Error").expect("Error schema") {
            RefOr::T(Schema::Object(obj)) => {
                assert!(obj.properties.contains_key("code"));
                assert!(obj.properties.contains_key("message"));
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn session_cookie_scheme_uses_the_configured_name() {
        let json = ApiDoc::openapi().to_json().expect("document serialises");
        assert!(json.contains(SESSION_COOKIE_NAME));
    }
}
