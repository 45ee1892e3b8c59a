//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every handler is mounted by [`configure`] relative to the `/api/v1` scope.
//! Health probes live outside the scope and are registered by the server.

use actix_web::web;

pub mod admin_catalogue;
pub mod admin_orders;
pub mod auth;
pub mod cart;
pub mod catalogue;
pub mod chat;
pub mod chat_stream;
pub mod checkout;
pub mod contact;
pub mod error;
pub mod health;
pub mod orders;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod subscribers;
pub mod testimonials;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(error::configure_extractors)
        .service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::list_users)
        .service(users::change_role)
        .service(catalogue::list_categories)
        .service(catalogue::list_products)
        .service(catalogue::product_by_slug)
        .service(admin_catalogue::create_category)
        .service(admin_catalogue::update_category)
        .service(admin_catalogue::delete_category)
        .service(admin_catalogue::list_all_products)
        .service(admin_catalogue::create_product)
        .service(admin_catalogue::update_product)
        .service(admin_catalogue::delete_product)
        .service(cart::view_cart)
        .service(cart::add_item)
        .service(cart::set_quantity)
        .service(cart::remove_item)
        .service(cart::clear_cart)
        .service(checkout::place_order)
        .service(checkout::start_paypal)
        .service(checkout::capture_paypal)
        .service(orders::my_orders)
        .service(orders::my_order)
        .service(orders::cancel_order)
        .service(admin_orders::list_orders)
        .service(admin_orders::get_order)
        .service(admin_orders::set_status)
        .service(admin_orders::delete_order)
        .service(testimonials::published)
        .service(testimonials::submit)
        .service(testimonials::list_all)
        .service(testimonials::set_published)
        .service(testimonials::delete_testimonial)
        .service(subscribers::subscribe)
        .service(subscribers::list_subscribers)
        .service(subscribers::delete_subscriber)
        .service(contact::send_message)
        .service(contact::inbox)
        .service(contact::mark_read)
        .service(contact::delete_message)
        .service(chat::list_groups)
        .service(chat::create_group)
        .service(chat::delete_group)
        .service(chat::list_messages)
        .service(chat::post_message)
        .service(chat::set_presence)
        .service(chat::presence)
        .service(chat_stream::stream_messages)
        .configure(uploads::configure);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::test_support::category;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use test_utils::{TestPorts, call_json, signed_in};

    #[actix_web::test]
    async fn public_routes_are_reachable_through_the_full_table() {
        let mut ports = TestPorts::default();
        ports
            .catalogue
            .expect_list_categories()
            .returning(|| Ok(vec![category()]));
        let (status, body) = call_json(
            ports,
            None,
            configure,
            TestRequest::get().uri("/api/v1/categories"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["slug"], "pizza");
    }

    #[rstest]
    #[case("/api/v1/admin/orders")]
    #[case("/api/v1/admin/subscribers")]
    #[case("/api/v1/admin/chat/groups")]
    #[actix_web::test]
    async fn admin_routes_refuse_customers(#[case] uri: &str) {
        let (ports, caller) = signed_in(Role::Customer);
        let (status, _) =
            call_json(ports, Some(&caller), configure, TestRequest::get().uri(uri)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn unknown_routes_are_not_found() {
        let (status, _) = call_json(
            TestPorts::default(),
            None,
            configure,
            TestRequest::get().uri("/api/v1/nowhere"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
