//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`AccountCommand`, `Checkout`, ...) are what inbound
//! adapters call; the domain services implement them. Driven ports
//! (`*Repository`, `PaymentGateway`, `Notifier`, ...) are what the services
//! call; outbound adapters implement them.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod cart_repository;
mod catalogue;
mod catalogue_repository;
mod chat_repository;
mod checkout;
mod feedback;
mod feedback_repositories;
mod image_library;
mod image_ports;
mod notifier;
mod order_repository;
mod orders;
mod payment_gateway;
mod shopping_cart;
mod staff_chat;
mod user_repository;

#[cfg(test)]
pub use accounts::{MockAccountCommand, MockAccountQuery};
pub use accounts::{AccountCommand, AccountQuery};
#[cfg(test)]
pub use cart_repository::MockCartRepository;
pub use cart_repository::{CartRepository, CartRepositoryError};
#[cfg(test)]
pub use catalogue::{MockCatalogueCommand, MockCatalogueQuery};
pub use catalogue::{CatalogueCommand, CatalogueQuery};
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{CatalogueRepository, CatalogueRepositoryError};
#[cfg(test)]
pub use chat_repository::MockChatRepository;
pub use chat_repository::{ChatRepository, ChatRepositoryError};
#[cfg(test)]
pub use checkout::MockCheckout;
pub use checkout::{Checkout, CheckoutRequest};
#[cfg(test)]
pub use feedback::{MockContactInbox, MockSubscribers, MockTestimonials};
pub use feedback::{ContactInbox, Subscribers, Testimonials};
#[cfg(test)]
pub use feedback_repositories::{
    MockContactRepository, MockSubscriberRepository, MockTestimonialRepository,
};
pub use feedback_repositories::{
    ContactRepository, FeedbackRepositoryError, NewTestimonial, SubscriberRepository,
    TestimonialRepository,
};
#[cfg(test)]
pub use image_library::MockImageLibrary;
pub use image_library::ImageLibrary;
#[cfg(test)]
pub use image_ports::{MockImageRepository, MockImageStore};
pub use image_ports::{ImageRepository, ImageRepositoryError, ImageStore, ImageStoreError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{NoOpNotifier, Notifier};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError};
#[cfg(test)]
pub use orders::{MockOrderAdministration, MockOrderTracking};
pub use orders::{OrderAdministration, OrderTracking};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{CaptureOutcome, CapturedAmount, PaymentGateway, PaymentGatewayError};
#[cfg(test)]
pub use shopping_cart::MockShoppingCart;
pub use shopping_cart::ShoppingCart;
#[cfg(test)]
pub use staff_chat::MockStaffChat;
pub use staff_chat::StaffChat;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewAccount, StoredCredentials, UserPersistenceError, UserRepository};
