//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{
    AccountCommand, AccountQuery, CatalogueCommand, CatalogueQuery, Checkout, ContactInbox,
    ImageLibrary, OrderAdministration, OrderTracking, ShoppingCart, StaffChat, Subscribers,
    Testimonials,
};

/// Default interval between chat stream polls.
pub const DEFAULT_CHAT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub account_query: Arc<dyn AccountQuery>,
    pub catalogue: Arc<dyn CatalogueQuery>,
    pub catalogue_admin: Arc<dyn CatalogueCommand>,
    pub cart: Arc<dyn ShoppingCart>,
    pub checkout: Arc<dyn Checkout>,
    pub orders: Arc<dyn OrderTracking>,
    pub order_admin: Arc<dyn OrderAdministration>,
    pub testimonials: Arc<dyn Testimonials>,
    pub subscribers: Arc<dyn Subscribers>,
    pub contact: Arc<dyn ContactInbox>,
    pub chat: Arc<dyn StaffChat>,
    pub images: Arc<dyn ImageLibrary>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub account_query: Arc<dyn AccountQuery>,
    pub catalogue: Arc<dyn CatalogueQuery>,
    pub catalogue_admin: Arc<dyn CatalogueCommand>,
    pub cart: Arc<dyn ShoppingCart>,
    pub checkout: Arc<dyn Checkout>,
    pub orders: Arc<dyn OrderTracking>,
    pub order_admin: Arc<dyn OrderAdministration>,
    pub testimonials: Arc<dyn Testimonials>,
    pub subscribers: Arc<dyn Subscribers>,
    pub contact: Arc<dyn ContactInbox>,
    pub chat: Arc<dyn StaffChat>,
    pub images: Arc<dyn ImageLibrary>,
    /// How often the chat event stream polls for new messages.
    pub chat_poll_interval: Duration,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle with the default poll interval.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            account_query,
            catalogue,
            catalogue_admin,
            cart,
            checkout,
            orders,
            order_admin,
            testimonials,
            subscribers,
            contact,
            chat,
            images,
        } = ports;
        Self {
            accounts,
            account_query,
            catalogue,
            catalogue_admin,
            cart,
            checkout,
            orders,
            order_admin,
            testimonials,
            subscribers,
            contact,
            chat,
            images,
            chat_poll_interval: DEFAULT_CHAT_POLL_INTERVAL,
        }
    }

    /// Override the chat poll interval; zero is raised to one millisecond.
    #[must_use]
    pub fn with_chat_poll_interval(mut self, interval: Duration) -> Self {
        self.chat_poll_interval = interval.max(Duration::from_millis(1));
        self
    }
}
