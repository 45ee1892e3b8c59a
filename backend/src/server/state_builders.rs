//! Builders wiring domain services onto their adapters.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use bistro::domain::ports::{Checkout, NoOpNotifier, Notifier, PaymentGateway};
use bistro::domain::{
    AccountService, CartService, CatalogueService, ChatService, CheckoutService, ContactService,
    ImageService, OrderService, SubscriberService, TestimonialService,
};
use bistro::inbound::http::state::{HttpState, HttpStatePorts};
use bistro::outbound::paypal::{DisabledPaymentGateway, PaypalCredentials, PaypalHttpGateway};
use bistro::outbound::persistence::{
    DbPool, DieselCartRepository, DieselCatalogueRepository, DieselChatRepository,
    DieselContactRepository, DieselImageRepository, DieselOrderRepository,
    DieselSubscriberRepository, DieselTestimonialRepository, DieselUserRepository,
};
use bistro::outbound::storage::FsImageStore;
use bistro::outbound::telegram::{TelegramNotifier, TelegramTarget};
use bistro::settings::{PaypalSettings, TelegramSettings};

use super::ServerConfig;

const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram when configured, otherwise a notifier that drops messages.
fn build_notifier(telegram: Option<&TelegramSettings>) -> std::io::Result<Arc<dyn Notifier>> {
    let Some(telegram) = telegram else {
        warn!("Telegram not configured; staff notifications are disabled");
        return Ok(Arc::new(NoOpNotifier));
    };
    let notifier = TelegramNotifier::new(
        TelegramTarget {
            bot_token: telegram.bot_token.clone(),
            chat_id: telegram.chat_id.clone(),
        },
        OUTBOUND_TIMEOUT,
    )
    .map_err(|err| std::io::Error::other(format!("telegram notifier setup failed: {err}")))?;
    info!(chat_id = %telegram.chat_id, "Telegram notifications enabled");
    Ok(Arc::new(notifier))
}

fn checkout_with<G>(
    pool: &DbPool,
    gateway: G,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: &ServerConfig,
) -> Arc<dyn Checkout>
where
    G: PaymentGateway + 'static,
{
    Arc::new(CheckoutService::new(
        Arc::new(DieselCartRepository::new(pool.clone())),
        Arc::new(DieselOrderRepository::new(pool.clone())),
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(gateway),
        notifier,
        clock,
        config.checkout.clone(),
    ))
}

/// Checkout over PayPal when credentials are present; PayPal endpoints
/// answer 503 otherwise.
fn build_checkout(
    config: &ServerConfig,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn Checkout>> {
    let pool = &config.db_pool;
    match &config.paypal {
        Some(PaypalSettings {
            base_url,
            client_id,
            client_secret,
        }) => {
            let gateway = PaypalHttpGateway::new(
                base_url.clone(),
                PaypalCredentials {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                },
                OUTBOUND_TIMEOUT,
            )
            .map_err(|err| std::io::Error::other(format!("paypal client setup failed: {err}")))?;
            info!(%base_url, "PayPal payments enabled");
            Ok(checkout_with(pool, gateway, notifier, clock, config))
        }
        None => {
            warn!("PayPal not configured; only cash orders are accepted");
            Ok(checkout_with(
                pool,
                DisabledPaymentGateway,
                notifier,
                clock,
                config,
            ))
        }
    }
}

/// Build the shared HTTP state from the database pool and integrations.
///
/// # Errors
///
/// Fails when the upload directory cannot be opened or an outbound client
/// cannot be constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let pool = &config.db_pool;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let notifier = build_notifier(config.telegram.as_ref())?;

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let catalogue_repo = Arc::new(DieselCatalogueRepository::new(pool.clone()));
    let orders_repo = Arc::new(DieselOrderRepository::new(pool.clone()));

    let accounts = Arc::new(AccountService::new(users.clone(), clock.clone()));
    let catalogue = Arc::new(CatalogueService::new(catalogue_repo.clone()));
    let orders = Arc::new(OrderService::new(orders_repo, clock.clone()));
    let store = FsImageStore::open(&config.upload_dir)?;
    info!(path = %config.upload_dir.display(), "image store opened");

    let ports = HttpStatePorts {
        accounts: accounts.clone(),
        account_query: accounts,
        catalogue: catalogue.clone(),
        catalogue_admin: catalogue,
        cart: Arc::new(CartService::new(
            Arc::new(DieselCartRepository::new(pool.clone())),
            catalogue_repo,
        )),
        checkout: build_checkout(config, notifier.clone(), clock.clone())?,
        orders: orders.clone(),
        order_admin: orders,
        testimonials: Arc::new(TestimonialService::new(
            Arc::new(DieselTestimonialRepository::new(pool.clone())),
            users,
            clock.clone(),
        )),
        subscribers: Arc::new(SubscriberService::new(
            Arc::new(DieselSubscriberRepository::new(pool.clone())),
            clock.clone(),
        )),
        contact: Arc::new(ContactService::new(
            Arc::new(DieselContactRepository::new(pool.clone())),
            notifier,
            clock.clone(),
        )),
        chat: Arc::new(ChatService::new(
            Arc::new(DieselChatRepository::new(pool.clone())),
            clock.clone(),
        )),
        images: Arc::new(ImageService::new(
            Arc::new(DieselImageRepository::new(pool.clone())),
            Arc::new(store),
            clock,
        )),
    };

    Ok(web::Data::new(
        HttpState::new(ports).with_chat_poll_interval(config.chat_poll_interval),
    ))
}
