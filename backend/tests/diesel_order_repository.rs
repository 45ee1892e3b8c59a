//! Integration tests for the Diesel order and catalogue repositories against
//! embedded PostgreSQL.
//!
//! Each test provisions its own cluster and database, runs the embedded
//! migrations and seeds one customer plus a two-product menu.

use std::sync::Arc;

use bistro::domain::order::{OrderItem, Settlement};
use bistro::domain::ports::{
    CartRepository, CatalogueCommand, CatalogueRepository, CatalogueRepositoryError,
    OrderRepository, OrderRepositoryError,
};
use bistro::domain::{
    CatalogueService, CategoryDraft, DeliveryDetails, ErrorCode, Money, NewOrder, OrderStage,
    OrderStatus, PreparationMinutes, Product, ProductDraft, Quantity, Slug, StageChange, UserId,
};
use bistro::outbound::persistence::{
    DbPool, DieselCartRepository, DieselCatalogueRepository, DieselOrderRepository, PoolConfig,
    run_pending_migrations,
};
use chrono::{DateTime, TimeZone, Utc};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

#[path = "support/pg_embed.rs"]
mod pg_embed;

mod support;

use pg_embed::test_cluster;
use support::{format_postgres_error, handle_cluster_setup_failure, reset_database};

const TEST_DB: &str = "diesel_order_repository_test";
const DELIVERY_FEE_CENTS: i64 = 300;

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    orders: DieselOrderRepository,
    carts: DieselCartRepository,
    catalogue: DieselCatalogueRepository,
    customer: UserId,
    category_id: Uuid,
    pizza: Product,
    salad: Product,
}

fn placed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 18, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn seed_customer(url: &str, id: &UserId) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .execute(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)",
            &[
                id.as_uuid(),
                &"Ada Diner",
                &"ada@example.com",
                &"$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
            ],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(())
}

fn product_draft(category_id: Uuid, slug: &str, price_cents: i64, minutes: u32) -> ProductDraft {
    ProductDraft {
        category_id,
        name: slug.replace('-', " "),
        slug: Slug::new(slug).expect("valid slug"),
        description: None,
        price: Money::from_cents(price_cents).expect("non-negative price"),
        image_url: None,
        preparation_minutes: PreparationMinutes::new(minutes).expect("valid minutes"),
        is_available: true,
        is_featured: false,
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    reset_database(&cluster, TEST_DB)?;
    let database_url = cluster.connection().database_url(TEST_DB);
    runtime
        .block_on(run_pending_migrations(&database_url))
        .map_err(|err| err.to_string())?;

    let customer = UserId::random();
    seed_customer(&database_url, &customer)?;

    let pool = runtime
        .block_on(DbPool::new(
            PoolConfig::new(database_url.as_str()).with_max_connections(2),
        ))
        .map_err(|err| err.to_string())?;
    let catalogue = DieselCatalogueRepository::new(pool.clone());
    let (category_id, pizza, salad) = runtime.block_on(async {
        let category = catalogue
            .create_category(&CategoryDraft {
                name: String::from("Mains"),
                slug: Slug::new("mains").expect("valid slug"),
                description: None,
                image_url: None,
            })
            .await?;
        let pizza = catalogue
            .create_product(&product_draft(category.id, "margherita", 1250, 18))
            .await?;
        let salad = catalogue
            .create_product(&product_draft(category.id, "house-salad", 800, 6))
            .await?;
        Ok::<_, CatalogueRepositoryError>((category.id, pizza, salad))
    })
    .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        orders: DieselOrderRepository::new(pool.clone()),
        carts: DieselCartRepository::new(pool),
        catalogue,
        customer,
        category_id,
        pizza,
        salad,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

impl TestContext {
    /// Two pizzas and a salad: 3300 cents before delivery.
    fn fill_cart(&self) {
        self.runtime.block_on(async {
            for (product, quantity) in [(&self.pizza, 2), (&self.salad, 1)] {
                self.carts
                    .set_quantity(
                        &self.customer,
                        product.id,
                        Quantity::new(quantity).expect("valid quantity"),
                    )
                    .await
                    .expect("cart line stored");
            }
        });
    }

    fn pending_order(&self) -> NewOrder {
        let cart = self
            .runtime
            .block_on(self.carts.load(&self.customer))
            .expect("cart loads");
        NewOrder::from_cart(
            self.customer,
            &cart,
            DeliveryDetails {
                address: String::from("1 Main Street"),
                phone: String::from("+44 20 7946 0000"),
                notes: Some(String::from("ring twice")),
            },
            Settlement::OnDelivery,
            Money::from_cents(DELIVERY_FEE_CENTS).expect("fee"),
            15,
            placed_at(),
        )
        .expect("cart is not empty")
    }

    fn cart_size(&self) -> usize {
        self.runtime
            .block_on(self.carts.load(&self.customer))
            .expect("cart loads")
            .lines()
            .len()
    }
}

#[rstest]
fn checkout_moves_the_cart_into_an_order(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: checkout_moves_the_cart_into_an_order skipped");
        return;
    };
    context.fill_cart();
    let new_order = context.pending_order();

    let created = context
        .runtime
        .block_on(context.orders.create_from_cart(&new_order))
        .expect("order created");

    assert_eq!(created.id, new_order.id);
    assert_eq!(created.status, OrderStatus::Pending);
    assert_eq!(created.stage, OrderStage::Received);
    assert_eq!(created.pricing.subtotal.cents(), 3300);
    assert_eq!(created.pricing.total.cents(), 3600);
    assert_eq!(created.estimated_minutes.get(), 33);
    assert_eq!(created.stage_updated_at, placed_at());
    let lines: Vec<_> = created
        .items
        .iter()
        .map(|item| (item.product_id, item.quantity.get(), item.line_total().cents()))
        .collect();
    assert_eq!(
        lines,
        vec![
            (Some(context.pizza.id), 2, 2500),
            (Some(context.salad.id), 1, 800)
        ]
    );
    assert_eq!(context.cart_size(), 0, "checkout empties the cart");

    let stored = context
        .runtime
        .block_on(context.orders.find(created.id))
        .expect("lookup succeeds")
        .expect("order persisted");
    assert_eq!(stored, created);
}

#[rstest]
fn failed_item_insert_leaves_no_order_behind(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: failed_item_insert_leaves_no_order_behind skipped");
        return;
    };
    context.fill_cart();
    let mut new_order = context.pending_order();
    new_order.items.push(OrderItem {
        product_id: Some(Uuid::new_v4()),
        name: String::from("Withdrawn special"),
        unit_price: Money::from_cents(999).expect("price"),
        quantity: Quantity::new(1).expect("quantity"),
    });

    let result = context
        .runtime
        .block_on(context.orders.create_from_cart(&new_order));

    assert!(
        matches!(result, Err(OrderRepositoryError::Query { .. })),
        "unknown product must fail the insert: {result:?}"
    );
    let stored = context
        .runtime
        .block_on(context.orders.find(new_order.id))
        .expect("lookup succeeds");
    assert!(stored.is_none(), "order row is rolled back");
    assert_eq!(context.cart_size(), 2, "cart survives the failed checkout");
}

#[rstest]
fn stage_changes_are_persisted(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: stage_changes_are_persisted skipped");
        return;
    };
    context.fill_cart();
    let created = context
        .runtime
        .block_on(context.orders.create_from_cart(&context.pending_order()))
        .expect("order created");
    let change = StageChange {
        stage: OrderStage::Preparing,
        status: OrderStatus::Confirmed,
        stage_updated_at: placed_at() + chrono::TimeDelta::minutes(6),
    };

    let updated = context
        .runtime
        .block_on(context.orders.update_stage(created.id, &change))
        .expect("update succeeds");
    assert!(updated);

    let stored = context
        .runtime
        .block_on(context.orders.find(created.id))
        .expect("lookup succeeds")
        .expect("order persisted");
    assert_eq!(stored.stage, OrderStage::Preparing);
    assert_eq!(stored.status, OrderStatus::Confirmed);
    assert_eq!(stored.stage_updated_at, change.stage_updated_at);
    assert_eq!(stored.created_at, placed_at());

    let missing = context
        .runtime
        .block_on(context.orders.update_stage(Uuid::new_v4(), &change))
        .expect("update succeeds");
    assert!(!missing, "unknown orders report nothing updated");
}

#[rstest]
fn categories_with_products_cannot_be_deleted(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: categories_with_products_cannot_be_deleted skipped");
        return;
    };

    let repository_result = context
        .runtime
        .block_on(context.catalogue.delete_category(context.category_id));
    assert!(matches!(
        repository_result,
        Err(CatalogueRepositoryError::CategoryInUse { category_id }) if category_id == context.category_id
    ));

    let service = CatalogueService::new(Arc::new(context.catalogue.clone()));
    let error = context
        .runtime
        .block_on(service.delete_category(context.category_id))
        .expect_err("category still has products");
    assert_eq!(error.code(), ErrorCode::Conflict);

    let categories = context
        .runtime
        .block_on(context.catalogue.list_categories())
        .expect("categories load");
    assert!(
        categories
            .iter()
            .any(|category| category.id == context.category_id),
        "category survives the refused delete"
    );
}
