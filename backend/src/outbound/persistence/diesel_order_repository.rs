//! PostgreSQL-backed `OrderRepository`.
//!
//! Orders and their item snapshots live in separate tables; items are loaded
//! in one extra query per listing and regrouped with `belonging_to`.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{NewOrder, Order, OrderFilter, OrderStage, StageChange, UserId};

use super::diesel_basic_error_mapping::{basic, classify, count_to_total, pool_message};
use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::{cart_items, order_items, orders};

/// Diesel implementation of [`OrderRepository`].
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    OrderRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    basic(
        classify(error),
        OrderRepositoryError::connection,
        OrderRepositoryError::query,
    )
}

fn order_row(order: &NewOrder) -> NewOrderRow<'_> {
    NewOrderRow {
        id: order.id,
        user_id: *order.user_id.as_uuid(),
        status: order.status.as_str(),
        stage: OrderStage::Received.as_str(),
        payment_method: order.payment_method.as_str(),
        payment_status: order.payment_status.as_str(),
        paypal_order_id: order.paypal_order_id.as_deref(),
        subtotal_cents: order.pricing.subtotal.cents(),
        delivery_fee_cents: order.pricing.delivery_fee.cents(),
        total_cents: order.pricing.total.cents(),
        delivery_address: &order.delivery.address,
        phone: &order.delivery.phone,
        notes: order.delivery.notes.as_deref(),
        estimated_minutes: i32::try_from(order.estimated_minutes.get()).unwrap_or(i32::MAX),
        created_at: order.created_at,
        stage_updated_at: order.created_at,
    }
}

fn item_rows(order: &NewOrder) -> Vec<NewOrderItemRow<'_>> {
    order
        .items
        .iter()
        .map(|item| NewOrderItemRow {
            order_id: order.id,
            product_id: item.product_id,
            name: &item.name,
            unit_price_cents: item.unit_price.cents(),
            quantity: i32::try_from(item.quantity.get()).unwrap_or(i32::MAX),
        })
        .collect()
}

fn filtered(filter: OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    query
}

/// Attach item snapshots to each order row, preserving row order.
async fn with_items(
    conn: &mut AsyncPgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, OrderRepositoryError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::id.asc())
        .load::<OrderItemRow>(conn)
        .await
        .map_err(map_diesel_error)?;
    items
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(items, row)| row.into_domain(items).map_err(OrderRepositoryError::query))
        .collect()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn create_from_cart(&self, order: &NewOrder) -> Result<Order, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (row, items) = conn
            .transaction(|conn| {
                async move {
                    let row = diesel::insert_into(orders::table)
                        .values(&order_row(order))
                        .returning(OrderRow::as_returning())
                        .get_result::<OrderRow>(conn)
                        .await?;
                    let items = diesel::insert_into(order_items::table)
                        .values(&item_rows(order))
                        .returning(OrderItemRow::as_returning())
                        .get_results::<OrderItemRow>(conn)
                        .await?;
                    diesel::delete(
                        cart_items::table.filter(cart_items::user_id.eq(*order.user_id.as_uuid())),
                    )
                    .execute(conn)
                    .await?;
                    Ok::<_, diesel::result::Error>((row, items))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        row.into_domain(items).map_err(OrderRepositoryError::query)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = orders::table
            .filter(orders::user_id.eq(*user_id.as_uuid()))
            .select(OrderRow::as_select())
            .order((orders::created_at.desc(), orders::id.asc()))
            .load::<OrderRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        with_items(&mut conn, rows).await
    }

    async fn list(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = filtered(filter)
            .select(OrderRow::as_select())
            .order((orders::created_at.desc(), orders::id.asc()))
            .limit(page.limit_i64())
            .offset(page.offset())
            .load::<OrderRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = with_items(&mut conn, rows).await?;
        Ok(Page::new(items, count_to_total(total), page))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(with_items(&mut conn, vec![row]).await?.pop())
    }

    async fn update_stage(
        &self,
        id: Uuid,
        change: &StageChange,
    ) -> Result<bool, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(orders::table.find(id))
            .set((
                orders::stage.eq(change.stage.as_str()),
                orders::status.eq(change.status.as_str()),
                orders::stage_updated_at.eq(change.stage_updated_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Items go with the order through ON DELETE CASCADE.
        let deleted = diesel::delete(orders::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
