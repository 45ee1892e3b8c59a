//! PostgreSQL-backed `CartRepository`.
//!
//! A cart is simply the set of `cart_items` rows for a user, so it exists as
//! soon as the first line is written.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CartRepository, CartRepositoryError};
use crate::domain::{Cart, Quantity, UserId};

use super::diesel_basic_error_mapping::{basic, classify, pool_message};
use super::models::{NewCartItemRow, ProductRow};
use super::pool::{DbPool, PoolError};
use super::schema::{cart_items, products};

/// Diesel implementation of [`CartRepository`].
#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CartRepositoryError {
    CartRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> CartRepositoryError {
    basic(
        classify(error),
        CartRepositoryError::connection,
        CartRepositoryError::query,
    )
}

#[async_trait]
impl CartRepository for DieselCartRepository {
    async fn load(&self, user_id: &UserId) -> Result<Cart, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::user_id.eq(*user_id.as_uuid()))
            .order((cart_items::added_at.asc(), cart_items::product_id.asc()))
            .select((cart_items::quantity, ProductRow::as_select()))
            .load::<(i32, ProductRow)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let lines = rows
            .into_iter()
            .map(|(quantity, product)| product.into_cart_line(quantity))
            .collect::<Result<Vec<_>, _>>()
            .map_err(CartRepositoryError::query)?;
        Ok(Cart::new(lines))
    }

    async fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: Uuid,
        quantity: Quantity,
    ) -> Result<(), CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCartItemRow {
            user_id: *user_id.as_uuid(),
            product_id,
            quantity: i32::try_from(quantity.get()).unwrap_or(i32::MAX),
        };
        diesel::insert_into(cart_items::table)
            .values(&row)
            .on_conflict((cart_items::user_id, cart_items::product_id))
            .do_update()
            .set(cart_items::quantity.eq(excluded(cart_items::quantity)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn remove(&self, user_id: &UserId, product_id: Uuid) -> Result<bool, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::user_id.eq(*user_id.as_uuid()))
                .filter(cart_items::product_id.eq(product_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn clear(&self, user_id: &UserId) -> Result<(), CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(cart_items::table.filter(cart_items::user_id.eq(*user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
