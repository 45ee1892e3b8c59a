//! Order tracking and administration.
//!
//! Every read runs the stage calculator and persists a moved stage before
//! answering. A failed write is logged and the freshly derived stage is
//! returned anyway; the next read retries.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::checkout_service::map_order_error;
use crate::domain::order_stage::{apply_change, reevaluate};
use crate::domain::ports::{OrderAdministration, OrderRepository, OrderTracking};
use crate::domain::{
    Error, Order, OrderFilter, OrderStage, OrderStatus, StageChange, TrackedOrder, UserId,
};

/// Order service implementing the tracking and administration ports.
#[derive(Clone)]
pub struct OrderService<O> {
    orders: Arc<O>,
    clock: Arc<dyn Clock>,
}

impl<O> OrderService<O> {
    /// Create a service over an order repository.
    pub fn new(orders: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self { orders, clock }
    }
}

impl<O> OrderService<O>
where
    O: OrderRepository,
{
    async fn refresh(&self, mut order: Order) -> TrackedOrder {
        let now = self.clock.utc();
        if let Some(change) = reevaluate(&order, now) {
            if let Err(error) = self.orders.update_stage(order.id, &change).await {
                tracing::warn!(
                    %error,
                    order_id = %order.id,
                    stage = %change.stage,
                    "stage not persisted"
                );
            } else {
                tracing::debug!(order_id = %order.id, stage = %change.stage, "stage advanced");
            }
            apply_change(&mut order, change);
        }
        TrackedOrder::at(order, now)
    }

    async fn refresh_all(&self, orders: Vec<Order>) -> Vec<TrackedOrder> {
        let mut tracked = Vec::with_capacity(orders.len());
        for order in orders {
            tracked.push(self.refresh(order).await);
        }
        tracked
    }

    async fn find(&self, id: Uuid) -> Result<Order, Error> {
        self.orders
            .find(id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))
    }

    async fn find_owned(&self, user_id: &UserId, id: Uuid) -> Result<Order, Error> {
        let order = self.find(id).await?;
        if order.user_id != *user_id {
            return Err(Error::not_found(format!("order {id} not found")));
        }
        Ok(order)
    }

    async fn store(&self, mut order: Order, change: StageChange) -> Result<TrackedOrder, Error> {
        let updated = self
            .orders
            .update_stage(order.id, &change)
            .await
            .map_err(map_order_error)?;
        if !updated {
            return Err(Error::not_found(format!("order {} not found", order.id)));
        }
        apply_change(&mut order, change);
        Ok(TrackedOrder::at(order, change.stage_updated_at))
    }
}

#[async_trait]
impl<O> OrderTracking for OrderService<O>
where
    O: OrderRepository,
{
    async fn my_orders(&self, user_id: &UserId) -> Result<Vec<TrackedOrder>, Error> {
        let orders = self
            .orders
            .list_for_user(user_id)
            .await
            .map_err(map_order_error)?;
        Ok(self.refresh_all(orders).await)
    }

    async fn my_order(&self, user_id: &UserId, id: Uuid) -> Result<TrackedOrder, Error> {
        let order = self.find_owned(user_id, id).await?;
        Ok(self.refresh(order).await)
    }

    async fn cancel(&self, user_id: &UserId, id: Uuid) -> Result<TrackedOrder, Error> {
        let current = self.refresh(self.find_owned(user_id, id).await?).await.order;
        let cancellable = matches!(current.status, OrderStatus::Pending | OrderStatus::Confirmed)
            && current.stage == OrderStage::Received;
        if !cancellable {
            return Err(Error::conflict(format!(
                "order {id} can no longer be cancelled ({} / {})",
                current.status, current.stage
            )));
        }
        let change = StageChange {
            stage: current.stage,
            status: OrderStatus::Cancelled,
            stage_updated_at: self.clock.utc(),
        };
        let cancelled = self.store(current, change).await?;
        tracing::info!(order_id = %id, "order cancelled by customer");
        Ok(cancelled)
    }
}

#[async_trait]
impl<O> OrderAdministration for OrderService<O>
where
    O: OrderRepository,
{
    async fn list_orders(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<TrackedOrder>, Error> {
        let listed = self
            .orders
            .list(filter, page)
            .await
            .map_err(map_order_error)?;
        let Page {
            items,
            total,
            page: number,
            limit,
            total_pages,
        } = listed;
        Ok(Page {
            items: self.refresh_all(items).await,
            total,
            page: number,
            limit,
            total_pages,
        })
    }

    async fn order(&self, id: Uuid) -> Result<TrackedOrder, Error> {
        let order = self.find(id).await?;
        Ok(self.refresh(order).await)
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<TrackedOrder, Error> {
        let current = self.refresh(self.find(id).await?).await.order;
        let stage = if status == OrderStatus::Completed {
            OrderStage::Delivered
        } else {
            current.stage
        };
        let change = StageChange {
            stage,
            status,
            stage_updated_at: self.clock.utc(),
        };
        let updated = self.store(current, change).await?;
        tracing::info!(order_id = %id, %status, "order status set by admin");
        Ok(updated)
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), Error> {
        let deleted = self.orders.delete(id).await.map_err(map_order_error)?;
        deleted
            .then_some(())
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
