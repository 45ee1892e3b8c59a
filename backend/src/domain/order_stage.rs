//! Time-based delivery stage derivation.
//!
//! An order's stage is a pure function of how much of its estimated time
//! has elapsed:
//!
//! | progress    | stage          |
//! |-------------|----------------|
//! | `<= 15%`    | `RECEIVED`     |
//! | `<= 50%`    | `PREPARING`    |
//! | `<= 65%`    | `READY`        |
//! | `<= 95%`    | `OUT_DELIVERY` |
//! | otherwise   | `DELIVERED`    |
//!
//! Completed and cancelled orders keep whatever stage they have. Progress is
//! compared in whole seconds with integer arithmetic so results never depend
//! on float rounding.

use std::num::NonZeroU32;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use super::order::{Order, OrderStage, OrderStatus, StageChange};

/// Strictly positive estimate of minutes from order to doorstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u32")]
pub struct EstimatedMinutes(NonZeroU32);

impl EstimatedMinutes {
    /// `None` for a zero estimate.
    pub fn new(minutes: u32) -> Option<Self> {
        NonZeroU32::new(minutes).map(Self)
    }

    /// Minutes.
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    fn as_seconds(self) -> u128 {
        u128::from(self.get()) * 60
    }
}

impl From<EstimatedMinutes> for u32 {
    fn from(value: EstimatedMinutes) -> Self {
        value.get()
    }
}

/// Inclusive upper bounds, as a percentage of the estimate.
const STAGE_CEILINGS: [(u128, OrderStage); 4] = [
    (15, OrderStage::Received),
    (50, OrderStage::Preparing),
    (65, OrderStage::Ready),
    (95, OrderStage::OutDelivery),
];

/// Percentage at which `stage` begins.
fn stage_floor(stage: OrderStage) -> u8 {
    STAGE_CEILINGS
        .iter()
        .take_while(|(_, earlier)| *earlier < stage)
        .last()
        .map_or(0, |(percent, _)| u8::try_from(*percent).unwrap_or(100))
}

fn elapsed_seconds(elapsed: TimeDelta) -> u128 {
    u128::try_from(elapsed.num_seconds().max(0)).unwrap_or(0)
}

/// Stage reached after `elapsed` of an `estimate`, ignoring status.
///
/// Negative durations (clock skew) count as zero.
///
/// # Examples
/// ```
/// use bistro::domain::{stage_for_elapsed, EstimatedMinutes, OrderStage};
/// use chrono::TimeDelta;
///
/// let estimate = EstimatedMinutes::new(20).expect("non-zero");
/// assert_eq!(stage_for_elapsed(TimeDelta::minutes(3), estimate), OrderStage::Received);
/// assert_eq!(stage_for_elapsed(TimeDelta::minutes(12), estimate), OrderStage::Ready);
/// assert_eq!(stage_for_elapsed(TimeDelta::minutes(20), estimate), OrderStage::Delivered);
/// ```
pub fn stage_for_elapsed(elapsed: TimeDelta, estimate: EstimatedMinutes) -> OrderStage {
    let scaled = elapsed_seconds(elapsed) * 100;
    let total = estimate.as_seconds();
    STAGE_CEILINGS
        .iter()
        .find(|(percent, _)| scaled <= percent * total)
        .map_or(OrderStage::Delivered, |(_, stage)| *stage)
}

/// Whole-number progress in `0..=100`.
pub fn progress_percent(elapsed: TimeDelta, estimate: EstimatedMinutes) -> u8 {
    let percent = (elapsed_seconds(elapsed) * 100) / estimate.as_seconds();
    u8::try_from(percent.min(100)).unwrap_or(100)
}

/// Stage an order should show, honouring frozen statuses.
pub fn derive_stage(
    status: OrderStatus,
    current: OrderStage,
    elapsed: TimeDelta,
    estimate: EstimatedMinutes,
) -> OrderStage {
    if status.freezes_stage() {
        current
    } else {
        stage_for_elapsed(elapsed, estimate)
    }
}

/// Re-derive `order`'s stage at `now`.
///
/// Returns the change to persist when the stage moved. Reaching
/// [`OrderStage::Delivered`] also completes the order. Applying the same
/// `now` twice yields no second change.
pub fn reevaluate(order: &Order, now: DateTime<Utc>) -> Option<StageChange> {
    let stage = derive_stage(
        order.status,
        order.stage,
        now - order.created_at,
        order.estimated_minutes,
    );
    if stage == order.stage {
        return None;
    }
    let status = if stage == OrderStage::Delivered {
        OrderStatus::Completed
    } else {
        order.status
    };
    Some(StageChange {
        stage,
        status,
        stage_updated_at: now,
    })
}

/// Apply a change to an in-memory order.
pub fn apply_change(order: &mut Order, change: StageChange) {
    order.stage = change.stage;
    order.status = change.status;
    order.stage_updated_at = change.stage_updated_at;
}

/// An order as shown to its reader, with progress at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOrder {
    pub order: Order,
    pub progress_percent: u8,
}

impl TrackedOrder {
    /// Measure progress of an already re-evaluated order at `now`.
    ///
    /// Delivered orders report 100. Other frozen orders report the point at
    /// which their stage begins, so a cancellation keeps the progress bar in
    /// step with the stage it stopped at.
    pub fn at(order: Order, now: DateTime<Utc>) -> Self {
        let percent = match order.stage {
            OrderStage::Delivered => 100,
            stage if order.status.freezes_stage() => stage_floor(stage),
            _ => progress_percent(now - order.created_at, order.estimated_minutes),
        };
        Self {
            order,
            progress_percent: percent,
        }
    }
}

#[cfg(test)]
#[path = "order_stage_tests.rs"]
mod tests;
