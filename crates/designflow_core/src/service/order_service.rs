//! Order snapshot store.
//!
//! # Responsibility
//! - Record order versions and serve them by number or latest.
//!
//! # Invariants
//! - Never touches projects or tasks.
//! - Each call to `create_version` appends exactly one immutable version.

use crate::clock::Clock;
use crate::model::order::{ClientInfo, OrderId, OrderItem, OrderSnapshot};
use crate::repo::error::EntityRef;
use crate::repo::order_repo::OrderSnapshotRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::ServiceContext;
use log::info;

/// Use-case facade over the order snapshot repository.
pub struct OrderSnapshotStore<'a> {
    orders: &'a dyn OrderSnapshotRepository,
    clock: &'a dyn Clock,
}

impl<'a> OrderSnapshotStore<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self {
            orders: ctx.orders,
            clock: ctx.clock,
        }
    }

    /// Stores `items` as the next version of `order_id`.
    pub fn create_version(
        &self,
        order_id: OrderId,
        client: &ClientInfo,
        items: &[OrderItem],
    ) -> ServiceResult<OrderSnapshot> {
        let snapshot =
            self.orders
                .insert_next_version(order_id, client, items, self.clock.now_ms())?;
        info!(
            "event=order_version_created module=orders status=ok order={} version={} items={}",
            order_id,
            snapshot.version_number,
            snapshot.items.len()
        );
        Ok(snapshot)
    }

    pub fn get_latest_version(&self, order_id: OrderId) -> ServiceResult<OrderSnapshot> {
        self.orders
            .get_latest_version(order_id)?
            .ok_or(ServiceError::NotFound(EntityRef::Order(order_id)))
    }

    pub fn get_version(
        &self,
        order_id: OrderId,
        version_number: u32,
    ) -> ServiceResult<OrderSnapshot> {
        self.orders
            .get_version(order_id, version_number)?
            .ok_or(ServiceError::NotFound(EntityRef::OrderVersion {
                order_id,
                version_number,
            }))
    }

    /// Latest version when `version_number` is `None`.
    pub fn resolve_version(
        &self,
        order_id: OrderId,
        version_number: Option<u32>,
    ) -> ServiceResult<OrderSnapshot> {
        match version_number {
            Some(version_number) => self.get_version(order_id, version_number),
            None => self.get_latest_version(order_id),
        }
    }

    /// All versions ascending; empty when the order has none.
    pub fn list_versions(&self, order_id: OrderId) -> ServiceResult<Vec<OrderSnapshot>> {
        Ok(self.orders.list_versions(order_id)?)
    }
}
