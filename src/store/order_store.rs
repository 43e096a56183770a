use std::collections::HashSet;

use anyhow::Result;
use serde::Serialize;

use crate::models::{NewOrder, Order, StageTable};
use crate::store::KeyValueStorage;
use crate::tracking::calculator::{self, StageSnapshot};
use crate::utils::Clock;

/// Storage key holding the JSON array of orders
pub const ORDERS_KEY: &str = "orders";

/// Result of reading the persisted order list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing persisted yet
    Missing,
    Loaded { count: usize },
    /// Persisted content was unreadable; storage was cleared and the store emptied
    Recovered { error: String },
}

/// Stage transition of a single order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub order_id: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecomputeOutcome {
    NotFound,
    Unchanged,
    Changed(StatusChange),
}

/// Owner of the order collection.
///
/// Every mutation updates the in-memory list first and then rewrites the whole
/// list under [`ORDERS_KEY`]. Write failures are logged and do not roll back
/// the in-memory state.
pub struct OrderStore<S, C> {
    storage: S,
    clock: C,
    stages: StageTable,
    orders: Vec<Order>,
}

impl<S: KeyValueStorage, C: Clock> OrderStore<S, C> {
    /// Empty store; call [`OrderStore::load`] to read persisted orders
    pub fn new(storage: S, clock: C, stages: StageTable) -> Self {
        Self {
            storage,
            clock,
            stages,
            orders: Vec::new(),
        }
    }

    /// Create a store and load the persisted orders
    pub fn open(storage: S, clock: C, stages: StageTable) -> Result<(Self, LoadOutcome)> {
        let mut store = Self::new(storage, clock, stages);
        let outcome = store.load()?;
        Ok((store, outcome))
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// Unparseable content clears the key and empties the store instead of failing.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        let Some(raw) = self.storage.get(ORDERS_KEY)? else {
            self.orders.clear();
            return Ok(LoadOutcome::Missing);
        };

        match serde_json::from_str::<Option<Vec<Order>>>(&raw) {
            Ok(orders) => {
                self.orders = orders.unwrap_or_default();
                log::debug!("Loaded {} orders", self.orders.len());
                Ok(LoadOutcome::Loaded { count: self.orders.len() })
            }
            Err(e) => {
                log::warn!("Error loading orders, resetting store: {}", e);
                if let Err(remove_err) = self.storage.remove(ORDERS_KEY) {
                    log::error!("Failed to clear corrupt orders: {:#}", remove_err);
                }
                self.orders.clear();
                Ok(LoadOutcome::Recovered { error: e.to_string() })
            }
        }
    }

    /// Add orders, assigning ids, creation time and the first stage.
    ///
    /// Inputs whose id is already stored (or repeated within `new_orders`) are
    /// dropped. Returns the ids actually added; nothing is written when that is empty.
    pub fn add(&mut self, new_orders: Vec<NewOrder>) -> Vec<String> {
        let now = self.clock.now_ms();
        let initial = self.stages.first().name.clone();

        let mut seen: HashSet<String> = self.orders.iter().map(|o| o.id.clone()).collect();
        let mut unique = Vec::new();
        for new_order in new_orders {
            let order = new_order.into_order(now, &initial);
            if seen.insert(order.id.clone()) {
                unique.push(order);
            } else {
                log::debug!("Skipping duplicate order {}", order.id);
            }
        }

        if unique.is_empty() {
            return Vec::new();
        }

        let added: Vec<String> = unique.iter().map(|o| o.id.clone()).collect();
        self.orders.extend(unique);
        self.persist();
        log::info!("Added {} order(s)", added.len());
        added
    }

    /// Re-derive one order's status from elapsed time.
    ///
    /// The order is only touched when its stage changed; the full list is
    /// written either way.
    pub fn recompute_status(&mut self, order_id: &str) -> RecomputeOutcome {
        let now = self.clock.now_ms();
        let outcome = match self.orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => match apply_stage(&self.stages, order, now) {
                Some(change) => RecomputeOutcome::Changed(change),
                None => RecomputeOutcome::Unchanged,
            },
            None => RecomputeOutcome::NotFound,
        };
        self.persist();
        outcome
    }

    /// Re-derive every order's status. Returns one change per order whose stage
    /// moved and writes only when there is at least one.
    pub fn recompute_all(&mut self) -> Vec<StatusChange> {
        let now = self.clock.now_ms();
        let changes: Vec<StatusChange> = self
            .orders
            .iter_mut()
            .filter_map(|order| apply_stage(&self.stages, order, now))
            .collect();

        if !changes.is_empty() {
            for change in &changes {
                log::info!("Order {}: {} -> {}", change.order_id, change.from, change.to);
            }
            self.persist();
        }
        changes
    }

    /// Remove an order. Returns whether it existed; the remainder is written regardless.
    pub fn delete(&mut self, order_id: &str) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.id != order_id);
        let removed = self.orders.len() != before;
        self.persist();
        if removed {
            log::info!("Deleted order {}", order_id);
        }
        removed
    }

    /// Drop every order and the persisted key
    pub fn reset(&mut self) {
        self.orders.clear();
        if let Err(e) = self.storage.remove(ORDERS_KEY) {
            log::error!("Failed to clear orders: {:#}", e);
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn stages(&self) -> &StageTable {
        &self.stages
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Calculator output for an order at the clock's current time
    pub fn snapshot(&self, order_id: &str) -> Option<StageSnapshot> {
        let order = self.get(order_id)?;
        Some(calculator::snapshot(&self.stages, order.timestamp, self.clock.now_ms()))
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.orders)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.storage.set(ORDERS_KEY, &json));
        if let Err(e) = result {
            log::error!("Failed to persist orders: {:#}", e);
        }
    }
}

/// Move `order` to the stage derived at `now_ms`, if different from its status
fn apply_stage(stages: &StageTable, order: &mut Order, now_ms: i64) -> Option<StatusChange> {
    let stage = calculator::current_stage(stages, now_ms.saturating_sub(order.timestamp));
    if order.status == stage.name {
        return None;
    }
    let change = StatusChange {
        order_id: order.id.clone(),
        from: order.status.clone(),
        to: stage.name.clone(),
    };
    order.set_status(&stage.name);
    Some(change)
}
