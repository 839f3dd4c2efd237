//! Event Store
//!
//! In-memory order and visit histories, keyed by customer. Customers are registered the first
//! time they visit and are never removed, so iterating the customer slot map yields customers
//! in first-seen order.

use std::collections::BTreeMap;

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use slotmap::{SecondaryMap, SlotMap, new_key_type};
use thiserror::Error;
use tracing::warn;

use crate::ids::{CustomerId, OrderId};

new_key_type! {
    /// Customer Key
    pub struct CustomerKey;
}

/// A customer's visits, page id keyed by visit time.
pub type Visits = BTreeMap<DateTime, String>;

/// A customer's orders keyed by order id.
pub type Orders = FxHashMap<OrderId, Order>;

/// Errors raised when an event cannot be applied to the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The customer has never visited, so no order can be recorded for them.
    #[error("customer {0} has not visited the site")]
    UnknownCustomer(CustomerId),

    /// The customer already has a visit at this time.
    #[error("customer {customer} already has a visit at {timestamp}")]
    DuplicateVisit {
        /// Visiting customer
        customer: CustomerId,
        /// Time of the existing visit
        timestamp: DateTime,
    },

    /// The order being updated was never created for this customer.
    #[error("customer {customer} has no order {order}")]
    UnknownOrder {
        /// Customer named by the update
        customer: CustomerId,
        /// Order named by the update
        order: OrderId,
    },
}

/// A recorded order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    timestamp: DateTime,
    amount: Decimal,
}

impl Order {
    /// Creates a new order
    pub fn new(id: OrderId, timestamp: DateTime, amount: Decimal) -> Self {
        Self {
            id,
            timestamp,
            amount,
        }
    }

    /// Returns the order id
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Returns the time the order was placed or last updated
    pub fn timestamp(&self) -> DateTime {
        self.timestamp
    }

    /// Returns the order total
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Event Store
#[derive(Debug, Default)]
pub struct EventStore {
    customers: SlotMap<CustomerKey, CustomerId>,
    customer_keys: FxHashMap<CustomerId, CustomerKey>,
    visits: SecondaryMap<CustomerKey, Visits>,
    orders: SecondaryMap<CustomerKey, Orders>,
}

impl EventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a page visit, registering the customer on their first visit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateVisit`] if the customer already has a visit at `timestamp`.
    /// The existing visit is kept.
    pub fn record_visit(
        &mut self,
        customer: &CustomerId,
        timestamp: DateTime,
        page: impl Into<String>,
    ) -> Result<(), StoreError> {
        let seen = self
            .visits_by_id(customer)
            .is_some_and(|visits| visits.contains_key(&timestamp));

        if seen {
            return Err(StoreError::DuplicateVisit {
                customer: customer.clone(),
                timestamp,
            });
        }

        let key = self.register(customer);

        if let Some(entry) = self.visits.entry(key) {
            entry.or_default().insert(timestamp, page.into());
        }

        Ok(())
    }

    /// Record a new order.
    ///
    /// An order id that is already recorded for the customer is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownCustomer`] if the customer has never visited.
    pub fn create_order(
        &mut self,
        customer: &CustomerId,
        order: &OrderId,
        timestamp: DateTime,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        let key = self
            .key(customer)
            .ok_or_else(|| StoreError::UnknownCustomer(customer.clone()))?;

        let orders = self
            .orders
            .entry(key)
            .ok_or_else(|| StoreError::UnknownCustomer(customer.clone()))?
            .or_default();

        let previous = orders.insert(order.clone(), Order::new(order.clone(), timestamp, amount));

        if let Some(previous) = previous {
            warn!(
                customer = %customer,
                order = %previous.id,
                "new order replaced an existing order with the same id"
            );
        }

        Ok(())
    }

    /// Overwrite the time and amount of an existing order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownOrder`] if `order` was never created for the customer.
    pub fn update_order(
        &mut self,
        customer: &CustomerId,
        order: &OrderId,
        timestamp: DateTime,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        let existing = self
            .key(customer)
            .and_then(|key| self.orders.get_mut(key))
            .and_then(|orders| orders.get_mut(order))
            .ok_or_else(|| StoreError::UnknownOrder {
                customer: customer.clone(),
                order: order.clone(),
            })?;

        existing.timestamp = timestamp;
        existing.amount = amount;

        Ok(())
    }

    /// Visits recorded for a customer, or `None` if they have never visited.
    pub fn visits(&self, customer: &CustomerId) -> Option<&Visits> {
        self.visits_by_id(customer)
    }

    /// Orders recorded for a customer, or `None` if they have never ordered.
    pub fn orders(&self, customer: &CustomerId) -> Option<&Orders> {
        self.key(customer).and_then(|key| self.orders.get(key))
    }

    /// A single order recorded for a customer.
    pub fn order(&self, customer: &CustomerId, order: &OrderId) -> Option<&Order> {
        self.orders(customer).and_then(|orders| orders.get(order))
    }

    /// All customers that have visited, in the order they were first seen.
    pub fn customers(&self) -> impl Iterator<Item = &CustomerId> {
        self.customers.values()
    }

    /// Number of customers that have visited.
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Check if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    fn key(&self, customer: &CustomerId) -> Option<CustomerKey> {
        self.customer_keys.get(customer).copied()
    }

    fn visits_by_id(&self, customer: &CustomerId) -> Option<&Visits> {
        self.key(customer).and_then(|key| self.visits.get(key))
    }

    fn register(&mut self, customer: &CustomerId) -> CustomerKey {
        if let Some(key) = self.key(customer) {
            return key;
        }

        let key = self.customers.insert(customer.clone());
        self.customer_keys.insert(customer.clone(), key);

        key
    }
}
