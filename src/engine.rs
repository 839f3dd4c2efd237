//! Engine
//!
//! Owns the event store together with the configured customer lifespan, and exposes ingestion,
//! metrics and ranking over them.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    events::EventRecord,
    ids::CustomerId,
    ingest::{self, IngestError},
    metrics::{self, MetricError},
    ranking::{self, CustomerValue},
    store::EventStore,
};

/// Default assumed customer lifespan, in years.
pub const DEFAULT_LIFESPAN_YEARS: u32 = 10;

/// Engine configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The customer lifespan must be greater than zero.
    #[error("customer lifespan must be positive, got {0} years")]
    NonPositiveLifespan(Decimal),
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    lifespan_years: Decimal,
}

impl EngineConfig {
    /// Creates a configuration with the given average customer lifespan.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveLifespan`] if `lifespan_years` is zero or negative.
    pub fn new(lifespan_years: Decimal) -> Result<Self, ConfigError> {
        if lifespan_years <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveLifespan(lifespan_years));
        }

        Ok(Self { lifespan_years })
    }

    /// Returns the average customer lifespan in years
    pub fn lifespan_years(&self) -> Decimal {
        self.lifespan_years
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lifespan_years: Decimal::from(DEFAULT_LIFESPAN_YEARS),
        }
    }
}

/// Customer lifetime value engine.
#[derive(Debug, Default)]
pub struct Engine {
    store: EventStore,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with an empty store.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: EventStore::new(),
            config,
        }
    }

    /// Returns the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the current event store snapshot
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Ingest a single event record.
    ///
    /// # Errors
    ///
    /// See [`ingest::ingest`].
    pub fn ingest(&mut self, record: &EventRecord) -> Result<(), IngestError> {
        ingest::ingest(&mut self.store, record)
    }

    /// Ingest event records in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`ingest::parse_events`].
    pub fn parse_events<'r>(
        &mut self,
        records: impl IntoIterator<Item = &'r EventRecord>,
    ) -> Result<usize, IngestError> {
        ingest::parse_events(&mut self.store, records)
    }

    /// Total spend across the customer's current orders; zero if they have none.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::Overflow`] if the sum cannot be represented.
    pub fn total_expense(&self, customer: &CustomerId) -> Result<Decimal, MetricError> {
        metrics::total_expense(&self.store, customer)
    }

    /// Number of visits recorded for the customer.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::UnknownCustomer`] if the customer has never visited.
    pub fn total_visits(&self, customer: &CustomerId) -> Result<usize, MetricError> {
        metrics::total_visits(&self.store, customer)
    }

    /// See [`metrics::average_expense_per_visit`].
    ///
    /// # Errors
    ///
    /// See [`metrics::average_expense_per_visit`].
    pub fn average_expense_per_visit(&self, customer: &CustomerId) -> Result<Decimal, MetricError> {
        metrics::average_expense_per_visit(&self.store, customer)
    }

    /// Distinct visiting weeks, see [`metrics::unique_weeks`].
    pub fn unique_weeks(&self, customer: &CustomerId) -> BTreeSet<i16> {
        metrics::unique_weeks(&self.store, customer)
    }

    /// See [`metrics::average_visits_per_week`].
    ///
    /// # Errors
    ///
    /// See [`metrics::average_visits_per_week`].
    pub fn average_visits_per_week(&self, customer: &CustomerId) -> Result<usize, MetricError> {
        metrics::average_visits_per_week(&self.store, customer)
    }

    /// See [`metrics::average_customer_value_per_week`].
    ///
    /// # Errors
    ///
    /// See [`metrics::average_customer_value_per_week`].
    pub fn average_customer_value_per_week(
        &self,
        customer: &CustomerId,
    ) -> Result<Decimal, MetricError> {
        metrics::average_customer_value_per_week(&self.store, customer)
    }

    /// Simple lifetime value using the configured lifespan.
    ///
    /// # Errors
    ///
    /// See [`metrics::simple_ltv`].
    pub fn simple_ltv(&self, customer: &CustomerId) -> Result<Decimal, MetricError> {
        metrics::simple_ltv(&self.store, customer, self.config.lifespan_years)
    }

    /// Top customers by simple lifetime value, using the configured lifespan.
    ///
    /// # Errors
    ///
    /// See [`ranking::top_ltv_customers`].
    pub fn top_ltv_customers(&self, top: usize) -> Result<Vec<CustomerValue>, MetricError> {
        ranking::top_ltv_customers(&self.store, top, self.config.lifespan_years)
    }
}
