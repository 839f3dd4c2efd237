//! Customer LTV prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    engine::{ConfigError, DEFAULT_LIFESPAN_YEARS, Engine, EngineConfig},
    events::{Event, EventRecord, OrderAction, OrderEvent, ParseError, SiteVisit},
    fixtures::{FixtureError, load_events},
    ids::{CustomerId, OrderId},
    ingest::IngestError,
    metrics::MetricError,
    ranking::CustomerValue,
    report::{ReportError, write_ranking},
    store::{EventStore, Order, StoreError},
};
