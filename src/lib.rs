//! Customer LTV
//!
//! Ingests customer site visits and orders, and derives per-customer spend, visit frequency and
//! a simple projected lifetime value, culminating in a ranking of the highest-value customers.

pub mod engine;
pub mod events;
pub mod fixtures;
pub mod ids;
pub mod ingest;
pub mod metrics;
pub mod prelude;
pub mod ranking;
pub mod report;
pub mod store;
