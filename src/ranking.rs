//! Ranking

use rust_decimal::Decimal;

use crate::{
    ids::CustomerId,
    metrics::{MetricError, simple_ltv},
    store::EventStore,
};

/// A customer and their simple lifetime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerValue {
    /// Customer
    pub customer: CustomerId,

    /// Simple lifetime value
    pub ltv: Decimal,
}

/// The `top` customers by simple lifetime value, highest first.
///
/// Every customer that has visited is ranked. Customers with equal values keep the order in
/// which they were first seen. Fewer than `top` entries are returned when fewer customers exist.
///
/// # Errors
///
/// Returns the first [`MetricError`] raised while computing a customer's lifetime value.
pub fn top_ltv_customers(
    store: &EventStore,
    top: usize,
    lifespan_years: Decimal,
) -> Result<Vec<CustomerValue>, MetricError> {
    let mut ranked = store
        .customers()
        .map(|customer| {
            simple_ltv(store, customer, lifespan_years).map(|ltv| CustomerValue {
                customer: customer.clone(),
                ltv,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Stable, so ties stay in first-seen order.
    ranked.sort_by(|a, b| b.ltv.cmp(&a.ltv));
    ranked.truncate(top);

    Ok(ranked)
}
