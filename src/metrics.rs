//! Metrics
//!
//! Read-only customer metrics derived from the event store.
//!
//! `total_expense` treats a customer without orders as having spent nothing, while
//! `total_visits` (and everything derived from it) fails for a customer who has never
//! visited. Both behaviours are relied on by callers and are kept distinct.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{events::week_of_year, ids::CustomerId, store::EventStore};

/// Weeks in a year used to annualise weekly customer value.
pub const WEEKS_PER_YEAR: u32 = 52;

/// Errors that can occur while computing a metric.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricError {
    /// The customer has no visit history.
    #[error("customer {0} has not visited the site")]
    UnknownCustomer(CustomerId),

    /// The metric divides by a visit or week count of zero.
    #[error("customer {0} has no visits to average over")]
    DivisionByZero(CustomerId),

    /// Decimal arithmetic overflowed.
    #[error("metric for customer {0} overflowed")]
    Overflow(CustomerId),
}

/// Sum of the current amounts of all the customer's orders.
///
/// A customer without orders has spent zero.
///
/// # Errors
///
/// Returns [`MetricError::Overflow`] if the sum cannot be represented.
pub fn total_expense(store: &EventStore, customer: &CustomerId) -> Result<Decimal, MetricError> {
    let Some(orders) = store.orders(customer) else {
        return Ok(Decimal::ZERO);
    };

    orders
        .values()
        .try_fold(Decimal::ZERO, |acc, order| acc.checked_add(order.amount()))
        .ok_or_else(|| MetricError::Overflow(customer.clone()))
}

/// Number of recorded visits for the customer.
///
/// # Errors
///
/// Returns [`MetricError::UnknownCustomer`] if the customer has never visited.
pub fn total_visits(store: &EventStore, customer: &CustomerId) -> Result<usize, MetricError> {
    store
        .visits(customer)
        .map(BTreeMap::len)
        .ok_or_else(|| MetricError::UnknownCustomer(customer.clone()))
}

/// Average amount spent per visit.
///
/// # Errors
///
/// - [`MetricError::UnknownCustomer`]: the customer has never visited.
/// - [`MetricError::DivisionByZero`]: the customer has no visits.
/// - [`MetricError::Overflow`]: decimal arithmetic overflowed.
pub fn average_expense_per_visit(
    store: &EventStore,
    customer: &CustomerId,
) -> Result<Decimal, MetricError> {
    let visits = total_visits(store, customer)?;
    let expense = total_expense(store, customer)?;

    if visits == 0 {
        return Err(MetricError::DivisionByZero(customer.clone()));
    }

    expense
        .checked_div(Decimal::from(visits))
        .ok_or_else(|| MetricError::Overflow(customer.clone()))
}

/// Distinct Sunday-based week numbers in which the customer visited.
///
/// Empty for a customer who has never visited.
pub fn unique_weeks(store: &EventStore, customer: &CustomerId) -> BTreeSet<i16> {
    store
        .visits(customer)
        .map(|visits| visits.keys().map(|time| week_of_year(*time)).collect())
        .unwrap_or_default()
}

/// Visits per distinct visiting week, rounded up.
///
/// # Errors
///
/// - [`MetricError::UnknownCustomer`]: the customer has never visited.
/// - [`MetricError::DivisionByZero`]: the customer has no visiting weeks.
pub fn average_visits_per_week(
    store: &EventStore,
    customer: &CustomerId,
) -> Result<usize, MetricError> {
    let visits = total_visits(store, customer)?;
    let weeks = unique_weeks(store, customer).len();

    if weeks == 0 {
        return Err(MetricError::DivisionByZero(customer.clone()));
    }

    Ok(visits.div_ceil(weeks))
}

/// Expected spend per week: visits per week times spend per visit.
///
/// # Errors
///
/// Returns any error from [`average_visits_per_week`] or [`average_expense_per_visit`].
pub fn average_customer_value_per_week(
    store: &EventStore,
    customer: &CustomerId,
) -> Result<Decimal, MetricError> {
    let visits_per_week = average_visits_per_week(store, customer)?;
    let expense_per_visit = average_expense_per_visit(store, customer)?;

    Decimal::from(visits_per_week)
        .checked_mul(expense_per_visit)
        .ok_or_else(|| MetricError::Overflow(customer.clone()))
}

/// Simple lifetime value: weekly value projected over `lifespan_years` years.
///
/// # Errors
///
/// Returns any error from [`average_customer_value_per_week`], or
/// [`MetricError::Overflow`] if the projection cannot be represented.
pub fn simple_ltv(
    store: &EventStore,
    customer: &CustomerId,
    lifespan_years: Decimal,
) -> Result<Decimal, MetricError> {
    let weekly = average_customer_value_per_week(store, customer)?;

    weekly
        .checked_mul(Decimal::from(WEEKS_PER_YEAR))
        .and_then(|yearly| yearly.checked_mul(lifespan_years))
        .ok_or_else(|| MetricError::Overflow(customer.clone()))
}

#[cfg(test)]
mod tests {
    use jiff::civil::{DateTime, date};
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;
    use crate::ids::OrderId;

    fn at(month: i8, day: i8) -> DateTime {
        date(2017, month, day).at(12, 0, 0, 0)
    }

    fn customer(id: &str) -> CustomerId {
        CustomerId::from(id)
    }

    /// Two visits in different weeks and one order of 12.34.
    fn scenario() -> Result<EventStore, crate::store::StoreError> {
        let mut store = EventStore::new();

        store.record_visit(&customer("1"), at(1, 1), "ac05e815502f")?;
        store.record_visit(&customer("1"), at(1, 14), "ac05e815502f")?;
        store.create_order(&customer("1"), &OrderId::from("68d84e5d1a43"), at(1, 6), dec!(12.34))?;

        Ok(store)
    }

    #[test]
    fn expense_defaults_to_zero_without_orders() -> TestResult {
        let mut store = EventStore::new();
        store.record_visit(&customer("1"), at(1, 1), "home")?;

        assert_eq!(total_expense(&store, &customer("1"))?, Decimal::ZERO);
        assert_eq!(total_expense(&store, &customer("nobody"))?, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn expense_sums_current_amounts() -> TestResult {
        let mut store = scenario()?;
        store.create_order(&customer("1"), &OrderId::from("o2"), at(1, 7), dec!(5))?;
        store.update_order(&customer("1"), &OrderId::from("o2"), at(1, 8), dec!(7.66))?;

        let first = total_expense(&store, &customer("1"))?;
        let second = total_expense(&store, &customer("1"))?;

        assert_eq!(first, dec!(20.00));
        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn visits_fail_for_unknown_customer() {
        let store = EventStore::new();

        assert_eq!(
            total_visits(&store, &customer("1")),
            Err(MetricError::UnknownCustomer(customer("1")))
        );
    }

    #[test]
    fn unique_weeks_for_unknown_customer_is_empty() {
        let store = EventStore::new();

        assert!(unique_weeks(&store, &customer("1")).is_empty());
    }

    #[test]
    fn derived_metrics_fail_for_unknown_customer() {
        let store = EventStore::new();
        let unknown = Err(MetricError::UnknownCustomer(customer("1")));

        assert_eq!(average_expense_per_visit(&store, &customer("1")), unknown);
        assert_eq!(
            average_customer_value_per_week(&store, &customer("1")),
            unknown
        );
        assert_eq!(simple_ltv(&store, &customer("1"), dec!(10)), unknown);
    }

    #[test]
    fn scenario_metrics() -> TestResult {
        let store = scenario()?;
        let id = customer("1");

        assert_eq!(total_visits(&store, &id)?, 2);
        assert_eq!(total_expense(&store, &id)?, dec!(12.34));
        assert_eq!(unique_weeks(&store, &id), BTreeSet::from([1, 2]));
        assert_eq!(average_visits_per_week(&store, &id)?, 1);
        assert_eq!(average_expense_per_visit(&store, &id)?, dec!(6.17));
        assert_eq!(average_customer_value_per_week(&store, &id)?, dec!(6.17));
        assert_eq!(simple_ltv(&store, &id, dec!(10))?, dec!(3208.4));

        Ok(())
    }

    #[test]
    fn visits_per_week_rounds_up() -> TestResult {
        let mut store = EventStore::new();
        let id = customer("1");

        // Three visits across two weeks.
        for (month, day) in [(1, 1), (1, 2), (1, 9)] {
            store.record_visit(&id, at(month, day), "home")?;
        }

        assert_eq!(unique_weeks(&store, &id).len(), 2);
        assert_eq!(average_visits_per_week(&store, &id)?, 2);

        Ok(())
    }

    #[test]
    fn ltv_scales_with_lifespan() -> TestResult {
        let store = scenario()?;

        assert_eq!(simple_ltv(&store, &customer("1"), dec!(1))?, dec!(320.84));
        assert_eq!(simple_ltv(&store, &customer("1"), dec!(2.5))?, dec!(802.1));

        Ok(())
    }
}
