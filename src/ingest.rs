//! Ingestion
//!
//! Routes raw event records to the event store. Records are applied one at a time, in the
//! order given, and the first failing record aborts the rest of a batch.

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    events::{
        Event, EventRecord, ORDER, OrderAction, OrderEvent, ParseError, SITE_VISIT, SiteVisit,
        parse_amount, parse_event_time,
    },
    ids::{CustomerId, OrderId},
    store::{EventStore, StoreError},
};

/// Errors that can occur while ingesting an event record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// An order event carried an action other than `NEW` or `UPDATE`.
    #[error("order event has unrecognized action: {0}")]
    UnrecognizedAction(String),

    /// A field of the record could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The event could not be applied to the store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convert a raw record into a typed event.
///
/// Returns `Ok(None)` for event types the router does not handle; those records are skipped
/// without error.
///
/// # Errors
///
/// - [`IngestError::Parse`]: a routed field was missing, or the event time or amount could
///   not be parsed.
/// - [`IngestError::UnrecognizedAction`]: an order event had an unknown action.
pub fn classify(record: &EventRecord) -> Result<Option<Event>, IngestError> {
    match record.kind.as_str() {
        ORDER => {
            let customer = required(record, "customer_id", &record.customer_id)?;
            let key = required(record, "key", &record.key)?;
            let timestamp = parse_event_time(&record.event_time)?;
            let amount = record
                .total_amount
                .as_deref()
                .ok_or_else(|| ParseError::MissingAmount(key.to_string()))
                .and_then(parse_amount)?;

            let action = OrderAction::parse(&record.verb)
                .ok_or_else(|| IngestError::UnrecognizedAction(record.verb.clone()))?;

            Ok(Some(Event::Order(OrderEvent {
                action,
                order: OrderId::new(key),
                customer: CustomerId::new(customer),
                timestamp,
                amount,
            })))
        }
        SITE_VISIT => {
            let customer = required(record, "customer_id", &record.customer_id)?;
            let page = required(record, "key", &record.key)?;
            let timestamp = parse_event_time(&record.event_time)?;

            Ok(Some(Event::SiteVisit(SiteVisit {
                customer: CustomerId::new(customer),
                timestamp,
                page: page.to_string(),
            })))
        }
        _ => Ok(None),
    }
}

fn required<'a>(
    record: &EventRecord,
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ParseError> {
    if value.is_empty() {
        return Err(ParseError::MissingField {
            kind: record.kind.clone(),
            field,
        });
    }

    Ok(value)
}

/// Apply a typed event to the store.
///
/// # Errors
///
/// Returns [`StoreError`] if the event violates a store precondition.
pub fn apply(store: &mut EventStore, event: Event) -> Result<(), StoreError> {
    match event {
        Event::SiteVisit(visit) => {
            debug!(customer = %visit.customer, timestamp = %visit.timestamp, "site visit");

            store.record_visit(&visit.customer, visit.timestamp, visit.page)
        }
        Event::Order(order) => {
            debug!(
                customer = %order.customer,
                order = %order.order,
                action = order.action.as_str(),
                timestamp = %order.timestamp,
                amount = %order.amount,
                "order"
            );

            match order.action {
                OrderAction::New => store.create_order(
                    &order.customer,
                    &order.order,
                    order.timestamp,
                    order.amount,
                ),
                OrderAction::Update => store.update_order(
                    &order.customer,
                    &order.order,
                    order.timestamp,
                    order.amount,
                ),
            }
        }
    }
}

/// Ingest a single event record.
///
/// Records with an unknown `type` are ignored.
///
/// # Errors
///
/// Returns an [`IngestError`] if the record cannot be parsed or applied. The store is left
/// unchanged in that case.
pub fn ingest(store: &mut EventStore, record: &EventRecord) -> Result<(), IngestError> {
    let Some(event) = classify(record)? else {
        debug!(kind = %record.kind, key = %record.key, "ignoring event of unhandled type");

        return Ok(());
    };

    apply(store, event)?;

    Ok(())
}

/// Ingest a sequence of event records in order.
///
/// Returns the number of records processed.
///
/// # Errors
///
/// Stops at the first record that fails and returns its [`IngestError`]. Records before it
/// remain applied.
pub fn parse_events<'r>(
    store: &mut EventStore,
    records: impl IntoIterator<Item = &'r EventRecord>,
) -> Result<usize, IngestError> {
    let mut processed = 0;

    for record in records {
        ingest(store, record)?;
        processed += 1;
    }

    info!(
        records = processed,
        customers = store.customer_count(),
        "ingested events"
    );

    Ok(processed)
}
