//! Events
//!
//! Raw event records as they arrive from the event source, the typed events the
//! ingestion router works with, and the field parsers that sit between them.

use std::str::FromStr;

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{CustomerId, OrderId};

/// Event type tag for orders.
pub const ORDER: &str = "ORDER";

/// Event type tag for site visits.
pub const SITE_VISIT: &str = "SITE_VISIT";

/// Format of the `event_time` field, e.g. `2017-01-06T12:55:55.555Z`.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%fZ";

/// Errors raised while parsing event fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The event time did not match [`EVENT_TIME_FORMAT`].
    #[error("invalid event time: {0}")]
    InvalidTimestamp(String),

    /// The amount was not a non-negative decimal followed by an optional currency code.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// An order event carried no `total_amount`.
    #[error("order {0} has no total amount")]
    MissingAmount(String),

    /// A field needed to route the event was absent or empty.
    #[error("{kind} event has no {field}")]
    MissingField {
        /// Event type of the record
        kind: String,
        /// Name of the missing field
        field: &'static str,
    },
}

/// An unprocessed event record.
///
/// Field names follow the wire format. Any extra fields (such as `tags`) are ignored. Only
/// `type` is required when deserializing; records of other types may omit the rest, and the
/// ingestion router checks the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event type, matched case-sensitively against [`ORDER`] and [`SITE_VISIT`]
    #[serde(rename = "type")]
    pub kind: String,

    /// Action, e.g. `NEW` or `UPDATE`
    #[serde(default)]
    pub verb: String,

    /// Order id for orders, page id for site visits
    #[serde(default)]
    pub key: String,

    /// Event time in [`EVENT_TIME_FORMAT`]
    #[serde(default)]
    pub event_time: String,

    /// Customer the event belongs to
    #[serde(default)]
    pub customer_id: String,

    /// Order amount, e.g. `12.34 USD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<String>,
}

/// A parsed, strongly-typed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A customer visited a page
    SiteVisit(SiteVisit),

    /// A customer placed or amended an order
    Order(OrderEvent),
}

/// Site visit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteVisit {
    /// Visiting customer
    pub customer: CustomerId,

    /// When the visit happened
    pub timestamp: DateTime,

    /// Page that was visited
    pub page: String,
}

/// Order event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEvent {
    /// Whether this creates or updates the order
    pub action: OrderAction,

    /// Order identifier
    pub order: OrderId,

    /// Customer that placed the order
    pub customer: CustomerId,

    /// Time the order was placed or last updated
    pub timestamp: DateTime,

    /// Order total
    pub amount: Decimal,
}

/// Order actions understood by the ingestion router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAction {
    /// Record a new order
    New,

    /// Overwrite an existing order
    Update,
}

impl OrderAction {
    /// Returns the wire name of the action
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Update => "UPDATE",
        }
    }

    /// Parses a wire action name. Matching is case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NEW" => Some(Self::New),
            "UPDATE" => Some(Self::Update),
            _ => None,
        }
    }
}

/// Parse an event time string.
///
/// # Errors
///
/// Returns [`ParseError::InvalidTimestamp`] if the string does not match [`EVENT_TIME_FORMAT`].
pub fn parse_event_time(value: &str) -> Result<DateTime, ParseError> {
    DateTime::strptime(EVENT_TIME_FORMAT, value)
        .map_err(|_err| ParseError::InvalidTimestamp(value.to_string()))
}

/// Parse an amount string such as `12.34 USD`.
///
/// A trailing currency code is stripped without being checked; all amounts are
/// assumed to share one currency.
///
/// # Errors
///
/// Returns [`ParseError::InvalidAmount`] if what remains is not a non-negative decimal.
pub fn parse_amount(value: &str) -> Result<Decimal, ParseError> {
    let number = value
        .trim()
        .trim_end_matches(char::is_alphabetic)
        .trim_end();

    let amount = Decimal::from_str(number)
        .map_err(|_err| ParseError::InvalidAmount(value.to_string()))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ParseError::InvalidAmount(value.to_string()));
    }

    Ok(amount)
}

/// Week of the year, with weeks starting on Sunday.
///
/// Days before the first Sunday of the year fall in week 0, so the result is in `0..=53`.
pub fn week_of_year(timestamp: DateTime) -> i16 {
    let day = timestamp.day_of_year() - 1;
    let weekday = i16::from(timestamp.weekday().to_sunday_zero_offset());

    (day + 7 - weekday) / 7
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_event_time_with_fraction() -> TestResult {
        let parsed = parse_event_time("2017-01-06T12:55:55.555Z")?;

        assert_eq!(parsed, date(2017, 1, 6).at(12, 55, 55, 555_000_000));

        Ok(())
    }

    #[test]
    fn rejects_event_time_in_other_formats() {
        for value in [
            "2017-01-06 12:55:55",
            "06/01/2017",
            "",
            "2017-13-01T00:00:00.000Z",
            "2017-01-01T12:45:52Z",
        ] {
            assert_eq!(
                parse_event_time(value),
                Err(ParseError::InvalidTimestamp(value.to_string())),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn amount_strips_currency_code() -> TestResult {
        assert_eq!(parse_amount("12.34 USD")?, dec!(12.34));
        assert_eq!(parse_amount("  5 USD ")?, dec!(5));
        assert_eq!(parse_amount("7.50EUR")?, dec!(7.50));
        assert_eq!(parse_amount("3")?, dec!(3));

        Ok(())
    }

    #[test]
    fn amount_rejects_garbage_and_negatives() {
        for value in ["USD", "", "twelve USD", "-1.00 USD", "1.2.3 USD"] {
            assert_eq!(
                parse_amount(value),
                Err(ParseError::InvalidAmount(value.to_string())),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn order_action_is_case_sensitive() {
        assert_eq!(OrderAction::parse("NEW"), Some(OrderAction::New));
        assert_eq!(OrderAction::parse("UPDATE"), Some(OrderAction::Update));
        assert_eq!(OrderAction::parse("new"), None);
        assert_eq!(OrderAction::parse("CANCEL"), None);
    }

    #[test]
    fn weeks_start_on_sunday() {
        // 2017-01-01 is a Sunday.
        assert_eq!(week_of_year(date(2017, 1, 1).at(12, 0, 0, 0)), 1);
        assert_eq!(week_of_year(date(2017, 1, 7).at(12, 0, 0, 0)), 1);
        assert_eq!(week_of_year(date(2017, 1, 8).at(0, 0, 0, 0)), 2);
        assert_eq!(week_of_year(date(2017, 1, 14).at(12, 0, 0, 0)), 2);

        // 2016-01-01 is a Friday, so the first days of the year are week 0.
        assert_eq!(week_of_year(date(2016, 1, 1).at(0, 0, 0, 0)), 0);
        assert_eq!(week_of_year(date(2016, 1, 3).at(0, 0, 0, 0)), 1);
        assert_eq!(week_of_year(date(2016, 12, 31).at(0, 0, 0, 0)), 52);
    }

    #[test]
    fn record_deserializes_wire_names_and_ignores_tags() -> TestResult {
        let record: EventRecord = serde_norway::from_str(
            r#"{"type": "SITE_VISIT", "verb": "NEW", "key": "ac05e815502f",
                "event_time": "2017-01-01T12:45:52.041Z", "customer_id": "1",
                "tags": [{"some key": "some value"}]}"#,
        )?;

        assert_eq!(record.kind, SITE_VISIT);
        assert_eq!(record.key, "ac05e815502f");
        assert_eq!(record.total_amount, None);

        Ok(())
    }

    #[test]
    fn record_of_other_type_needs_only_its_type() -> TestResult {
        let record: EventRecord = serde_norway::from_str(
            r#"{"type": "CUSTOMER", "verb": "NEW", "key": "96f55c7d8f42",
                "event_time": "2017-01-06T12:46:46.384Z", "last_name": "Smith"}"#,
        )?;

        assert_eq!(record.kind, "CUSTOMER");
        assert_eq!(record.customer_id, "");

        Ok(())
    }
}
