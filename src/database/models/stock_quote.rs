use crate::quotes::QuoteRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Date, Nullable, Numeric, Text, Timestamp};
use rust_decimal::Decimal;

/// Quote row as read back from the table
#[derive(Debug, Clone, PartialEq, QueryableByName)]
pub struct StockQuote {
    #[diesel(sql_type = Text)]
    pub symbol: String,

    #[diesel(sql_type = Date)]
    pub trading_day: NaiveDate,

    #[diesel(sql_type = Nullable<Numeric>)]
    pub open: Option<Decimal>,

    #[diesel(sql_type = Nullable<Numeric>)]
    pub high: Option<Decimal>,

    #[diesel(sql_type = Nullable<Numeric>)]
    pub low: Option<Decimal>,

    #[diesel(sql_type = Nullable<Numeric>)]
    pub close: Option<Decimal>,

    #[diesel(sql_type = Nullable<Numeric>)]
    pub prev_close: Option<Decimal>,

    /// Time of the last write for this (symbol, trading_day)
    #[diesel(sql_type = Nullable<Timestamp>)]
    pub fetched_at: Option<NaiveDateTime>,
}

/// Storage-ready quote row
///
/// Identity is `(symbol, trading_day)`; value columns may be null.
#[derive(Debug, Clone, PartialEq)]
pub struct StockQuoteRow {
    pub symbol: String,
    pub trading_day: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub prev_close: Option<Decimal>,
    /// UTC, stored without zone
    pub fetched_at: NaiveDateTime,
}

impl StockQuoteRow {
    /// Build a row from a fetched quote
    ///
    /// The trading day is the UTC calendar date of `now`, with no market
    /// calendar applied.
    pub fn from_quote(symbol: &str, quote: QuoteRecord, now: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            trading_day: now.date_naive(),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            prev_close: quote.prev_close,
            fetched_at: now.naive_utc(),
        }
    }

    /// Primary key of the row
    pub fn key(&self) -> (&str, NaiveDate) {
        (&self.symbol, self.trading_day)
    }
}
