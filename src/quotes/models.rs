use rust_decimal::Decimal;
use serde::Deserialize;

/// Quote payload from the `/quote` endpoint
///
/// Keys follow the provider's wire format (`o`, `h`, `l`, `c`, `pc`).
/// Missing or `null` fields become `None`; nothing is range-checked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuoteRecord {
    /// Open price of the day
    #[serde(rename = "o", default)]
    pub open: Option<Decimal>,

    /// High price of the day
    #[serde(rename = "h", default)]
    pub high: Option<Decimal>,

    /// Low price of the day
    #[serde(rename = "l", default)]
    pub low: Option<Decimal>,

    /// Current price
    #[serde(rename = "c", default)]
    pub close: Option<Decimal>,

    /// Previous close price
    #[serde(rename = "pc", default)]
    pub prev_close: Option<Decimal>,
}
