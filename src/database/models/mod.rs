pub mod stock_quote;

pub use stock_quote::{StockQuote, StockQuoteRow};
