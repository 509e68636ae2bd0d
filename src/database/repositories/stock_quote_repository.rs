use crate::database::connection::{PgPooledConnection, StorageError};
use crate::database::models::{StockQuote, StockQuoteRow};
use crate::database::schema;
use chrono::NaiveDate;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{Date, Nullable, Numeric, Text, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;

/// Rows per multi-values INSERT statement
pub const UPSERT_PAGE_SIZE: usize = 100;

/// Stock quote repository trait - schema ensure and batched upsert
pub trait StockQuoteRepository: Send + Sync {
    /// Create the quote table if it does not exist
    fn ensure_table(&self) -> Result<(), StorageError>;

    /// Insert or update rows keyed by (symbol, trading_day)
    ///
    /// All rows are applied in one transaction or none are.
    /// Returns the number of rows written.
    fn upsert(&self, rows: Vec<StockQuoteRow>) -> Result<usize, StorageError>;

    /// Get the stored row for a symbol and trading day
    fn find(&self, symbol: &str, trading_day: NaiveDate) -> Result<Option<StockQuote>, StorageError>;
}

/// Concrete implementation of StockQuoteRepository
pub struct StockQuoteRepositoryImpl {
    table: String,
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, StorageError> + Send + Sync>,
}

impl StockQuoteRepositoryImpl {
    /// Create new quote repository with connection provider
    ///
    /// `table` must already be a validated identifier.
    pub fn new<F>(table: impl Into<String>, get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, StorageError> + Send + Sync + 'static,
    {
        Self {
            table: table.into(),
            get_conn: Arc::new(get_conn),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl StockQuoteRepository for StockQuoteRepositoryImpl {
    fn ensure_table(&self) -> Result<(), StorageError> {
        let mut conn = (self.get_conn)()?;

        diesel::sql_query(schema::create_table_sql(&self.table)).execute(&mut conn)?;

        Ok(())
    }

    fn upsert(&self, rows: Vec<StockQuoteRow>) -> Result<usize, StorageError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let rows = collapse_duplicates(rows);
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, StorageError, _>(|conn| {
            let mut written = 0;
            for page in rows.chunks(UPSERT_PAGE_SIZE) {
                written += upsert_page(conn, &self.table, page)?;
            }
            Ok(written)
        })
    }

    fn find(&self, symbol: &str, trading_day: NaiveDate) -> Result<Option<StockQuote>, StorageError> {
        let mut conn = (self.get_conn)()?;

        diesel::sql_query(schema::select_one_sql(&self.table))
            .bind::<Text, _>(symbol)
            .bind::<Date, _>(trading_day)
            .get_result::<StockQuote>(&mut conn)
            .optional()
            .map_err(StorageError::from)
    }
}

/// Execute one page as a single INSERT .. ON CONFLICT statement
fn upsert_page(
    conn: &mut PgConnection,
    table: &str,
    page: &[StockQuoteRow],
) -> Result<usize, StorageError> {
    let mut query: BoxedSqlQuery<'_, Pg, SqlQuery> =
        diesel::sql_query(schema::upsert_sql(table, page.len())).into_boxed();

    for row in page {
        query = query
            .bind::<Text, _>(row.symbol.clone())
            .bind::<Date, _>(row.trading_day)
            .bind::<Nullable<Numeric>, _>(row.open)
            .bind::<Nullable<Numeric>, _>(row.high)
            .bind::<Nullable<Numeric>, _>(row.low)
            .bind::<Nullable<Numeric>, _>(row.close)
            .bind::<Nullable<Numeric>, _>(row.prev_close)
            .bind::<Timestamp, _>(row.fetched_at);
    }

    Ok(query.execute(conn)?)
}

/// Keep one row per (symbol, trading_day), the last one seen
///
/// PostgreSQL refuses an ON CONFLICT DO UPDATE statement that hits the
/// same key twice. Rows keep the position of their first occurrence.
pub fn collapse_duplicates(rows: Vec<StockQuoteRow>) -> Vec<StockQuoteRow> {
    let mut positions: HashMap<(String, NaiveDate), usize> = HashMap::with_capacity(rows.len());
    let mut unique: Vec<StockQuoteRow> = Vec::with_capacity(rows.len());

    for row in rows {
        let key = (row.symbol.clone(), row.trading_day);
        match positions.get(&key) {
            Some(&idx) => unique[idx] = row,
            None => {
                positions.insert(key, unique.len());
                unique.push(row);
            }
        }
    }

    unique
}
