//! SQL for the quote table
//!
//! The table name is runtime configuration, so statements are built as text
//! and run through `diesel::sql_query`. Callers pass a name that already
//! passed `config::is_valid_table_name`.

/// Column list in insert/bind order
pub const COLUMNS: [&str; 8] = [
    "symbol",
    "trading_day",
    "open",
    "high",
    "low",
    "close",
    "prev_close",
    "fetched_at",
];

/// Columns overwritten from the incoming row on conflict
const UPDATED_COLUMNS: [&str; 6] = ["open", "high", "low", "close", "prev_close", "fetched_at"];

/// Idempotent DDL for the quote table
pub fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n\
         \x20   symbol TEXT NOT NULL,\n\
         \x20   trading_day DATE NOT NULL,\n\
         \x20   open NUMERIC,\n\
         \x20   high NUMERIC,\n\
         \x20   low NUMERIC,\n\
         \x20   close NUMERIC,\n\
         \x20   prev_close NUMERIC,\n\
         \x20   fetched_at TIMESTAMP WITHOUT TIME ZONE DEFAULT NOW(),\n\
         \x20   PRIMARY KEY (symbol, trading_day)\n\
         )"
    )
}

/// Multi-row upsert with `row_count` placeholder tuples
///
/// On conflict every value column and `fetched_at` take the incoming row's
/// values, so the caller's clock drives both the insert and update paths.
pub fn upsert_sql(table: &str, row_count: usize) -> String {
    let width = COLUMNS.len();
    let values = (0..row_count)
        .map(|row| {
            let placeholders = (1..=width)
                .map(|col| format!("${}", row * width + col))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({placeholders})")
        })
        .collect::<Vec<_>>()
        .join(", ");

    let updates = UPDATED_COLUMNS
        .iter()
        .map(|col| format!("{col} = EXCLUDED.{col}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} ({}) VALUES {values} \
         ON CONFLICT (symbol, trading_day) DO UPDATE SET {updates}",
        COLUMNS.join(", ")
    )
}

/// Single-row lookup by identity
pub fn select_one_sql(table: &str) -> String {
    format!(
        "SELECT {} FROM {table} WHERE symbol = $1 AND trading_day = $2",
        COLUMNS.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql("stock_quotes");
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS stock_quotes ("));
        assert!(sql.contains("symbol TEXT NOT NULL"));
        assert!(sql.contains("trading_day DATE NOT NULL"));
        assert!(sql.contains("prev_close NUMERIC"));
        assert!(sql.contains("fetched_at TIMESTAMP WITHOUT TIME ZONE DEFAULT NOW()"));
        assert!(sql.contains("PRIMARY KEY (symbol, trading_day)"));
    }

    #[test]
    fn test_upsert_sql_placeholders() {
        let sql = upsert_sql("q", 2);
        assert!(sql.starts_with(
            "INSERT INTO q (symbol, trading_day, open, high, low, close, prev_close, fetched_at) VALUES "
        ));
        assert!(sql.contains("($1, $2, $3, $4, $5, $6, $7, $8), ($9, $10, $11, $12, $13, $14, $15, $16)"));
        assert!(!sql.contains("$17"));
    }

    #[test]
    fn test_upsert_sql_conflict_clause() {
        let sql = upsert_sql("q", 1);
        assert!(sql.contains("ON CONFLICT (symbol, trading_day) DO UPDATE SET"));
        for col in UPDATED_COLUMNS {
            assert!(sql.contains(&format!("{col} = EXCLUDED.{col}")));
        }
        assert!(sql.ends_with("fetched_at = EXCLUDED.fetched_at"));
        assert!(!sql.contains("NOW()"));
    }
}
