use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::{Decimal, Uuid};
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::{info, warn};

use super::{rows_outcome, Database, Dialect};
use crate::error::Result;
use crate::query::{is_select, strip_terminator, QueryOutcome};
use crate::schema::SchemaDescription;

const CATALOG_QUERY: &str = "SELECT table_name::text, column_name::text, data_type::text \
     FROM information_schema.columns \
     WHERE table_schema = current_schema() \
     ORDER BY table_name, ordinal_position";

pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(1).connect(url).await?;

        Ok(PgDatabase { pool })
    }

    async fn fetch(&self, sql: &str) -> sqlx::Result<QueryOutcome> {
        let statement = (&self.pool).prepare(sql).await?;
        let rows = statement.query().fetch_all(&self.pool).await?;

        Ok(rows_outcome(statement.columns(), &rows, decode_cell))
    }
}

#[async_trait]
impl Database for PgDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn describe_schema(&self) -> Result<SchemaDescription> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(CATALOG_QUERY)
            .fetch_all(&self.pool)
            .await?;

        let schema = SchemaDescription::from_catalog_rows(rows);
        info!(tables = schema.tables().len(), "captured PostgreSQL schema");

        Ok(schema)
    }

    async fn execute(&self, sql: &str) -> QueryOutcome {
        let sql = strip_terminator(sql);
        let result = if is_select(sql) {
            self.fetch(sql).await
        } else {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map(|done| QueryOutcome::Affected(done.rows_affected()))
        };

        result.unwrap_or_else(|err| {
            warn!(error = %err, "statement failed");
            QueryOutcome::Error(err.to_string())
        })
    }
}

fn decode_cell(row: &PgRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }

    try_decode!(row, index, String, Value::String);
    try_decode!(row, index, bool, Value::Bool);
    try_decode!(row, index, i16, Value::from);
    try_decode!(row, index, i32, Value::from);
    try_decode!(row, index, i64, Value::from);
    try_decode!(row, index, Decimal, |v: Decimal| Value::String(v.to_string()));
    try_decode!(row, index, f32, |v: f32| Value::from(f64::from(v)));
    try_decode!(row, index, f64, Value::from);
    try_decode!(row, index, DateTime<Utc>, |v: DateTime<Utc>| Value::String(v.to_rfc3339()));
    try_decode!(row, index, NaiveDateTime, |v: NaiveDateTime| Value::String(v.to_string()));
    try_decode!(row, index, NaiveDate, |v: NaiveDate| Value::String(v.to_string()));
    try_decode!(row, index, NaiveTime, |v: NaiveTime| Value::String(v.to_string()));
    try_decode!(row, index, Uuid, |v: Uuid| Value::String(v.to_string()));
    try_decode!(row, index, Value, |v: Value| v);

    // Enums and other text-like types without a decoder above.
    row.try_get_unchecked::<String, _>(index)
        .map(Value::String)
        .unwrap_or_else(|_| Value::String(format!("<{}>", row.column(index).type_info().name())))
}
