use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::types::chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::types::Decimal;
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::{info, warn};

use super::{rows_outcome, Database, Dialect};
use crate::error::Result;
use crate::query::{is_select, strip_terminator, QueryOutcome};
use crate::schema::SchemaDescription;

// information_schema columns come back as binary strings on some MySQL 8
// builds, hence the casts.
const CATALOG_QUERY: &str = "SELECT CAST(TABLE_NAME AS CHAR) AS table_name, \
     CAST(COLUMN_NAME AS CHAR) AS column_name, \
     CAST(COLUMN_TYPE AS CHAR) AS column_type \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() \
     ORDER BY TABLE_NAME, ORDINAL_POSITION";

pub struct MySqlDatabase {
    pool: MySqlPool,
}

impl MySqlDatabase {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;

        Ok(MySqlDatabase { pool })
    }

    async fn fetch(&self, sql: &str) -> sqlx::Result<QueryOutcome> {
        let statement = (&self.pool).prepare(sql).await?;
        let rows = statement.query().fetch_all(&self.pool).await?;

        Ok(rows_outcome(statement.columns(), &rows, decode_cell))
    }
}

#[async_trait]
impl Database for MySqlDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn describe_schema(&self) -> Result<SchemaDescription> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(CATALOG_QUERY)
            .fetch_all(&self.pool)
            .await?;

        let schema = SchemaDescription::from_catalog_rows(rows);
        info!(tables = schema.tables().len(), "captured MySQL schema");

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

fn decode_cell(row: &MySqlRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }

    try_decode!(row, index, String, Value::String);
    // bool decodes from any integer column, only TINYINT(1) is a flag.
    if row.column(index).type_info().name() == "BOOLEAN" {
        try_decode!(row, index, bool, Value::Bool);
    }
    try_decode!(row, index, i64, Value::from);
    try_decode!(row, index, u64, Value::from);
    try_decode!(row, index, Decimal, |v: Decimal| Value::String(v.to_string()));
    try_decode!(row, index, f64, Value::from);
    try_decode!(row, index, f32, |v: f32| Value::from(f64::from(v)));
    try_decode!(row, index, NaiveDateTime, |v: NaiveDateTime| Value::String(v.to_string()));
    try_decode!(row, index, NaiveDate, |v: NaiveDate| Value::String(v.to_string()));
    try_decode!(row, index, NaiveTime, |v: NaiveTime| Value::String(v.to_string()));
    try_decode!(row, index, Value, |v: Value| v);

    // BIT, SET and other columns without a decoder above are tried as text.
    row.try_get_unchecked::<String, _>(index)
        .map(Value::String)
        .unwrap_or_else(|_| Value::String(format!("<{}>", row.column(index).type_info().name())))
}
