use serde_json::Value;

/// Outcome of running one generated statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A read: column names, row-major values and the number of rows.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        count: usize,
    },
    /// A write and the number of rows it touched.
    Affected(u64),
    /// The database rejected the statement.
    Error(String),
}

impl QueryOutcome {
    pub fn rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let count = rows.len();
        QueryOutcome::Rows {
            columns,
            rows,
            count,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryOutcome::Error(_))
    }
}

/// Whether a statement is treated as a read.
///
/// The check is lexical: the statement must start with `SELECT`, ignoring
/// leading whitespace and case. Everything else (including `WITH`, `SHOW` or a
/// leading comment) is handled as a write.
pub fn is_select(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}

/// `sql` without surrounding whitespace and trailing `;` terminators.
pub fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

/// Whether `sql` holds at most one command.
///
/// Any `;` left after the trailing terminator is stripped counts as a second
/// command, including one inside a string literal.
pub fn is_single_statement(sql: &str) -> bool {
    !strip_terminator(sql).contains(';')
}

/// Whether running `sql` must be confirmed by the user first.
///
/// Only a lone `SELECT` runs unconfirmed: a `SELECT` followed by more
/// commands is treated like any other write.
pub fn requires_confirmation(sql: &str) -> bool {
    !is_select(sql) || !is_single_statement(sql)
}
