use std::fmt;

/// A single column as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

/// Snapshot of the tables visible to the assistant, captured once at startup.
///
/// Tables appear in name order and columns in their ordinal position. The
/// rendered form (one line per table) is what the model sees when it writes
/// SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDescription {
    tables: Vec<TableSchema>,
}

impl SchemaDescription {
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    /// Builds the description from catalog rows of `(table, column, type)`.
    ///
    /// Rows must already be ordered by table; consecutive rows of the same
    /// table are folded into one entry.
    pub fn from_catalog_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String, String)>,
    {
        let mut tables: Vec<TableSchema> = Vec::new();

        for (table, column, data_type) in rows {
            let column = ColumnSchema {
                name: column,
                data_type,
            };

            match tables.last_mut() {
                Some(last) if last.name == table => last.columns.push(column),
                _ => tables.push(TableSchema {
                    name: table,
                    columns: vec![column],
                }),
            }
        }

        Self { tables }
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|col| format!("{} ({})", col.name, col.data_type))
            .collect();

        write!(f, "Table `{}`: {}", self.name, columns.join(", "))
    }
}

impl fmt::Display for SchemaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, table) in self.tables.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", table)?;
        }
        Ok(())
    }
}
