//! SQLite-backed data source.
//!
//! CSV inputs are exposed as virtual tables through rusqlite's `csvtab`
//! module, so the same connection answers both whole-table reads and ad-hoc
//! SQL queries.

use std::path::Path;

use langpulse_core::{LangpulseError, SourceConfig};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::table::Table;
use crate::DataSource;

/// A data source over an in-memory SQLite connection.
///
/// # Examples
///
/// ```
/// use langpulse_source::{DataSource, SqliteSource, Table};
///
/// let mut repos = Table::new("repos_csv", vec!["language".into(), "num_repos".into()]);
/// repos.push_row(vec![Some("rust".into()), Some("10".into())]);
///
/// let source = SqliteSource::from_tables(vec![repos]).unwrap();
/// let table = source.get_table("repos_csv").unwrap();
/// assert_eq!(table.len(), 1);
/// ```
pub struct SqliteSource {
    conn: Connection,
    tables: Vec<String>,
}

impl SqliteSource {
    /// Register the three configured CSV files and probe each of them once.
    ///
    /// # Errors
    ///
    /// Returns [`LangpulseError::FileNotFound`] for a missing file and
    /// [`LangpulseError::Source`] when a file cannot be registered or read.
    pub fn connect(sources: &SourceConfig) -> Result<Self, LangpulseError> {
        Self::from_csv_files(&sources.tables())
    }

    /// Register each `(table name, csv path)` pair as a virtual table.
    ///
    /// # Errors
    ///
    /// Same as [`SqliteSource::connect`].
    pub fn from_csv_files(files: &[(&str, &Path)]) -> Result<Self, LangpulseError> {
        let conn = open_connection()?;
        rusqlite::vtab::csvtab::load_module(&conn)
            .map_err(|e| LangpulseError::Source(format!("failed to load csv module: {e}")))?;

        let mut tables = Vec::with_capacity(files.len());
        for (name, path) in files {
            if !path.exists() {
                return Err(LangpulseError::FileNotFound(path.to_path_buf()));
            }
            let filename = path.to_str().ok_or_else(|| {
                LangpulseError::Source(format!("path is not valid UTF-8: {}", path.display()))
            })?;
            if filename.contains('\'') {
                return Err(LangpulseError::Source(format!(
                    "path may not contain a single quote: {filename}"
                )));
            }

            let sql = format!(
                "CREATE VIRTUAL TABLE {} USING csv(filename='{filename}', header=yes)",
                quote_ident(name)
            );
            conn.execute_batch(&sql).map_err(|e| {
                LangpulseError::Source(format!("failed to register {name} from {filename}: {e}"))
            })?;
            tracing::debug!(table = %name, path = %filename, "registered csv table");
            tables.push((*name).to_string());
        }

        let source = Self { conn, tables };
        source.probe()?;
        Ok(source)
    }

    /// Build a source from tables already held in memory.
    ///
    /// Every cell is stored as text so queries see the same values a CSV
    /// file would produce.
    ///
    /// # Errors
    ///
    /// Returns [`LangpulseError::Source`] if a table cannot be created or filled.
    pub fn from_tables(tables: Vec<Table>) -> Result<Self, LangpulseError> {
        let mut conn = open_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| LangpulseError::Source(format!("failed to start transaction: {e}")))?;

        let mut names = Vec::with_capacity(tables.len());
        for table in &tables {
            let columns: Vec<String> = table.columns.iter().map(|c| quote_ident(c)).collect();
            let create = format!(
                "CREATE TABLE {} ({})",
                quote_ident(&table.name),
                columns.join(", ")
            );
            tx.execute_batch(&create).map_err(|e| {
                LangpulseError::Source(format!("failed to create {}: {e}", table.name))
            })?;

            if !table.columns.is_empty() {
                let placeholders = vec!["?"; table.columns.len()].join(", ");
                let insert = format!(
                    "INSERT INTO {} VALUES ({placeholders})",
                    quote_ident(&table.name)
                );
                let mut stmt = tx.prepare(&insert).map_err(|e| {
                    LangpulseError::Source(format!("failed to prepare insert: {e}"))
                })?;
                for row in table.iter_rows() {
                    stmt.execute(rusqlite::params_from_iter(row.iter()))
                        .map_err(|e| {
                            LangpulseError::Source(format!(
                                "failed to insert into {}: {e}",
                                table.name
                            ))
                        })?;
                }
            }
            names.push(table.name.clone());
        }

        tx.commit()
            .map_err(|e| LangpulseError::Source(format!("failed to commit tables: {e}")))?;

        Ok(Self {
            conn,
            tables: names,
        })
    }

    fn probe(&self) -> Result<(), LangpulseError> {
        for name in &self.tables {
            let sample = self.query(&format!("SELECT * FROM {} LIMIT 1", quote_ident(name)))?;
            if sample.is_empty() {
                tracing::warn!(table = %name, "table has no rows");
            }
        }
        Ok(())
    }
}

impl DataSource for SqliteSource {
    fn table_names(&self) -> Vec<String> {
        self.tables.clone()
    }

    fn query(&self, sql: &str) -> Result<Table, LangpulseError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| LangpulseError::Source(format!("invalid query: {e}")))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut table = Table::new("query", columns);
        let mut rows = stmt
            .query([])
            .map_err(|e| LangpulseError::Source(format!("query failed: {e}")))?;
        while let Some(row) = rows
            .next()
            .map_err(|e| LangpulseError::Source(format!("failed to read row: {e}")))?
        {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                let value = row
                    .get_ref(i)
                    .map_err(|e| LangpulseError::Source(format!("failed to read cell: {e}")))?;
                cells.push(value_to_text(value));
            }
            table.push_row(cells);
        }

        Ok(table)
    }
}

fn open_connection() -> Result<Connection, LangpulseError> {
    Connection::open_in_memory()
        .map_err(|e| LangpulseError::Source(format!("failed to open database: {e}")))
}

fn value_to_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repos() -> Table {
        let mut table = Table::new("repos_csv", vec!["language".into(), "num_repos".into()]);
        table.push_row(vec![Some("rust".into()), Some("30".into())]);
        table.push_row(vec![Some("go".into()), Some("10".into())]);
        table.push_row(vec![Some("cobol".into()), None]);
        table
    }

    #[test]
    fn from_tables_round_trips_cells() {
        let source = SqliteSource::from_tables(vec![repos()]).unwrap();
        let table = source.get_table("repos_csv").unwrap();
        assert_eq!(table.name, "repos_csv");
        assert_eq!(table.columns, vec!["language", "num_repos"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(0, 1), Some("30"));
        assert_eq!(table.cell(2, 1), None);
    }

    #[test]
    fn query_renders_numbers_as_text() {
        let source = SqliteSource::from_tables(vec![repos()]).unwrap();
        let result = source
            .query("SELECT SUM(CAST(num_repos AS INTEGER)) AS total, 2.5 AS half FROM repos_csv")
            .unwrap();
        assert_eq!(result.columns, vec!["total", "half"]);
        assert_eq!(result.cell(0, 0), Some("40"));
        assert_eq!(result.cell(0, 1), Some("2.5"));
    }

    #[test]
    fn unknown_table_is_rejected() {
        let source = SqliteSource::from_tables(vec![repos()]).unwrap();
        let err = source.get_table("prs_csv").unwrap_err();
        assert!(err.to_string().contains("prs_csv"));
    }

    #[test]
    fn invalid_sql_is_a_source_error() {
        let source = SqliteSource::from_tables(vec![repos()]).unwrap();
        let err = source.query("SELEC nonsense").unwrap_err();
        assert!(matches!(err, LangpulseError::Source(_)));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("issues_csv"), "\"issues_csv\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn missing_csv_file_fails_at_connect() {
        let files = [("issues_csv", Path::new("/nonexistent/issues.csv"))];
        let err = SqliteSource::from_csv_files(&files).err().unwrap();
        assert!(matches!(err, LangpulseError::FileNotFound(_)));
    }
}
