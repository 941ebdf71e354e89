//! Data source and query surface for langpulse.
//!
//! The analytics pipeline reads its three input tables through the
//! [`DataSource`] trait. [`SqliteSource`] implements it over an in-memory
//! SQLite connection with CSV files mounted as virtual tables.

pub mod sqlite;
pub mod table;

use langpulse_core::LangpulseError;

pub use sqlite::SqliteSource;
pub use table::Table;

/// A set of named tables that can be read whole or queried with SQL.
pub trait DataSource {
    /// Names of the registered tables, in registration order.
    fn table_names(&self) -> Vec<String>;

    /// Run a query and collect the result as a [`Table`] named `query`.
    ///
    /// # Errors
    ///
    /// Returns [`LangpulseError::Source`] for invalid SQL or read failures.
    fn query(&self, sql: &str) -> Result<Table, LangpulseError>;

    /// Read a registered table in full.
    ///
    /// # Errors
    ///
    /// Returns [`LangpulseError::Source`] if `name` is not registered or the
    /// read fails.
    fn get_table(&self, name: &str) -> Result<Table, LangpulseError> {
        if !self.table_names().iter().any(|t| t == name) {
            return Err(LangpulseError::Source(format!("unknown table '{name}'")));
        }
        let mut table = self.query(&format!("SELECT * FROM {}", sqlite::quote_ident(name)))?;
        table.name = name.to_string();
        Ok(table)
    }
}
