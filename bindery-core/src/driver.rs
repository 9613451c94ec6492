use crate::{Error, Placeholder, Result, SqlType, Value};

/// Column metadata exposed by a [`Cursor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnInfo {
    pub label: String,
    pub sql_type: SqlType,
}

impl ColumnInfo {
    pub fn new(label: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            label: label.into(),
            sql_type,
        }
    }
}

/// A database backend. Implemented by driver crates, consumed by this layer
/// through `prepare`/`set_parameter`/`execute`/`fetch` primitives only; no
/// pooling, transactions or timeouts are assumed here.
pub trait Driver {
    type Connection: Connection<Driver = Self>;
    type Statement: Statement;

    /// The driver's native positional-placeholder syntax. The normalizer
    /// emits whatever this says; nothing in the core hard-codes `?`.
    fn placeholder(&self) -> Placeholder {
        Placeholder::QuestionMark
    }
}

/// A live connection able to prepare statements. Connection acquisition,
/// pooling and transaction boundaries belong to the driver, not this layer.
pub trait Connection {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    fn prepare(&mut self, sql: &str) -> Result<<Self::Driver as Driver>::Statement>;
}

/// A driver-prepared statement. Owned by exactly one call stack; released by
/// dropping it, which must close the driver-side handle on all exit paths.
pub trait Statement {
    type Cursor: Cursor;

    /// Set the parameter at `position` (1-based, driver numbering).
    fn set_parameter(&mut self, position: u32, value: &Value, sql_type: SqlType) -> Result<()>;

    /// Execute a statement that produces no rows; returns the affected count.
    fn execute(&mut self) -> Result<u64>;

    /// Execute a statement that produces rows.
    fn execute_query(&mut self) -> Result<Self::Cursor>;

    /// Queue the currently bound parameters as one batch entry.
    fn add_batch(&mut self) -> Result<()> {
        Err(Error::msg("batch execution is not supported by this driver"))
    }

    /// Execute all queued batch entries; returns the total affected count.
    fn execute_batch(&mut self) -> Result<u64> {
        Err(Error::msg("batch execution is not supported by this driver"))
    }

    /// The key generated by the last execution, if the driver reports one.
    fn generated_key(&mut self) -> Result<Option<Value>> {
        Ok(None)
    }
}

/// A forward-only result cursor with column metadata. Dropping it releases
/// the driver-side resources.
pub trait Cursor {
    fn columns(&self) -> &[ColumnInfo];

    /// Advance to the next row; `None` once exhausted. Values are aligned by
    /// index with [`Cursor::columns`].
    fn next_row(&mut self) -> Result<Option<Vec<Value>>>;
}
