#![allow(dead_code)]

use bindery::{
    ColumnInfo, Connection, Cursor, Driver, Placeholder, Result, SqlType, Statement, Value,
};
use log::LevelFilter;
use std::{
    env,
    sync::{Arc, Mutex, PoisonError},
};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Everything the fake driver observed, shared between the test body and the
/// statements it hands out.
#[derive(Debug, Default)]
pub struct Journal {
    pub prepared: Vec<String>,
    pub bound: Vec<(u32, Value, SqlType)>,
    pub batches: usize,
    pub executions: usize,
}

#[derive(Clone, Default)]
pub struct FakeDriver {
    placeholder: Placeholder,
}

impl FakeDriver {
    pub fn numbered(prefix: char) -> Self {
        Self {
            placeholder: Placeholder::Numbered(prefix),
        }
    }
}

impl Driver for FakeDriver {
    type Connection = FakeConnection;
    type Statement = FakeStatement;

    fn placeholder(&self) -> Placeholder {
        self.placeholder
    }
}

pub struct FakeConnection {
    driver: FakeDriver,
    journal: Arc<Mutex<Journal>>,
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Value>>,
    generated_key: Option<Value>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::with_driver(FakeDriver::default())
    }

    pub fn with_driver(driver: FakeDriver) -> Self {
        init_logs();
        Self {
            driver,
            journal: Arc::new(Mutex::new(Journal::default())),
            columns: Vec::new(),
            rows: Vec::new(),
            generated_key: None,
        }
    }

    /// The result set every query statement of this connection will produce.
    pub fn with_result(mut self, columns: Vec<ColumnInfo>, rows: Vec<Vec<Value>>) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    pub fn with_generated_key(mut self, key: Value) -> Self {
        self.generated_key = Some(key);
        self
    }

    pub fn journal(&self) -> Arc<Mutex<Journal>> {
        self.journal.clone()
    }
}

impl Connection for FakeConnection {
    type Driver = FakeDriver;

    fn driver(&self) -> &FakeDriver {
        &self.driver
    }

    fn prepare(&mut self, sql: &str) -> Result<FakeStatement> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .prepared
            .push(sql.to_owned());
        Ok(FakeStatement {
            journal: self.journal.clone(),
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            generated_key: self.generated_key.clone(),
        })
    }
}

pub struct FakeStatement {
    journal: Arc<Mutex<Journal>>,
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Value>>,
    generated_key: Option<Value>,
}

impl Statement for FakeStatement {
    type Cursor = FakeCursor;

    fn set_parameter(&mut self, position: u32, value: &Value, sql_type: SqlType) -> Result<()> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bound
            .push((position, value.clone(), sql_type));
        Ok(())
    }

    fn execute(&mut self) -> Result<u64> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .executions += 1;
        Ok(1)
    }

    fn execute_query(&mut self) -> Result<FakeCursor> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .executions += 1;
        Ok(FakeCursor {
            columns: self.columns.clone(),
            rows: self.rows.clone().into_iter().collect(),
        })
    }

    fn add_batch(&mut self) -> Result<()> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .batches += 1;
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<u64> {
        let mut journal = self.journal.lock().unwrap_or_else(PoisonError::into_inner);
        journal.executions += 1;
        Ok(journal.batches as u64)
    }

    fn generated_key(&mut self) -> Result<Option<Value>> {
        Ok(self.generated_key.clone())
    }
}

pub struct FakeCursor {
    columns: Vec<ColumnInfo>,
    rows: std::collections::VecDeque<Vec<Value>>,
}

impl Cursor for FakeCursor {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }
}
