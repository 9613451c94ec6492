use crate::{
    AsValue, BeanExtractor, BindConfig, Cursor, Driver, Error, MapExtractor, MappingPolicy,
    NameMapper, Params, ParamSource, RecordSource, Result, SqlError, SqlInfo, SqlRecord,
    Statement, Value, bind_all,
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// State shared by every statement wrapper: the driver-prepared statement,
/// its [`SqlInfo`], the values accumulated so far and the executed flag that
/// seals the originating dynamic SQL text.
///
/// Wrappers are not thread-safe. They are created, operated upon and dropped
/// by one and the same call stack; dropping one releases the driver-side
/// statement through the driver's own `Drop`.
struct StatementCore<S: Statement> {
    stmt: S,
    info: Arc<SqlInfo>,
    config: Arc<dyn BindConfig + Send + Sync>,
    record_mapper: NameMapper,
    bindings: BTreeMap<String, Value>,
    fresh: bool,
    executed: Arc<AtomicBool>,
}

impl<S: Statement> StatementCore<S> {
    fn new(
        stmt: S,
        info: Arc<SqlInfo>,
        config: Arc<dyn BindConfig + Send + Sync>,
        record_mapper: NameMapper,
        executed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            stmt,
            info,
            config,
            record_mapper,
            bindings: BTreeMap::new(),
            fresh: true,
            executed,
        }
    }

    fn check_fresh(&self) -> Result<()> {
        if self.fresh {
            Ok(())
        } else {
            Err(SqlError::DirtyStatement.into())
        }
    }

    fn bind(&mut self, parameter: &str, value: Value) -> Result<()> {
        self.check_fresh()?;
        if self.info.positions(parameter).is_none() {
            return Err(SqlError::NoSuchParameter {
                parameter: parameter.to_owned(),
            }
            .into());
        }
        self.bindings.insert(parameter.to_owned(), value);
        Ok(())
    }

    /// Bind every entry naming a declared parameter; the rest is tacitly
    /// ignored, so one bag of values can feed several statements.
    fn bind_params(&mut self, params: &Params) -> Result<()> {
        self.check_fresh()?;
        for (name, value) in params.entries() {
            if self.info.positions(name).is_some() {
                self.bindings.insert(name.to_owned(), value.clone());
            }
        }
        Ok(())
    }

    fn bind_map(&mut self, map: &HashMap<String, Value>) -> Result<()> {
        self.check_fresh()?;
        for (name, value) in map {
            if self.info.positions(name).is_some() {
                self.bindings.insert(name.clone(), value.clone());
            }
        }
        Ok(())
    }

    /// Bind the fields of a record to the parameters they map to. Fields
    /// without a matching parameter are tacitly ignored, as are fields
    /// outside the `include`/`exclude` restriction.
    fn bind_record<R: SqlRecord>(
        &mut self,
        record: &R,
        include: Option<&[&str]>,
        exclude: &[&str],
    ) -> Result<()> {
        self.check_fresh()?;
        let mut source = RecordSource::new(record, &self.record_mapper);
        if let Some(fields) = include {
            source = source.only(fields);
        }
        source = source.except(exclude);
        for parameter in self.info.parameters() {
            if let Some(value) = source.value_of(parameter.name()) {
                self.bindings.insert(parameter.name().to_owned(), value);
            }
        }
        Ok(())
    }

    /// Push the accumulated values into the driver statement. Fails before
    /// touching it when any declared parameter is still unbound.
    fn apply_bindings(&mut self) -> Result<()> {
        bind_all(
            &mut self.stmt,
            &self.info,
            &self.bindings,
            self.config.as_ref(),
        )?;
        self.fresh = false;
        Ok(())
    }

    fn mark_executed(&self) {
        self.executed.store(true, Ordering::Release);
    }

    fn reset(&mut self) {
        self.bindings.clear();
        self.fresh = true;
    }
}

macro_rules! binding_api {
    () => {
        /// Bind a value to the named parameter. Unknown names fail with
        /// [`SqlError::NoSuchParameter`].
        pub fn bind(&mut self, parameter: &str, value: impl Into<Value>) -> Result<&mut Self> {
            self.core.bind(parameter, value.into())?;
            Ok(self)
        }

        /// Bind a bag of named values; entries that do not correspond to a
        /// parameter of this statement are tacitly ignored.
        pub fn bind_params(&mut self, params: &Params) -> Result<&mut Self> {
            self.core.bind_params(params)?;
            Ok(self)
        }

        /// Bind every map entry naming a parameter of this statement; unknown
        /// keys are tacitly ignored.
        pub fn bind_map(
            &mut self,
            map: &::std::collections::HashMap<String, Value>,
        ) -> Result<&mut Self> {
            self.core.bind_map(map)?;
            Ok(self)
        }

        /// Bind the fields of `record` to the parameters they map to through
        /// the record mapper; non-matching fields are tacitly ignored.
        pub fn bind_record<R: SqlRecord>(&mut self, record: &R) -> Result<&mut Self> {
            self.core.bind_record(record, None, &[])?;
            Ok(self)
        }

        /// Like `bind_record`, restricted to the named fields.
        pub fn bind_record_only<R: SqlRecord>(
            &mut self,
            record: &R,
            fields: &[&str],
        ) -> Result<&mut Self> {
            self.core.bind_record(record, Some(fields), &[])?;
            Ok(self)
        }

        /// Like `bind_record`, with the named fields left out.
        pub fn bind_record_except<R: SqlRecord>(
            &mut self,
            record: &R,
            fields: &[&str],
        ) -> Result<&mut Self> {
            self.core.bind_record(record, None, fields)?;
            Ok(self)
        }

        /// The normalization artifact backing this statement.
        pub fn info(&self) -> &SqlInfo {
            &self.core.info
        }
    };
}

/// Executes a SELECT-like statement and hands its cursor to a typed or
/// generic materializer.
///
/// ```rust,ignore
/// let sql = Sql::new("SELECT * FROM person WHERE first_name = :firstName");
/// let mut query = sql.query(&mut connection)?;
/// query.bind("firstName", "John")?;
/// let persons: Vec<Person> = query.beanifier()?.beanify_all()?;
/// ```
pub struct SqlQuery<D: Driver> {
    core: StatementCore<D::Statement>,
    column_mapper: Option<NameMapper>,
    policy: MappingPolicy,
    cursor: Option<<D::Statement as Statement>::Cursor>,
}

impl<D: Driver> std::fmt::Debug for SqlQuery<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlQuery")
            .field("info", &self.core.info)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> SqlQuery<D> {
    pub(crate) fn new(
        stmt: D::Statement,
        info: Arc<SqlInfo>,
        config: Arc<dyn BindConfig + Send + Sync>,
        record_mapper: NameMapper,
        executed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            core: StatementCore::new(stmt, info, config, record_mapper, executed),
            column_mapper: None,
            policy: MappingPolicy::Fail,
            cursor: None,
        }
    }

    binding_api!();

    /// Sets the column-to-field mapper used when materializing. Beware of
    /// the direction: from column labels to record fields (or map keys).
    pub fn with_mapper(mut self, mapper: NameMapper) -> Self {
        self.column_mapper = Some(mapper);
        self
    }

    pub fn with_policy(mut self, policy: MappingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Execute the query if it has not run yet. The first execution binds
    /// all accumulated values and opens the cursor; later calls are no-ops,
    /// the statement is not re-executed.
    pub fn execute(&mut self) -> Result<&mut Self> {
        if self.cursor.is_none() {
            self.core.apply_bindings()?;
            let cursor = self.core.stmt.execute_query()?;
            self.core.mark_executed();
            self.cursor = Some(cursor);
        }
        Ok(self)
    }

    fn cursor(&mut self) -> Result<&mut <D::Statement as Statement>::Cursor> {
        self.execute()?;
        self.cursor
            .as_mut()
            .ok_or_else(|| Error::msg("query produced no cursor"))
    }

    /// A typed materializer over this query's cursor.
    pub fn beanifier<R: SqlRecord + 'static>(
        &mut self,
    ) -> Result<BeanExtractor<'_, R, <D::Statement as Statement>::Cursor>> {
        let mapper = self.column_mapper.clone().unwrap_or_default();
        let policy = self.policy;
        self.execute()?;
        let cursor = self
            .cursor
            .as_mut()
            .ok_or_else(|| Error::msg("query produced no cursor"))?;
        BeanExtractor::new(cursor, &mapper, policy)
    }

    /// A generic map materializer over this query's cursor. Without a
    /// mapper, column labels pass through raw.
    pub fn mappifier(&mut self) -> Result<MapExtractor<'_, <D::Statement as Statement>::Cursor>> {
        let mapper = self.column_mapper.clone();
        self.execute()?;
        let cursor = self
            .cursor
            .as_mut()
            .ok_or_else(|| Error::msg("query produced no cursor"))?;
        Ok(MapExtractor::new(cursor, mapper.as_ref()))
    }

    /// The value of the first column in the next row, coerced to `T`.
    /// `Ok(None)` once there are no more rows.
    pub fn lookup<T: AsValue>(&mut self) -> Result<Option<T>> {
        let Some(values) = self.cursor()?.next_row()? else {
            return Ok(None);
        };
        match values.into_iter().next() {
            Some(value) => T::try_from_value(value).map(Some),
            None => Ok(None),
        }
    }

    /// Clears all bindings and allows the statement to be re-executed with
    /// new values.
    pub fn reset(&mut self) -> Result<&mut Self> {
        self.core.reset();
        self.cursor = None;
        Ok(self)
    }
}

/// Executes an INSERT statement, optionally in batch over a collection of
/// records, and can retrieve the driver-generated key afterwards.
pub struct SqlInsert<D: Driver> {
    core: StatementCore<D::Statement>,
}

impl<D: Driver> SqlInsert<D> {
    pub(crate) fn new(
        stmt: D::Statement,
        info: Arc<SqlInfo>,
        config: Arc<dyn BindConfig + Send + Sync>,
        record_mapper: NameMapper,
        executed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            core: StatementCore::new(stmt, info, config, record_mapper, executed),
        }
    }

    binding_api!();

    /// Bind the accumulated values and execute; returns the affected count.
    pub fn execute(&mut self) -> Result<u64> {
        self.core.apply_bindings()?;
        let affected = self.core.stmt.execute()?;
        self.core.mark_executed();
        Ok(affected)
    }

    /// Execute, then retrieve the driver-generated key, coerced to `T`.
    pub fn execute_and_get_key<T: AsValue>(&mut self) -> Result<Option<T>> {
        self.execute()?;
        match self.core.stmt.generated_key()? {
            Some(value) => T::try_from_value(value).map(Some),
            None => Ok(None),
        }
    }

    /// Insert a collection of records: one bind-and-add-to-batch cycle per
    /// element over the same prepared statement, then a single batch
    /// execution. A record missing a value for any parameter fails before
    /// the batch is executed. Batch insertion is exclusive of single
    /// binding: values accumulated via `bind` and friends must be cleared
    /// with `reset()` first.
    pub fn insert_batch<'a, R, I>(&mut self, records: I) -> Result<u64>
    where
        R: SqlRecord + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        self.core.check_fresh()?;
        if !self.core.bindings.is_empty() {
            return Err(Error::msg(
                "batch insertion cannot be combined with singly bound values; call reset() first",
            ));
        }
        for record in records {
            let source = RecordSource::new(record, &self.core.record_mapper);
            bind_all(
                &mut self.core.stmt,
                &self.core.info,
                &source,
                self.core.config.as_ref(),
            )?;
            self.core.stmt.add_batch()?;
        }
        let affected = self.core.stmt.execute_batch()?;
        self.core.mark_executed();
        self.core.fresh = false;
        Ok(affected)
    }

    pub fn reset(&mut self) -> Result<&mut Self> {
        self.core.reset();
        Ok(self)
    }
}

/// Executes an UPDATE or DELETE statement.
pub struct SqlUpdate<D: Driver> {
    core: StatementCore<D::Statement>,
}

impl<D: Driver> SqlUpdate<D> {
    pub(crate) fn new(
        stmt: D::Statement,
        info: Arc<SqlInfo>,
        config: Arc<dyn BindConfig + Send + Sync>,
        record_mapper: NameMapper,
        executed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            core: StatementCore::new(stmt, info, config, record_mapper, executed),
        }
    }

    binding_api!();

    /// Bind the accumulated values and execute; returns the affected count.
    pub fn execute(&mut self) -> Result<u64> {
        self.core.apply_bindings()?;
        let affected = self.core.stmt.execute()?;
        self.core.mark_executed();
        Ok(affected)
    }

    pub fn reset(&mut self) -> Result<&mut Self> {
        self.core.reset();
        Ok(self)
    }
}
