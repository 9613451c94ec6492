use crate::{
    BindConfig, Connection, DefaultBindConfig, Driver, NameMapper, Result, SqlCache, SqlError,
    SqlInfo, SqlInsert, SqlQuery, SqlUpdate,
};
use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        Arc, LazyLock,
        atomic::{AtomicBool, Ordering},
    },
};

static CACHE: LazyLock<SqlCache> = LazyLock::new(SqlCache::new);

fn prepare_info<C: Connection>(conn: &mut C, text: &str) -> Result<Arc<SqlInfo>> {
    CACHE.get_or_normalize(text, conn.driver().placeholder())
}

/// A piece of SQL with named parameters, the entry point of this crate.
///
/// Holds text only; nothing happens until a statement wrapper is requested
/// against a connection. The same `Sql` can produce any number of wrappers,
/// each with its own bindings; normalization runs once per distinct text and
/// placeholder syntax thanks to the process-wide cache.
///
/// ```rust,ignore
/// let sql = Sql::new("UPDATE person SET last_name = :lastName WHERE id = :id");
/// let affected = sql
///     .update(&mut connection)?
///     .bind("lastName", "Smith")?
///     .bind("id", 42)?
///     .execute()?;
/// ```
#[derive(Clone)]
pub struct Sql {
    text: String,
    config: Arc<dyn BindConfig + Send + Sync>,
    record_mapper: NameMapper,
}

impl Sql {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            config: Arc::new(DefaultBindConfig),
            record_mapper: NameMapper::default(),
        }
    }

    /// Use `config` when binding parameters of statements made from this SQL.
    pub fn with_config(mut self, config: impl BindConfig + Send + Sync + 'static) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Sets the mapper from record fields to parameter names, used when
    /// binding whole records.
    pub fn with_record_mapper(mut self, mapper: NameMapper) -> Self {
        self.record_mapper = mapper;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn query<C: Connection>(&self, conn: &mut C) -> Result<SqlQuery<C::Driver>> {
        let info = prepare_info(conn, &self.text)?;
        let stmt = conn.prepare(info.normalized())?;
        Ok(SqlQuery::new(
            stmt,
            info,
            self.config.clone(),
            self.record_mapper.clone(),
            Arc::new(AtomicBool::new(false)),
        ))
    }

    pub fn insert<C: Connection>(&self, conn: &mut C) -> Result<SqlInsert<C::Driver>> {
        let info = prepare_info(conn, &self.text)?;
        let stmt = conn.prepare(info.normalized())?;
        Ok(SqlInsert::new(
            stmt,
            info,
            self.config.clone(),
            self.record_mapper.clone(),
            Arc::new(AtomicBool::new(false)),
        ))
    }

    pub fn update<C: Connection>(&self, conn: &mut C) -> Result<SqlUpdate<C::Driver>> {
        let info = prepare_info(conn, &self.text)?;
        let stmt = conn.prepare(info.normalized())?;
        Ok(SqlUpdate::new(
            stmt,
            info,
            self.config.clone(),
            self.record_mapper.clone(),
            Arc::new(AtomicBool::new(false)),
        ))
    }
}

impl fmt::Debug for Sql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sql").field("text", &self.text).finish()
    }
}

/// SQL text with `{{name}}` fragment markers, filled in before named
/// parameters are even looked at.
///
/// A template starts out editable: fragments and identifiers can be set and
/// overwritten freely. Requesting a statement wrapper renders and seals it;
/// a sealed template rejects further edits until [`SqlTemplate::unlock`],
/// and once any wrapper made from it has executed it stays sealed for good.
///
/// ```rust,ignore
/// let mut template = SqlTemplate::new(
///     "SELECT * FROM person ORDER BY {{sortColumn}} {{sortOrder}}",
/// );
/// template.set_identifier("sortColumn", "last_name")?;
/// template.set_fragment("sortOrder", "DESC")?;
/// let rows = template.query(&mut connection)?.mappifier()?.mappify_all()?;
/// ```
pub struct SqlTemplate {
    source: String,
    fragments: BTreeMap<String, String>,
    sealed: bool,
    executed: Arc<AtomicBool>,
    config: Arc<dyn BindConfig + Send + Sync>,
    record_mapper: NameMapper,
}

impl SqlTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fragments: BTreeMap::new(),
            sealed: false,
            executed: Arc::new(AtomicBool::new(false)),
            config: Arc::new(DefaultBindConfig),
            record_mapper: NameMapper::default(),
        }
    }

    pub fn with_config(mut self, config: impl BindConfig + Send + Sync + 'static) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn with_record_mapper(mut self, mapper: NameMapper) -> Self {
        self.record_mapper = mapper;
        self
    }

    fn check_editable(&self, operation: &'static str) -> Result<()> {
        if self.sealed {
            Err(SqlError::Sealed { operation }.into())
        } else {
            Ok(())
        }
    }

    /// Substitute `sql` for the `{{name}}` marker. The text is spliced in
    /// verbatim; use [`SqlTemplate::set_identifier`] for table and column
    /// names coming from outside.
    pub fn set_fragment(&mut self, name: &str, sql: impl Into<String>) -> Result<&mut Self> {
        self.check_editable("set a fragment on a sealed template")?;
        self.fragments.insert(name.to_owned(), sql.into());
        Ok(self)
    }

    /// Substitute a quoted identifier for the `{{name}}` marker. The value is
    /// wrapped in double quotes with embedded quotes doubled, so it can only
    /// ever name a table or column.
    pub fn set_identifier(&mut self, name: &str, identifier: &str) -> Result<&mut Self> {
        self.check_editable("set an identifier on a sealed template")?;
        let quoted = format!("\"{}\"", identifier.replace('"', "\"\""));
        self.fragments.insert(name.to_owned(), quoted);
        Ok(self)
    }

    /// Reopen a sealed template for editing. Fails once a statement made from
    /// this template has been executed; the text a live statement was
    /// prepared from must stay what it was.
    pub fn unlock(&mut self) -> Result<&mut Self> {
        if self.executed.load(Ordering::Acquire) {
            return Err(SqlError::Sealed {
                operation: "unlock a template whose statement has executed",
            }
            .into());
        }
        self.sealed = false;
        Ok(self)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// The template text with every `{{name}}` marker replaced by its
    /// fragment. A marker without a fragment fails with
    /// [`SqlError::MissingFragment`].
    pub fn render(&self) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                let offset = self.source.len() - rest.len() + start;
                return Err(SqlError::MalformedSql {
                    reason: "unterminated fragment marker".to_owned(),
                    offset,
                    sql: self.source.clone(),
                }
                .into());
            };
            let name = after[..end].trim();
            match self.fragments.get(name) {
                Some(fragment) => out.push_str(fragment),
                None => {
                    return Err(SqlError::MissingFragment {
                        fragment: name.to_owned(),
                    }
                    .into());
                }
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn render_sealing(&mut self) -> Result<String> {
        let text = self.render()?;
        self.sealed = true;
        Ok(text)
    }

    /// Render, seal and prepare a query statement.
    pub fn query<C: Connection>(&mut self, conn: &mut C) -> Result<SqlQuery<C::Driver>> {
        let text = self.render_sealing()?;
        let info = prepare_info(conn, &text)?;
        let stmt = conn.prepare(info.normalized())?;
        Ok(SqlQuery::new(
            stmt,
            info,
            self.config.clone(),
            self.record_mapper.clone(),
            self.executed.clone(),
        ))
    }

    /// Render, seal and prepare an insert statement.
    pub fn insert<C: Connection>(&mut self, conn: &mut C) -> Result<SqlInsert<C::Driver>> {
        let text = self.render_sealing()?;
        let info = prepare_info(conn, &text)?;
        let stmt = conn.prepare(info.normalized())?;
        Ok(SqlInsert::new(
            stmt,
            info,
            self.config.clone(),
            self.record_mapper.clone(),
            self.executed.clone(),
        ))
    }

    /// Render, seal and prepare an update statement.
    pub fn update<C: Connection>(&mut self, conn: &mut C) -> Result<SqlUpdate<C::Driver>> {
        let text = self.render_sealing()?;
        let info = prepare_info(conn, &text)?;
        let stmt = conn.prepare(info.normalized())?;
        Ok(SqlUpdate::new(
            stmt,
            info,
            self.config.clone(),
            self.record_mapper.clone(),
            self.executed.clone(),
        ))
    }
}

impl fmt::Debug for SqlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlTemplate")
            .field("source", &self.source)
            .field("fragments", &self.fragments)
            .field("sealed", &self.sealed)
            .finish()
    }
}
