use crate::{NameMapper, Result, SqlError, SqlInfo, SqlRecord, SqlType, Statement, Value};
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Binding configuration, consulted by the binder for every parameter.
///
/// Pure and stateless per call; it never mutates the [`SqlInfo`]. All
/// methods have defaults describing the stock behaviour, so a configuration
/// overrides only what it cares about:
///
/// ```rust
/// use bindery_core::{BindConfig, SqlType, Value};
///
/// struct StatusAsText;
/// impl BindConfig for StatusAsText {
///     fn enum_as_string(&self, parameter: &str) -> bool {
///         parameter == "status"
///     }
/// }
/// ```
pub trait BindConfig {
    /// Whether enum values for `parameter` bind as their textual form. The
    /// default is `false`: enums bind as their ordinal.
    fn enum_as_string(&self, _parameter: &str) -> bool {
        false
    }

    /// Force a specific SQL datatype for `parameter` given the value about
    /// to be bound. `None` leaves the choice to the default type mapping.
    fn sql_type(&self, _parameter: &str, _value: &Value) -> Option<SqlType> {
        None
    }
}

/// The configuration that overrides nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBindConfig;

impl BindConfig for DefaultBindConfig {}

/// A source of values for named parameters: a flat name -> value map, or a
/// structured record accessed through a name mapper.
pub trait ParamSource {
    /// The value for `parameter`, or `None` when the source has no entry for
    /// it. An explicit NULL is `Some(Value::Null)` (or a typed NULL), never
    /// `None`.
    fn value_of(&self, parameter: &str) -> Option<Value>;
}

impl ParamSource for HashMap<String, Value> {
    fn value_of(&self, parameter: &str) -> Option<Value> {
        self.get(parameter).cloned()
    }
}

impl ParamSource for BTreeMap<String, Value> {
    fn value_of(&self, parameter: &str) -> Option<Value> {
        self.get(parameter).cloned()
    }
}

/// A small ordered name -> value builder for one-off binds.
#[derive(Debug, Clone, Default)]
pub struct Params(Vec<(String, Value)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, parameter: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((parameter.into(), value.into()));
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl ParamSource for Params {
    fn value_of(&self, parameter: &str) -> Option<Value> {
        // Later entries win, like re-binding the same name.
        self.0
            .iter()
            .rev()
            .find(|(n, _)| n == parameter)
            .map(|(_, v)| v.clone())
    }
}

/// Adapts a [`SqlRecord`] to the [`ParamSource`] capability. The mapper runs
/// in the field-to-parameter direction: a parameter matches the record field
/// whose mapped name equals it.
pub struct RecordSource<'a, R: SqlRecord> {
    record: &'a R,
    mapper: &'a NameMapper,
    include: Option<&'a [&'a str]>,
    exclude: &'a [&'a str],
}

impl<'a, R: SqlRecord> RecordSource<'a, R> {
    pub fn new(record: &'a R, mapper: &'a NameMapper) -> Self {
        Self {
            record,
            mapper,
            include: None,
            exclude: &[],
        }
    }

    /// Restrict the source to the named fields.
    pub fn only(mut self, fields: &'a [&'a str]) -> Self {
        self.include = Some(fields);
        self
    }

    /// Exclude the named fields from the source.
    pub fn except(mut self, fields: &'a [&'a str]) -> Self {
        self.exclude = fields;
        self
    }

    fn allowed(&self, field: &str) -> bool {
        self.include.is_none_or(|fields| fields.contains(&field))
            && !self.exclude.contains(&field)
    }
}

impl<R: SqlRecord> ParamSource for RecordSource<'_, R> {
    fn value_of(&self, parameter: &str) -> Option<Value> {
        R::fields()
            .iter()
            .find(|field| self.allowed(field) && self.mapper.map(field) == parameter)
            .and_then(|field| self.record.get_field(field))
    }
}

/// Resolve the driver-level form of one value: enums are lowered to their
/// ordinal or textual form, then any configured SQL type override applies.
pub(crate) fn lower(parameter: &str, value: Value, config: &dyn BindConfig) -> (Value, SqlType) {
    let value = match value {
        Value::Enum(v) if config.enum_as_string(parameter) => {
            Value::Varchar(v.map(|e| e.label.into_owned()))
        }
        Value::Enum(v) => Value::Int32(v.map(|e| e.ordinal)),
        v => v,
    };
    let sql_type = config
        .sql_type(parameter, &value)
        .unwrap_or_else(|| value.sql_type());
    (value, sql_type)
}

/// Fill every placeholder position of `stmt` from `source`.
///
/// Resolution happens for all parameters before the statement is touched: a
/// parameter without a value fails with [`SqlError::UnboundParameter`] and
/// the statement receives no partial binding. Each resolved value is then
/// applied at every position its name occupies.
pub fn bind_all<S: Statement>(
    stmt: &mut S,
    info: &SqlInfo,
    source: &dyn ParamSource,
    config: &dyn BindConfig,
) -> Result<()> {
    let mut resolved = Vec::with_capacity(info.parameters().len());
    for parameter in info.parameters() {
        let value = source.value_of(parameter.name()).ok_or_else(|| {
            crate::Error::from(SqlError::UnboundParameter {
                parameter: parameter.name().to_owned(),
            })
        })?;
        let (value, sql_type) = lower(parameter.name(), value, config);
        resolved.push((parameter, value, sql_type));
    }
    debug!(
        "Binding {} parameter(s) over {} position(s)",
        resolved.len(),
        info.placeholder_count()
    );
    for (parameter, value, sql_type) in resolved {
        for &position in parameter.positions() {
            stmt.set_parameter(position, &value, sql_type)?;
        }
    }
    Ok(())
}
