use rust_decimal::Decimal;
use std::borrow::Cow;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed SQL value.
///
/// Every variant wraps an `Option` so that a NULL keeps its column type: a
/// `Value::Int32(None)` is a NULL integer, distinguishable from a NULL
/// varchar. [`Value::Null`] is the fully untyped null used when nothing
/// better is known.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    /// An application enum, kept symbolic until bind time so the binder can
    /// choose between its ordinal and its textual form.
    Enum(Option<EnumValue>),
}

/// The two representations of an enum constant. Which one reaches the driver
/// is decided by [`crate::BindConfig::enum_as_string`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub ordinal: i32,
    pub label: Cow<'static, str>,
}

/// Driver-level SQL datatype codes, exposed through cursor column metadata
/// and usable as bind-time overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Varchar,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    Uuid,
    Other,
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::Enum(v) => v.is_none(),
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    /// Default mapping from the value's runtime type to a SQL datatype.
    /// Consulted by the binder when no override applies. Enums default to
    /// their ordinal form, hence `Integer`.
    pub fn sql_type(&self) -> SqlType {
        match self {
            Value::Null => SqlType::Other,
            Value::Boolean(..) => SqlType::Boolean,
            Value::Int8(..) | Value::UInt8(..) => SqlType::TinyInt,
            Value::Int16(..) | Value::UInt16(..) => SqlType::SmallInt,
            Value::Int32(..) | Value::UInt32(..) => SqlType::Integer,
            Value::Int64(..) | Value::UInt64(..) => SqlType::BigInt,
            Value::Float32(..) => SqlType::Real,
            Value::Float64(..) => SqlType::Double,
            Value::Decimal(..) => SqlType::Decimal,
            Value::Varchar(..) => SqlType::Varchar,
            Value::Blob(..) => SqlType::Blob,
            Value::Date(..) => SqlType::Date,
            Value::Time(..) => SqlType::Time,
            Value::Timestamp(..) => SqlType::Timestamp,
            Value::TimestampWithTimezone(..) => SqlType::TimestampWithTimezone,
            Value::Uuid(..) => SqlType::Uuid,
            Value::Enum(..) => SqlType::Integer,
        }
    }
}
