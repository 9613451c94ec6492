use crate::{Error, Result, SqlError, Value};
use atoi::{FromRadix10Checked, FromRadix10SignedChecked};
use fast_float::parse_partial;
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use std::{any, str::FromStr};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`]
/// representation that backs query parameters and row decoding.
///
/// # Conversion contract
/// - `as_value` wraps the receiver in its canonical `Value` variant without
///   lossy transformations.
/// - `try_from_value` accepts the canonical variant, performs range-checked
///   numeric widening/narrowing for alternate widths, and falls back to
///   parsing `Value::Varchar` where a textual form is unambiguous. Failures
///   are reported as [`SqlError::Coercion`].
///
/// # Parsing contract
/// - `parse` delegates to `extract` then verifies the input is exhausted,
///   guarding against trailing garbage like `123abc`.
/// - `extract` updates the input slice only on success.
pub trait AsValue {
    /// A NULL of this type's canonical `Value` variant.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse a full string into `Self` delegating to [`AsValue::extract`].
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        let mut rest = input.as_ref();
        let result = Self::extract(&mut rest)?;
        if !rest.is_empty() {
            return Err(Error::msg(format!(
                "Value `{}` parsed as {} but did not consume all the input (remaining: `{rest}`)",
                input.as_ref(),
                any::type_name::<Self>(),
            )));
        }
        Ok(result)
    }
    /// Parse a prefix of `value`, advancing the slice past the consumed part.
    fn extract(value: &mut &str) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::msg(format!(
            "Cannot parse `{value}` as {}",
            any::type_name::<Self>()
        )))
    }
}

pub(crate) fn coercion(value: &Value, target: &'static str) -> Error {
    SqlError::Coercion {
        value: format!("{value:?}"),
        target,
    }
    .into()
}

/// Lossless view of any integer variant, used for cross-width conversions.
fn integer_of(value: &Value) -> Option<i128> {
    match value {
        Value::Int8(Some(v)) => Some(*v as i128),
        Value::Int16(Some(v)) => Some(*v as i128),
        Value::Int32(Some(v)) => Some(*v as i128),
        Value::Int64(Some(v)) => Some(*v as i128),
        Value::UInt8(Some(v)) => Some(*v as i128),
        Value::UInt16(Some(v)) => Some(*v as i128),
        Value::UInt32(Some(v)) => Some(*v as i128),
        Value::UInt64(Some(v)) => Some(*v as i128),
        _ => None,
    }
}

macro_rules! impl_integer_as_value {
    ($source:ty, $variant:path, $radix_trait:ident, $from_radix:ident) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let $variant(Some(v)) = value {
                    return Ok(v);
                }
                if let Some(wide) = integer_of(&value) {
                    return <$source>::try_from(wide)
                        .map_err(|_| coercion(&value, any::type_name::<Self>()));
                }
                match value {
                    Value::Varchar(Some(ref v)) => {
                        Self::parse(v).map_err(|_| coercion(&value, any::type_name::<Self>()))
                    }
                    _ => Err(coercion(&value, any::type_name::<Self>())),
                }
            }
            fn extract(input: &mut &str) -> Result<Self> {
                let (parsed, used) = <$source as $radix_trait>::$from_radix(input.as_bytes());
                match parsed {
                    Some(v) if used > 0 => {
                        *input = &input[used..];
                        Ok(v)
                    }
                    _ => Err(Error::msg(format!(
                        "Cannot extract {} from `{input}`",
                        any::type_name::<Self>()
                    ))),
                }
            }
        }
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                $variant(Some(value))
            }
        }
    };
}

impl_integer_as_value!(i8, Value::Int8, FromRadix10SignedChecked, from_radix_10_signed_checked);
impl_integer_as_value!(i16, Value::Int16, FromRadix10SignedChecked, from_radix_10_signed_checked);
impl_integer_as_value!(i32, Value::Int32, FromRadix10SignedChecked, from_radix_10_signed_checked);
impl_integer_as_value!(i64, Value::Int64, FromRadix10SignedChecked, from_radix_10_signed_checked);
impl_integer_as_value!(u8, Value::UInt8, FromRadix10Checked, from_radix_10_checked);
impl_integer_as_value!(u16, Value::UInt16, FromRadix10Checked, from_radix_10_checked);
impl_integer_as_value!(u32, Value::UInt32, FromRadix10Checked, from_radix_10_checked);
impl_integer_as_value!(u64, Value::UInt64, FromRadix10Checked, from_radix_10_checked);

macro_rules! impl_float_as_value {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $variant(Some(v)) => Ok(v),
                    Value::Float32(Some(v)) => Ok(v as $source),
                    Value::Float64(Some(v)) => Ok(v as $source),
                    Value::Decimal(Some(v)) => v
                        .to_f64()
                        .map(|v| v as $source)
                        .ok_or_else(|| coercion(&Value::Decimal(Some(v)), any::type_name::<Self>())),
                    Value::Varchar(Some(ref v)) => {
                        Self::parse(v).map_err(|_| coercion(&value, any::type_name::<Self>()))
                    }
                    _ => match integer_of(&value) {
                        Some(wide) => Ok(wide as $source),
                        None => Err(coercion(&value, any::type_name::<Self>())),
                    },
                }
            }
            fn extract(input: &mut &str) -> Result<Self> {
                let (parsed, used) = parse_partial::<$source, _>(input.as_bytes())
                    .map_err(|_| {
                        Error::msg(format!(
                            "Cannot extract {} from `{input}`",
                            any::type_name::<Self>()
                        ))
                    })?;
                *input = &input[used..];
                Ok(parsed)
            }
        }
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                $variant(Some(value))
            }
        }
    };
}

impl_float_as_value!(f32, Value::Float32);
impl_float_as_value!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => match v.as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(coercion(&value, "bool")),
            },
            _ => match integer_of(&value) {
                Some(wide) => Ok(wide != 0),
                None => Err(coercion(&value, "bool")),
            },
        }
    }
    fn extract(input: &mut &str) -> Result<Self> {
        for (token, result) in [("true", true), ("false", false)] {
            if input.starts_with(token) {
                *input = &input[token.len()..];
                return Ok(result);
            }
        }
        Err(Error::msg(format!("Cannot extract bool from `{input}`")))
    }
}
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(Some(value))
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Enum(Some(v)) => Ok(v.label.into_owned()),
            Value::Uuid(Some(v)) => Ok(v.to_string()),
            _ => Err(coercion(&value, "String")),
        }
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Varchar(Some(value))
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.to_owned()))
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Float32(Some(v)) => {
                Decimal::from_f32(v).ok_or_else(|| coercion(&value, "Decimal"))
            }
            Value::Float64(Some(v)) => {
                Decimal::from_f64(v).ok_or_else(|| coercion(&value, "Decimal"))
            }
            Value::Varchar(Some(ref v)) => {
                Decimal::from_str(v).map_err(|_| coercion(&value, "Decimal"))
            }
            _ => match integer_of(&value) {
                Some(wide) => Decimal::from_i128(wide).ok_or_else(|| coercion(&value, "Decimal")),
                None => Err(coercion(&value, "Decimal")),
            },
        }
    }
}
impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(Some(value))
    }
}

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const TIMESTAMP_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
];

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(ref v)) => {
                Date::parse(v, DATE_FORMAT).map_err(|_| coercion(&value, "time::Date"))
            }
            _ => Err(coercion(&value, "time::Date")),
        }
    }
}
impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(Some(value))
    }
}

impl AsValue for Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.time()),
            Value::Varchar(Some(ref v)) => {
                Time::parse(v, TIME_FORMAT).map_err(|_| coercion(&value, "time::Time"))
            }
            _ => Err(coercion(&value, "time::Time")),
        }
    }
}
impl From<Time> for Value {
    fn from(value: Time) -> Self {
        Value::Time(Some(value))
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::Date(Some(v)) => Ok(v.midnight()),
            Value::Varchar(Some(ref v)) => TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| PrimitiveDateTime::parse(v, format).ok())
                .ok_or_else(|| coercion(&value, "time::PrimitiveDateTime")),
            _ => Err(coercion(&value, "time::PrimitiveDateTime")),
        }
    }
}
impl From<PrimitiveDateTime> for Value {
    fn from(value: PrimitiveDateTime) -> Self {
        Value::Timestamp(Some(value))
    }
}

impl AsValue for OffsetDateTime {
    fn as_empty_value() -> Value {
        Value::TimestampWithTimezone(None)
    }
    fn as_value(self) -> Value {
        Value::TimestampWithTimezone(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::TimestampWithTimezone(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => OffsetDateTime::parse(v, &Rfc3339)
                .map_err(|_| coercion(&value, "time::OffsetDateTime")),
            _ => Err(coercion(&value, "time::OffsetDateTime")),
        }
    }
}
impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Value::TimestampWithTimezone(Some(value))
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => {
                Uuid::parse_str(v).map_err(|_| coercion(&value, "uuid::Uuid"))
            }
            _ => Err(coercion(&value, "uuid::Uuid")),
        }
    }
}
impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(Some(value))
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
            _ => Err(coercion(&value, "Box<[u8]>")),
        }
    }
}
impl From<Box<[u8]>> for Value {
    fn from(value: Box<[u8]>) -> Self {
        Value::Blob(Some(value))
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}
impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(Some(value.into_boxed_slice()))
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}
impl<T: AsValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.as_value()
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_value(value).map(Box::new)
    }
}

impl AsValue for Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}
