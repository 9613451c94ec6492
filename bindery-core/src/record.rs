use crate::{Result, Value};

/// Capability contract for structured objects whose fields can be read by
/// the binder and written by the materializer.
///
/// Implementations are an explicit per-type descriptor built once as
/// `'static` data rather than per-call introspection; in practice they come
/// from `#[derive(SqlRecord)]`. Field coercion goes through
/// [`crate::AsValue`] in both directions, so a record field of type `i64`
/// accepts an `Int32` column and vice versa, range permitting.
pub trait SqlRecord: Sized {
    /// Field identifiers, in declaration order.
    fn fields() -> &'static [&'static str];

    /// A record with every field at its default, ready to be populated.
    fn empty() -> Self;

    /// Write one field, coercing `value` to the field's type.
    /// Unknown field names are an error; the materializer never passes one.
    fn set_field(&mut self, field: &str, value: Value) -> Result<()>;

    /// Read one field as a [`Value`]. `None` for unknown field names.
    fn get_field(&self, field: &str) -> Option<Value>;
}
