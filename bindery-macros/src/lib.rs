mod record;
mod sql_enum;

use proc_macro::TokenStream;
use record::sql_record;
use sql_enum::sql_enum;
use syn::{ItemEnum, ItemStruct, parse_macro_input};

/// Derives [`SqlRecord`] for a struct with named fields, making it bindable
/// as a bag of named parameters and materializable from a result cursor.
///
/// Every field type must implement `AsValue`, `Clone` and `Default`. The
/// logical field name defaults to the Rust identifier and can be overridden
/// per field:
///
/// ```rust,ignore
/// #[derive(SqlRecord)]
/// struct Person {
///     id: Option<i64>,
///     #[field_name("firstName")]
///     first_name: String,
///     #[field_name("lastName")]
///     last_name: String,
/// }
/// ```
#[proc_macro_derive(SqlRecord, attributes(field_name))]
pub fn derive_sql_record(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    sql_record(&item).into()
}

/// Derives [`AsValue`] for a fieldless enum, carrying it as `Value::Enum`
/// with the declaration index as ordinal and the variant name as label.
/// Whether the ordinal or the label reaches the driver is decided at bind
/// time by `BindConfig::enum_as_string`.
#[proc_macro_derive(SqlEnum)]
pub fn derive_sql_enum(input: TokenStream) -> TokenStream {
    let item: ItemEnum = parse_macro_input!(input as ItemEnum);
    sql_enum(&item).into()
}
