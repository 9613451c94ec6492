use proc_macro2::TokenStream;
use quote::quote;
use syn::{Fields, ItemEnum};

pub(crate) fn sql_enum(item: &ItemEnum) -> TokenStream {
    for variant in &item.variants {
        if !matches!(variant.fields, Fields::Unit) {
            panic!(
                "SqlEnum can only be derived for fieldless enums, variant `{}` carries data",
                variant.ident
            );
        }
    }
    let name = &item.ident;
    let variants: Vec<_> = item.variants.iter().map(|v| v.ident.clone()).collect();
    let labels: Vec<String> = variants.iter().map(ToString::to_string).collect();
    let ordinals: Vec<i32> = (0..variants.len() as i32).collect();
    let ordinals_wide: Vec<i64> = (0..variants.len() as i64).collect();
    quote! {
        impl ::bindery::AsValue for #name {
            fn as_empty_value() -> ::bindery::Value {
                ::bindery::Value::Enum(::core::option::Option::None)
            }
            fn as_value(self) -> ::bindery::Value {
                let (ordinal, label) = match self {
                    #(Self::#variants => (#ordinals, #labels),)*
                };
                ::bindery::Value::Enum(::core::option::Option::Some(::bindery::EnumValue {
                    ordinal,
                    label: ::std::borrow::Cow::Borrowed(label),
                }))
            }
            fn try_from_value(value: ::bindery::Value) -> ::bindery::Result<Self> {
                let from_ordinal = |ordinal: i64| match ordinal {
                    #(#ordinals_wide => ::core::option::Option::Some(Self::#variants),)*
                    _ => ::core::option::Option::None,
                };
                let from_label = |label: &str| match label {
                    #(#labels => ::core::option::Option::Some(Self::#variants),)*
                    _ => ::core::option::Option::None,
                };
                let found = match &value {
                    ::bindery::Value::Enum(::core::option::Option::Some(v)) => {
                        from_ordinal(v.ordinal as i64).or_else(|| from_label(&v.label))
                    }
                    ::bindery::Value::Varchar(::core::option::Option::Some(v)) => from_label(v),
                    ::bindery::Value::Int8(::core::option::Option::Some(v)) => {
                        from_ordinal(*v as i64)
                    }
                    ::bindery::Value::Int16(::core::option::Option::Some(v)) => {
                        from_ordinal(*v as i64)
                    }
                    ::bindery::Value::Int32(::core::option::Option::Some(v)) => {
                        from_ordinal(*v as i64)
                    }
                    ::bindery::Value::Int64(::core::option::Option::Some(v)) => from_ordinal(*v),
                    ::bindery::Value::UInt8(::core::option::Option::Some(v)) => {
                        from_ordinal(*v as i64)
                    }
                    ::bindery::Value::UInt16(::core::option::Option::Some(v)) => {
                        from_ordinal(*v as i64)
                    }
                    ::bindery::Value::UInt32(::core::option::Option::Some(v)) => {
                        from_ordinal(*v as i64)
                    }
                    ::bindery::Value::UInt64(::core::option::Option::Some(v)) => {
                        i64::try_from(*v).ok().and_then(from_ordinal)
                    }
                    _ => ::core::option::Option::None,
                };
                found.ok_or_else(|| {
                    ::bindery::Error::from(::bindery::SqlError::Coercion {
                        value: ::std::format!("{value:?}"),
                        target: ::core::any::type_name::<Self>(),
                    })
                })
            }
        }
        impl ::core::convert::From<#name> for ::bindery::Value {
            fn from(value: #name) -> Self {
                ::bindery::AsValue::as_value(value)
            }
        }
    }
}
