use proc_macro2::TokenStream;
use quote::quote;
use syn::{Field, Fields, ItemStruct, LitStr};

/// The logical field name: the Rust identifier, unless overridden with
/// `#[field_name("...")]`.
pub(crate) fn field_name(field: &Field) -> String {
    let default_name = field
        .ident
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    field
        .attrs
        .iter()
        .find_map(|attr| {
            if attr.meta.path().is_ident("field_name") {
                let Ok(v) = attr
                    .meta
                    .require_list()
                    .and_then(|v| v.parse_args::<LitStr>())
                else {
                    panic!(
                        "Error while parsing `field_name`, use it like #[field_name(\"{}\")]",
                        &default_name
                    );
                };
                return Some(v.value());
            }
            None
        })
        .unwrap_or(default_name)
}

pub(crate) fn sql_record(item: &ItemStruct) -> TokenStream {
    let Fields::Named(..) = &item.fields else {
        panic!("SqlRecord can only be derived for structs with named fields");
    };
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let idents: Vec<_> = item.fields.iter().map(|f| f.ident.clone()).collect();
    let names: Vec<String> = item.fields.iter().map(field_name).collect();
    quote! {
        impl #impl_generics ::bindery::SqlRecord for #name #ty_generics #where_clause {
            fn fields() -> &'static [&'static str] {
                &[#(#names),*]
            }
            fn empty() -> Self {
                Self {
                    #(#idents: ::core::default::Default::default()),*
                }
            }
            fn set_field(
                &mut self,
                field: &str,
                value: ::bindery::Value,
            ) -> ::bindery::Result<()> {
                match field {
                    #(#names => {
                        self.#idents = ::bindery::AsValue::try_from_value(value)?;
                        ::core::result::Result::Ok(())
                    })*
                    _ => ::core::result::Result::Err(::bindery::Error::msg(::std::format!(
                        "no field `{}` on `{}`",
                        field,
                        ::core::any::type_name::<Self>(),
                    ))),
                }
            }
            fn get_field(&self, field: &str) -> ::core::option::Option<::bindery::Value> {
                match field {
                    #(#names => ::core::option::Option::Some(::bindery::AsValue::as_value(
                        ::core::clone::Clone::clone(&self.#idents),
                    )),)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}
