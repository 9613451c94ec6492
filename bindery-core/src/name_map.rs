use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Pure column-label to target-identifier translation, injected wherever
/// result columns meet record fields (materialization) or record fields meet
/// named parameters (record binding).
///
/// The default is [`NameMapper::AsIs`]: no translation at all.
#[derive(Clone, Default)]
pub enum NameMapper {
    /// Identity mapping.
    #[default]
    AsIs,
    /// `FIRST_NAME` / `first_name` -> `firstName`.
    SnakeToCamel,
    /// `firstName` / `FirstName` -> `first_name`.
    CamelToSnakeLower,
    /// `firstName` / `FirstName` -> `FIRST_NAME`.
    CamelToSnakeUpper,
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl NameMapper {
    pub fn map(&self, name: &str) -> String {
        match self {
            NameMapper::AsIs => name.to_owned(),
            NameMapper::SnakeToCamel => snake_to_camel(name),
            NameMapper::CamelToSnakeLower => camel_to_snake(name, false),
            NameMapper::CamelToSnakeUpper => camel_to_snake(name, true),
            NameMapper::Custom(f) => f(name),
        }
    }

    /// Identity of this mapper for conversion-plan caches. Stock mappers
    /// compare by variant; custom mappers by their closure allocation, which
    /// the key holds a strong reference to — the address cannot be recycled
    /// for another closure while a cache entry still carries it.
    pub(crate) fn cache_key(&self) -> MapperKey {
        match self {
            NameMapper::AsIs => MapperKey::Stock(0),
            NameMapper::SnakeToCamel => MapperKey::Stock(1),
            NameMapper::CamelToSnakeLower => MapperKey::Stock(2),
            NameMapper::CamelToSnakeUpper => MapperKey::Stock(3),
            NameMapper::Custom(f) => MapperKey::Custom(f.clone()),
        }
    }
}

#[derive(Clone)]
pub(crate) enum MapperKey {
    Stock(u8),
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl PartialEq for MapperKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MapperKey::Stock(a), MapperKey::Stock(b)) => a == b,
            (MapperKey::Custom(a), MapperKey::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for MapperKey {}

impl Hash for MapperKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            MapperKey::Stock(v) => {
                state.write_u8(0);
                state.write_u8(*v);
            }
            MapperKey::Custom(f) => {
                state.write_u8(1);
                (Arc::as_ptr(f) as *const () as usize).hash(state);
            }
        }
    }
}

impl fmt::Debug for NameMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NameMapper::AsIs => "AsIs",
            NameMapper::SnakeToCamel => "SnakeToCamel",
            NameMapper::CamelToSnakeLower => "CamelToSnakeLower",
            NameMapper::CamelToSnakeUpper => "CamelToSnakeUpper",
            NameMapper::Custom(..) => "Custom(..)",
        };
        f.write_str(name)
    }
}

fn snake_to_camel(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !result.is_empty();
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

fn camel_to_snake(name: &str, upper: bool) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c.is_uppercase() && previous_lower {
            result.push('_');
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        if upper {
            result.extend(c.to_uppercase());
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_to_camel_mapping() {
        let mapper = NameMapper::SnakeToCamel;
        assert_eq!(mapper.map("first_name"), "firstName");
        assert_eq!(mapper.map("FIRST_NAME"), "firstName");
        assert_eq!(mapper.map("age"), "age");
        assert_eq!(mapper.map("_leading"), "leading");
    }

    #[test]
    fn camel_to_snake_mapping() {
        assert_eq!(NameMapper::CamelToSnakeLower.map("firstName"), "first_name");
        assert_eq!(NameMapper::CamelToSnakeUpper.map("firstName"), "FIRST_NAME");
        assert_eq!(NameMapper::CamelToSnakeUpper.map("PascalCase"), "PASCAL_CASE");
        assert_eq!(NameMapper::CamelToSnakeLower.map("age"), "age");
    }

    #[test]
    fn custom_mapping() {
        let mapper = NameMapper::Custom(std::sync::Arc::new(|name| format!("x_{name}")));
        assert_eq!(mapper.map("id"), "x_id");
    }
}
