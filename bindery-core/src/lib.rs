mod as_value;
mod bind;
mod driver;
mod error;
mod extract;
mod name_map;
mod normalize;
mod record;
mod row;
mod sql;
mod statement;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use bind::*;
pub use driver::*;
pub use error::*;
pub use extract::*;
pub use name_map::*;
pub use normalize::*;
pub use record::*;
pub use row::*;
pub use sql::*;
pub use statement::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
