pub use bindery_core::*;
pub use bindery_macros::{SqlEnum, SqlRecord};
