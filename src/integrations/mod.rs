//! External service integrations.

pub mod lookups {
    pub use crate::clients::*;
}

pub mod storage {
    pub use crate::db::*;
    pub use crate::db_storage::*;
}
