//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus `Deserialize` DTOs for inserts and patches where
//! the table is written through the API.

pub mod layout;
pub mod page;
pub mod page_version;
pub mod status;
pub mod theme;
