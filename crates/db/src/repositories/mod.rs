//! Repository layer.
//!
//! Each repository is a zero-sized struct of async functions. Functions that
//! run a single statement take any `PgExecutor`, so the engine can call them
//! with `&PgPool` for reads or `&mut *tx` inside its unit of work.

pub mod layout_repo;
pub mod page_repo;
pub mod page_version_repo;
pub mod theme_repo;

pub use layout_repo::LayoutRepo;
pub use page_repo::PageRepo;
pub use page_version_repo::PageVersionRepo;
pub use theme_repo::ThemeRepo;
