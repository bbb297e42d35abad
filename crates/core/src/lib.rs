pub mod batch;
pub mod content_ref;
pub mod diff;
pub mod error;
pub mod hierarchy;
pub mod hostname;
pub mod inheritance;
pub mod publication;
pub mod registry;
pub mod types;
pub mod versioning;
pub mod widget_types;
