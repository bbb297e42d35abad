pub mod pages;
pub mod publication;
pub mod registry;
pub mod site;
pub mod versions;
