//! Background worker driving the publication batch jobs.

pub mod config;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use scheduler::PublicationScheduler;
