pub mod config;
pub mod dump;
pub mod queue;
pub mod summary;
