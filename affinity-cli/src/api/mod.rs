//! Affinity CRM API Module
//!
//! Typed records, the authenticated HTTP client, the write operations it can
//! perform and a TTL cache that sits in front of the read calls. Everything
//! above this module talks to the CRM through the [`CrmGateway`] trait.

pub mod cache;
pub mod client;
pub mod gateway;
pub mod models;
pub mod operations;

#[cfg(test)]
pub mod mock;

pub use cache::{CacheConfig, CachedGateway};
pub use client::{AffinityClient, DEFAULT_BASE_URL};
pub use gateway::CrmGateway;
pub use models::{FieldValue, FieldValueScope, ListEntry};
pub use operations::{Operation, OperationResult};
