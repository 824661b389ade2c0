//! The seam between business logic and the remote CRM
//!
//! Implementations never return errors: reads degrade to `None`, writes to an
//! unsuccessful [`OperationResult`]. Failure messages are kept so the UI can
//! show them.

use async_trait::async_trait;

use super::models::{FieldValue, FieldValueScope, ListEntry, Organization};
use super::operations::{Operation, OperationResult};

#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Up to `page_size` entries of a list. `None` when the request failed.
    async fn list_entries(&self, list_id: i64, page_size: u32) -> Option<Vec<ListEntry>>;

    /// Field values owned by a person, entity or list entry
    async fn field_values(&self, scope: FieldValueScope) -> Option<Vec<FieldValue>>;

    async fn organization(&self, organization_id: i64) -> Option<Organization>;

    async fn execute(&self, operation: Operation) -> OperationResult;

    /// Drain failure messages recorded since the last call
    fn take_errors(&self) -> Vec<String> {
        Vec::new()
    }
}
