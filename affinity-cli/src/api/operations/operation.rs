//! Core Operation types for Affinity writes

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A single write that can be sent to the Affinity API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a new field value
    /// POST /field-values
    CreateFieldValue {
        field_id: i64,
        /// Entity (organization/person) the value belongs to
        entity_id: i64,
        /// List entry for list-specific fields
        list_entry_id: Option<i64>,
        value: Value,
    },
    /// Replace the value of an existing field value
    /// PUT /field-values/{id}
    UpdateFieldValue { field_value_id: i64, value: Value },
    /// Add an entity to a list
    /// POST /lists/{list_id}/list-entries
    CreateListEntry { list_id: i64, entity_id: i64 },
}

/// Result of executing an Operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    /// The operation that was executed
    pub operation: Operation,
    /// Whether the operation succeeded
    pub success: bool,
    /// Response body, when it parsed as JSON
    pub data: Option<Value>,
    /// Error message if operation failed
    pub error: Option<String>,
    /// HTTP status code from the response
    pub status_code: Option<u16>,
}

impl Operation {
    pub fn create_field_value(
        field_id: i64,
        entity_id: i64,
        list_entry_id: Option<i64>,
        value: Value,
    ) -> Self {
        Self::CreateFieldValue {
            field_id,
            entity_id,
            list_entry_id,
            value,
        }
    }

    pub fn update_field_value(field_value_id: i64, value: Value) -> Self {
        Self::UpdateFieldValue {
            field_value_id,
            value,
        }
    }

    pub fn create_list_entry(list_id: i64, entity_id: i64) -> Self {
        Self::CreateListEntry { list_id, entity_id }
    }

    /// Get the HTTP method for this operation
    pub fn http_method(&self) -> &'static str {
        match self {
            Self::CreateFieldValue { .. } => "POST",
            Self::UpdateFieldValue { .. } => "PUT",
            Self::CreateListEntry { .. } => "POST",
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::CreateFieldValue { .. } => "create_field_value",
            Self::UpdateFieldValue { .. } => "update_field_value",
            Self::CreateListEntry { .. } => "create_list_entry",
        }
    }

    /// Path relative to the API base URL
    pub fn path(&self) -> String {
        match self {
            Self::CreateFieldValue { .. } => "/field-values".to_string(),
            Self::UpdateFieldValue { field_value_id, .. } => {
                format!("/field-values/{}", field_value_id)
            }
            Self::CreateListEntry { list_id, .. } => format!("/lists/{}/list-entries", list_id),
        }
    }

    /// JSON request body
    pub fn body(&self) -> Value {
        match self {
            Self::CreateFieldValue {
                field_id,
                entity_id,
                list_entry_id,
                value,
            } => {
                let mut body = json!({
                    "field_id": field_id,
                    "entity_id": entity_id,
                    "value": value,
                });
                if let Some(list_entry_id) = list_entry_id {
                    body["list_entry_id"] = json!(list_entry_id);
                }
                body
            }
            Self::UpdateFieldValue { value, .. } => json!({ "value": value }),
            Self::CreateListEntry { entity_id, .. } => json!({ "entity_id": entity_id }),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.http_method(), self.path())
    }
}

impl OperationResult {
    /// Build a result from an HTTP status; 200 and 201 count as success
    pub fn from_status(operation: Operation, status: u16, data: Option<Value>) -> Self {
        let success = matches!(status, 200 | 201);
        let error = if success {
            None
        } else {
            Some(format!("{} returned HTTP {}", operation, status))
        };
        Self {
            operation,
            success,
            data,
            error,
            status_code: Some(status),
        }
    }

    /// Create a new error result for a request that never got a response
    pub fn error(operation: Operation, error: String) -> Self {
        Self {
            operation,
            success: false,
            data: None,
            error: Some(error),
            status_code: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The `id` of the record the API returned, if any
    pub fn created_id(&self) -> Option<i64> {
        self.data.as_ref()?.get("id")?.as_i64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_field_value_body() {
        let op = Operation::create_field_value(10, 99, Some(7), json!(555));
        assert_eq!(op.http_method(), "POST");
        assert_eq!(op.path(), "/field-values");
        assert_eq!(
            op.body(),
            json!({"field_id": 10, "entity_id": 99, "list_entry_id": 7, "value": 555})
        );
    }

    #[test]
    fn test_create_field_value_without_entry() {
        let op = Operation::create_field_value(10, 99, None, json!("x"));
        assert!(op.body().get("list_entry_id").is_none());
    }

    #[test]
    fn test_update_and_list_entry_paths() {
        let op = Operation::update_field_value(42, json!("Pass"));
        assert_eq!(op.http_method(), "PUT");
        assert_eq!(op.path(), "/field-values/42");
        assert_eq!(op.body(), json!({"value": "Pass"}));
        assert_eq!(op.to_string(), "PUT /field-values/42");

        let op = Operation::create_list_entry(300, 99);
        assert_eq!(op.path(), "/lists/300/list-entries");
        assert_eq!(op.body(), json!({"entity_id": 99}));
        assert_eq!(op.operation_type(), "create_list_entry");
    }

    #[test]
    fn test_result_status_mapping() {
        let op = Operation::create_list_entry(1, 2);
        assert!(OperationResult::from_status(op.clone(), 200, None).is_success());
        assert!(OperationResult::from_status(op.clone(), 201, None).is_success());

        let failed = OperationResult::from_status(op.clone(), 204, None);
        assert!(!failed.is_success());
        assert_eq!(failed.status_code, Some(204));
        assert!(failed.error.unwrap().contains("HTTP 204"));

        let failed = OperationResult::from_status(op, 422, None);
        assert!(!failed.is_success());
    }

    #[test]
    fn test_created_id() {
        let op = Operation::create_list_entry(1, 2);
        let result = OperationResult::from_status(op.clone(), 201, Some(json!({"id": 77})));
        assert_eq!(result.created_id(), Some(77));

        let result = OperationResult::error(op, "connection refused".into());
        assert_eq!(result.created_id(), None);
    }
}
