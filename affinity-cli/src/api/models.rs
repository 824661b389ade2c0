//! Affinity record shapes as returned by the v1 REST API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The organization (or person) a list entry points at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

/// A row in an Affinity list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub id: i64,
    #[serde(default)]
    pub list_id: Option<i64>,
    pub entity_id: i64,
    #[serde(default)]
    pub entity: Entity,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A single field value attached to an entity or list entry.
///
/// Depending on the field type the payload lives in one of several keys;
/// use [`FieldValue::payload`] rather than reading them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub id: i64,
    pub field_id: i64,
    #[serde(default)]
    pub entity_id: Option<i64>,
    #[serde(default)]
    pub list_entry_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldValue {
    /// First non-null payload in priority order: text, number, date, generic value
    pub fn payload(&self) -> Option<&Value> {
        [
            &self.text_value,
            &self.number_value,
            &self.date_value,
            &self.value,
        ]
        .into_iter()
        .filter_map(Option::as_ref)
        .find(|v| !v.is_null())
    }
}

/// Minimal list membership reference embedded in an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMembership {
    pub id: i64,
    pub list_id: i64,
}

/// Organization record, used to check cross-list membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub list_entries: Vec<ListMembership>,
}

impl Organization {
    /// Check whether this organization already sits in the given list
    pub fn is_in_list(&self, list_id: i64) -> bool {
        self.list_entries.iter().any(|m| m.list_id == list_id)
    }
}

/// Which owner the field values are fetched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldValueScope {
    Person(i64),
    Entity(i64),
    ListEntry(i64),
}

impl FieldValueScope {
    /// Query parameter understood by `GET /field-values`
    pub fn query_param(&self) -> (&'static str, i64) {
        match self {
            FieldValueScope::Person(id) => ("person_id", *id),
            FieldValueScope::Entity(id) => ("entity_id", *id),
            FieldValueScope::ListEntry(id) => ("list_entry_id", *id),
        }
    }
}

impl std::fmt::Display for FieldValueScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (param, id) = self.query_param();
        write!(f, "{}={}", param, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_value(raw: Value) -> FieldValue {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_payload_priority() {
        let fv = field_value(json!({
            "id": 1, "field_id": 10,
            "text_value": "Seed", "number_value": 5, "value": "ignored"
        }));
        assert_eq!(fv.payload(), Some(&json!("Seed")));

        let fv = field_value(json!({
            "id": 1, "field_id": 10,
            "text_value": null, "number_value": 5, "date_value": "2024-01-01"
        }));
        assert_eq!(fv.payload(), Some(&json!(5)));

        let fv = field_value(json!({
            "id": 1, "field_id": 10,
            "date_value": "2024-01-01", "value": {"id": 3, "text": "B2B"}
        }));
        assert_eq!(fv.payload(), Some(&json!("2024-01-01")));
    }

    #[test]
    fn test_payload_generic_value() {
        let fv = field_value(json!({
            "id": 1, "field_id": 10, "value": {"id": 3, "text": "B2B"}
        }));
        assert_eq!(fv.payload(), Some(&json!({"id": 3, "text": "B2B"})));
    }

    #[test]
    fn test_payload_all_null() {
        let fv = field_value(json!({"id": 1, "field_id": 10, "value": null}));
        assert_eq!(fv.payload(), None);

        let mut fv = field_value(json!({"id": 1, "field_id": 10}));
        fv.text_value = Some(Value::Null);
        assert_eq!(fv.payload(), None);
    }

    #[test]
    fn test_list_entry_minimal_shape() {
        let entry: ListEntry = serde_json::from_value(json!({
            "id": 7, "entity_id": 99
        }))
        .unwrap();
        assert_eq!(entry.entity, Entity::default());
        assert!(entry.created_at.is_none());
    }

    #[test]
    fn test_organization_membership() {
        let org: Organization = serde_json::from_value(json!({
            "id": 99,
            "name": "Acme",
            "list_entries": [{"id": 1, "list_id": 10}, {"id": 2, "list_id": 20}]
        }))
        .unwrap();
        assert!(org.is_in_list(20));
        assert!(!org.is_in_list(30));
    }

    #[test]
    fn test_scope_query_param() {
        assert_eq!(FieldValueScope::Person(4).query_param(), ("person_id", 4));
        assert_eq!(FieldValueScope::Entity(5).to_string(), "entity_id=5");
        assert_eq!(FieldValueScope::ListEntry(6).query_param(), ("list_entry_id", 6));
    }
}
