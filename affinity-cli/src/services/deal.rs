//! A list entry enriched for review

use serde::Serialize;
use serde_json::Value;

use super::extract::FormattedValues;
use super::format::display_value;
use crate::api::{FieldValue, ListEntry};
use crate::config::FieldRoles;

/// Whether the deal's organization already sits in the tracking list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TrackingStatus {
    Yes,
    #[default]
    No,
}

impl std::fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingStatus::Yes => write!(f, "Yes"),
            TrackingStatus::No => write!(f, "No"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    pub entry: ListEntry,
    /// Raw records, kept to decide between update and create on writes
    pub field_values: Vec<FieldValue>,
    pub formatted_values: FormattedValues,
    pub tracking_status: TrackingStatus,
}

impl Deal {
    pub fn new(entry: ListEntry) -> Self {
        Self {
            entry,
            field_values: Vec::new(),
            formatted_values: FormattedValues::new(),
            tracking_status: TrackingStatus::No,
        }
    }

    /// List entry id
    pub fn id(&self) -> i64 {
        self.entry.id
    }

    pub fn entity_id(&self) -> i64 {
        self.entry.entity_id
    }

    pub fn name(&self) -> &str {
        self.entry.entity.name.as_deref().unwrap_or("(unnamed)")
    }

    pub fn domain(&self) -> Option<&str> {
        self.entry.entity.domain.as_deref()
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.formatted_values.get(field)
    }

    /// Display text of a field, `None` when absent
    pub fn text(&self, field: &str) -> Option<String> {
        self.value(field).map(display_value)
    }

    pub fn is_reviewed(&self, roles: &FieldRoles) -> bool {
        self.formatted_values.contains_key(&roles.reviewed)
    }

    /// Linear scan for an existing record of a field
    pub fn existing_field_value(&self, field_id: i64) -> Option<&FieldValue> {
        self.field_values.iter().find(|fv| fv.field_id == field_id)
    }

    /// Mirror a successful remote write locally.
    ///
    /// An existing record is rewritten in place; otherwise the record the API
    /// returned (if it parses) is appended so later writes update it.
    pub fn apply_field_write(&mut self, field_id: i64, name: &str, value: Value, response: Option<&Value>) {
        if let Some(existing) = self.field_values.iter_mut().find(|fv| fv.field_id == field_id) {
            existing.text_value = None;
            existing.number_value = None;
            existing.date_value = None;
            existing.value = Some(value.clone());
        } else if let Some(created) = response
            .cloned()
            .and_then(|data| serde_json::from_value::<FieldValue>(data).ok())
        {
            self.field_values.push(created);
        }
        self.formatted_values.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deal() -> Deal {
        let entry: ListEntry = serde_json::from_value(json!({
            "id": 1, "entity_id": 10,
            "entity": {"name": "Acme", "domain": "acme.com"}
        }))
        .unwrap();
        let mut deal = Deal::new(entry);
        deal.field_values = serde_json::from_value(json!([
            {"id": 100, "field_id": 1001, "entity_id": 10, "text_value": "old"}
        ]))
        .unwrap();
        deal
    }

    #[test]
    fn test_accessors() {
        let deal = deal();
        assert_eq!(deal.name(), "Acme");
        assert_eq!(deal.domain(), Some("acme.com"));
        assert_eq!(deal.tracking_status.to_string(), "No");
        assert_eq!(deal.existing_field_value(1001).map(|fv| fv.id), Some(100));
        assert!(deal.existing_field_value(1002).is_none());
    }

    #[test]
    fn test_apply_write_updates_existing() {
        let mut deal = deal();
        deal.apply_field_write(1001, "Owner", json!(5), None);
        assert_eq!(deal.field_values.len(), 1);
        assert_eq!(deal.field_values[0].payload(), Some(&json!(5)));
        assert_eq!(deal.value("Owner"), Some(&json!(5)));
    }

    #[test]
    fn test_apply_write_appends_created() {
        let mut deal = deal();
        let response = json!({"id": 200, "field_id": 1002, "entity_id": 10, "value": 5});
        deal.apply_field_write(1002, "Reviewed by", json!(5), Some(&response));
        assert_eq!(deal.existing_field_value(1002).map(|fv| fv.id), Some(200));
        assert_eq!(deal.text("Reviewed by").as_deref(), Some("5"));
    }

    #[test]
    fn test_apply_write_without_parsable_response() {
        let mut deal = deal();
        deal.apply_field_write(1002, "Reviewed by", json!(5), Some(&json!({"ok": true})));
        assert_eq!(deal.field_values.len(), 1);
        assert!(deal.formatted_values.contains_key("Reviewed by"));
    }
}
