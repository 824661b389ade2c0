//! Project raw field values onto display names

use serde_json::Value;
use std::collections::HashMap;

use crate::api::FieldValue;
use crate::config::FieldMap;

/// Display name → value
pub type FormattedValues = HashMap<String, Value>;

/// Build the display-name projection of an entry's field values.
///
/// Field ids missing from the map are dropped. When several records share a
/// field id the last one with a payload wins.
pub fn extract_formatted_values(values: &[FieldValue], map: &FieldMap) -> FormattedValues {
    let mut formatted = FormattedValues::new();
    for field_value in values {
        let Some(name) = map.name(field_value.field_id) else {
            continue;
        };
        if let Some(payload) = field_value.payload() {
            formatted.insert(name.to_string(), payload.clone());
        }
    }
    formatted
}
