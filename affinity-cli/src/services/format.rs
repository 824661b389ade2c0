//! Display formatting for field values

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::config::{FieldRoles, PersonDirectory};

/// Placeholder for absent values
pub const EMPTY: &str = "-";

/// Human readable form of an arbitrary field payload
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => EMPTY.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Dropdowns come back as {"id": .., "text": ..}, entities as {"name": ..}
        Value::Object(obj) => ["text", "name"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Numeric reading of a money-ish payload (`2500000`, `"2,500,000"`, `"$2500000"`)
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    }
}

fn compact(amount: f64) -> String {
    let formatted = format!("{:.1}", amount);
    formatted.trim_end_matches(".0").to_string()
}

/// `2500000` → `$2.5m`, absent → `-`
pub fn format_round_size(value: Option<&Value>) -> String {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return EMPTY.to_string();
    };
    let Some(amount) = parse_amount(value) else {
        return display_value(value);
    };

    let abs = amount.abs();
    if abs >= 1_000_000_000.0 {
        format!("${}b", compact(amount / 1_000_000_000.0))
    } else if abs >= 1_000_000.0 {
        format!("${}m", compact(amount / 1_000_000.0))
    } else if abs >= 1_000.0 {
        format!("${}k", compact(amount / 1_000.0))
    } else {
        format!("${}", compact(amount))
    }
}

/// Accepts RFC 3339 timestamps and anything starting with `YYYY-MM-DD`
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// `2026-10-19T..` → `19 Oct 2026`; unparsable dates are shown raw
pub fn format_date(value: Option<&Value>) -> String {
    match value.filter(|v| !v.is_null()) {
        None => EMPTY.to_string(),
        Some(v) => match parse_date(v) {
            Some(date) => date.format("%d %b %Y").to_string(),
            None => display_value(v),
        },
    }
}

/// Render a named field the way the queue card shows it
pub fn display_field(name: &str, value: &Value, roles: &FieldRoles, people: &PersonDirectory) -> String {
    if name == roles.round_size {
        format_round_size(Some(value))
    } else if name == roles.date {
        format_date(Some(value))
    } else if roles.is_person_field(name) {
        people.display(value).unwrap_or_else(|| display_value(value))
    } else {
        display_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, TEMPLATE};
    use serde_json::json;

    #[test]
    fn test_round_size() {
        assert_eq!(format_round_size(Some(&json!(2500000))), "$2.5m");
        assert_eq!(format_round_size(Some(&json!(3000000))), "$3m");
        assert_eq!(format_round_size(Some(&json!(750000))), "$750k");
        assert_eq!(format_round_size(Some(&json!(2000000000))), "$2b");
        assert_eq!(format_round_size(Some(&json!(500))), "$500");
        assert_eq!(format_round_size(Some(&json!("2,500,000"))), "$2.5m");
    }

    #[test]
    fn test_round_size_absent() {
        assert_eq!(format_round_size(None), "-");
        assert_eq!(format_round_size(Some(&Value::Null)), "-");
        assert_eq!(format_round_size(Some(&json!("undisclosed"))), "undisclosed");
    }

    #[test]
    fn test_dates() {
        assert_eq!(format_date(Some(&json!("2026-10-19"))), "19 Oct 2026");
        assert_eq!(
            format_date(Some(&json!("2015-12-11T02:26:56.537-08:00"))),
            "11 Dec 2015"
        );
        assert_eq!(format_date(Some(&json!("2024-03-01 10:00:00"))), "01 Mar 2024");
        assert_eq!(format_date(Some(&json!("next week"))), "next week");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_display_value_shapes() {
        assert_eq!(display_value(&json!({"id": 3, "text": "B2B"})), "B2B");
        assert_eq!(display_value(&json!({"id": 3, "name": "Acme"})), "Acme");
        assert_eq!(display_value(&json!(["a", {"text": "b"}])), "a, b");
        assert_eq!(display_value(&json!(12)), "12");
        assert_eq!(display_value(&Value::Null), "-");
    }

    #[test]
    fn test_display_field_roles() {
        let config = Config::from_toml(TEMPLATE).unwrap();
        let roles = config.fields.roles(&config.field_map()).unwrap();
        let people = PersonDirectory::new(&config.people).unwrap();

        assert_eq!(display_field("Round size", &json!(2500000), &roles, &people), "$2.5m");
        assert_eq!(display_field("Owner", &json!(500001), &roles, &people), "Alice Example");
        assert_eq!(display_field("Reviewed by", &json!(42), &roles, &people), "42");
        assert_eq!(display_field("Date added", &json!("2026-01-02"), &roles, &people), "02 Jan 2026");
        assert_eq!(display_field("Description", &json!("Robots"), &roles, &people), "Robots");
    }
}
