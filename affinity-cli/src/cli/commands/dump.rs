//! Raw JSON dump of list entries and their field values

use anyhow::{Context, Result, bail};
use colored::*;
use log::warn;
use serde_json::{Value, json};
use std::path::Path;

use crate::api::FieldValueScope;
use crate::cli::{DumpArgs, build_client, load_context};

/// Field-value scopes fetched for one list entry, keyed by output field
fn entry_scopes(entry: &Value) -> Vec<(&'static str, FieldValueScope)> {
    let mut scopes = Vec::new();
    if let Some(id) = entry.get("entity_id").and_then(Value::as_i64) {
        scopes.push(("field_values", FieldValueScope::Entity(id)));
    }
    if let Some(id) = entry.get("id").and_then(Value::as_i64) {
        scopes.push(("list_entry_field_values", FieldValueScope::ListEntry(id)));
    }
    scopes
}

pub async fn handle_dump_command(config_path: &Path, args: DumpArgs) -> Result<()> {
    let ctx = load_context(config_path)?;
    let client = build_client(&ctx.config)?;
    let list_id = ctx.deals_list();

    let entries = client
        .raw_list_entries(list_id, args.limit)
        .await
        .with_context(|| format!("Failed to fetch list entries for list {}", list_id))?;
    let Some(rows) = entries.as_array().filter(|rows| !rows.is_empty()) else {
        bail!("Failed to fetch list entries or no entries found");
    };

    let mut field_values = Vec::with_capacity(rows.len());
    for entry in rows.iter().take(args.limit as usize) {
        let mut record = json!({
            "list_entry_id": entry.get("id").cloned().unwrap_or(Value::Null),
            "entity_id": entry.get("entity_id").cloned().unwrap_or(Value::Null),
            "field_values": Value::Null,
            "list_entry_field_values": Value::Null,
        });
        for (key, scope) in entry_scopes(entry) {
            record[key] = match client.raw_field_values(scope).await {
                Ok(values) => values,
                Err(e) => {
                    warn!("No field values for {}: {:#}", scope, e);
                    Value::Null
                }
            };
        }
        field_values.push(record);
    }

    let count = field_values.len();
    let mut dump = json!({
        "list_id": list_id,
        "list_entries": entries,
        "field_values": field_values,
    });

    if let Some(person_id) = args.person {
        let values = client
            .raw_field_values(FieldValueScope::Person(person_id))
            .await
            .with_context(|| format!("Failed to fetch field values for person {}", person_id))?;
        dump["person_field_values"] = json!({
            "person_id": person_id,
            "field_values": values,
        });
    }

    eprintln!("{} {} entries from list {}", "Dumped".green(), count, list_id);
    println!(
        "{}",
        serde_json::to_string_pretty(&dump).context("Failed to format JSON output")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_scopes() {
        let scopes = entry_scopes(&json!({"id": 7, "entity_id": 42}));
        assert_eq!(
            scopes,
            vec![
                ("field_values", FieldValueScope::Entity(42)),
                ("list_entry_field_values", FieldValueScope::ListEntry(7)),
            ]
        );
        assert_eq!(scopes[1].1.to_string(), "list_entry_id=7");
    }

    #[test]
    fn test_entry_scopes_without_entity() {
        let scopes = entry_scopes(&json!({"id": 7}));
        assert_eq!(scopes, vec![("list_entry_field_values", FieldValueScope::ListEntry(7))]);
        assert!(entry_scopes(&json!({})).is_empty());
    }
}
