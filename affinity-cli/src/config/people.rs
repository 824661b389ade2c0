//! Person name ↔ Affinity person id

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One `[[people]]` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonConfig {
    pub name: String,
    pub id: i64,
    /// Shown in the track picker
    #[serde(default = "default_assignable")]
    pub assignable: bool,
}

fn default_assignable() -> bool {
    true
}

/// Bidirectional lookup between display names and person ids
#[derive(Debug, Clone, Default)]
pub struct PersonDirectory {
    by_name: HashMap<String, i64>,
    by_id: HashMap<i64, String>,
    assignable: Vec<String>,
}

impl PersonDirectory {
    pub fn new(people: &[PersonConfig]) -> Result<Self> {
        let mut directory = Self::default();
        for person in people {
            if directory.by_name.contains_key(&person.name) {
                bail!("Person \"{}\" is listed twice in [[people]]", person.name);
            }
            if let Some(existing) = directory.by_id.get(&person.id) {
                bail!(
                    "Person id {} is used by both \"{}\" and \"{}\" in [[people]]",
                    person.id,
                    existing,
                    person.name
                );
            }
            directory.by_name.insert(person.name.clone(), person.id);
            directory.by_id.insert(person.id, person.name.clone());
            if person.assignable {
                directory.assignable.push(person.name.clone());
            }
        }
        Ok(directory)
    }

    pub fn id_of(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Names offered when tracking, in configuration order
    pub fn assignable(&self) -> &[String] {
        &self.assignable
    }

    /// Render a person-typed field value: a known id becomes its name
    pub fn display(&self, value: &Value) -> Option<String> {
        let id = match value {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.parse().ok()?,
            _ => return None,
        };
        self.name_of(id).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn people() -> Vec<PersonConfig> {
        vec![
            PersonConfig { name: "Alice".into(), id: 1, assignable: true },
            PersonConfig { name: "Pass".into(), id: 9, assignable: false },
            PersonConfig { name: "Bob".into(), id: 2, assignable: true },
        ]
    }

    #[test]
    fn test_lookup_both_ways() {
        let dir = PersonDirectory::new(&people()).unwrap();
        assert_eq!(dir.id_of("Bob"), Some(2));
        assert_eq!(dir.name_of(9), Some("Pass"));
        assert_eq!(dir.id_of("Carol"), None);
    }

    #[test]
    fn test_assignable_order() {
        let dir = PersonDirectory::new(&people()).unwrap();
        assert_eq!(dir.assignable(), &["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn test_display_value() {
        let dir = PersonDirectory::new(&people()).unwrap();
        assert_eq!(dir.display(&json!(1)), Some("Alice".into()));
        assert_eq!(dir.display(&json!("2")), Some("Bob".into()));
        assert_eq!(dir.display(&json!(77)), None);
        assert_eq!(dir.display(&json!({"id": 1})), None);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut list = people();
        list.push(PersonConfig { name: "Alice".into(), id: 3, assignable: true });
        assert!(PersonDirectory::new(&list).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut list = people();
        list.push(PersonConfig { name: "Carol".into(), id: 2, assignable: true });
        let err = PersonDirectory::new(&list).unwrap_err();
        assert!(err.to_string().contains("Person id 2"));
    }
}
