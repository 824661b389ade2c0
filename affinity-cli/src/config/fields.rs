//! Field id ↔ display name mapping and the fields the app gives meaning to

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One `[[fields.map]]` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub id: i64,
    pub name: String,
}

/// `[fields]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldsConfig {
    /// Field holding the deal owner (a person id)
    pub owner: i64,
    /// Field holding who reviewed the deal (a person id, or the pass identity)
    pub reviewed: i64,
    /// Owner field on the tracking list, set on newly created entries
    pub tracking_owner: i64,
    /// Display names of the fields the filters and summary read
    pub profile: String,
    pub category: String,
    pub date: String,
    pub round_size: String,
    #[serde(default)]
    pub map: Vec<FieldMapping>,
}

/// Static mapping from field id to canonical display name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    names: HashMap<i64, String>,
}

impl FieldMap {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            names: pairs.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.values().any(|n| n == name)
    }
}

impl From<&[FieldMapping]> for FieldMap {
    fn from(mappings: &[FieldMapping]) -> Self {
        Self::from_pairs(mappings.iter().map(|m| (m.id, m.name.clone())))
    }
}

/// The resolved ids and display names of the fields with special meaning
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRoles {
    pub owner_id: i64,
    pub owner: String,
    pub reviewed_id: i64,
    pub reviewed: String,
    pub tracking_owner_id: i64,
    pub profile: String,
    pub category: String,
    pub date: String,
    pub round_size: String,
}

impl FieldRoles {
    /// Fields whose values are person ids
    pub fn is_person_field(&self, name: &str) -> bool {
        name == self.owner || name == self.reviewed
    }
}

impl FieldsConfig {
    /// Resolve the configured roles against the field map
    pub fn roles(&self, map: &FieldMap) -> Result<FieldRoles> {
        let Some(owner) = map.name(self.owner) else {
            bail!("Owner field {} is missing from [[fields.map]]", self.owner);
        };
        let Some(reviewed) = map.name(self.reviewed) else {
            bail!("Reviewed field {} is missing from [[fields.map]]", self.reviewed);
        };

        for (role, name) in [
            ("profile", &self.profile),
            ("category", &self.category),
            ("date", &self.date),
            ("round_size", &self.round_size),
        ] {
            if !map.contains_name(name) {
                bail!("fields.{} = \"{}\" is not a name in [[fields.map]]", role, name);
            }
        }

        Ok(FieldRoles {
            owner_id: self.owner,
            owner: owner.to_string(),
            reviewed_id: self.reviewed,
            reviewed: reviewed.to_string(),
            tracking_owner_id: self.tracking_owner,
            profile: self.profile.clone(),
            category: self.category.clone(),
            date: self.date.clone(),
            round_size: self.round_size.clone(),
        })
    }
}
