//! Resolved, validated configuration shared by every command

use anyhow::{Context, Result};

use crate::config::{Config, FieldMap, FieldRoles, PersonDirectory};

pub struct AppContext {
    pub config: Config,
    pub field_map: FieldMap,
    pub roles: FieldRoles,
    pub people: PersonDirectory,
    /// Person id written to the reviewed field when passing
    pub pass_id: i64,
}

impl AppContext {
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let field_map = config.field_map();
        let roles = config.fields.roles(&field_map)?;
        let people = PersonDirectory::new(&config.people)?;
        let pass_id = people
            .id_of(&config.pass_person)
            .with_context(|| format!("Unknown pass person: {}", config.pass_person))?;
        Ok(Self {
            config,
            field_map,
            roles,
            people,
            pass_id,
        })
    }

    pub fn deals_list(&self) -> i64 {
        self.config.lists.deals
    }

    pub fn tracking_list(&self) -> i64 {
        self.config.lists.tracking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TEMPLATE;

    #[test]
    fn test_from_template() {
        let ctx = AppContext::from_config(Config::from_toml(TEMPLATE).unwrap()).unwrap();
        assert_eq!(ctx.pass_id, 500000);
        assert_eq!(ctx.roles.owner, "Owner");
        assert_eq!(ctx.roles.reviewed, "Reviewed by");
        assert_eq!(ctx.deals_list(), 259534);
        assert_eq!(ctx.tracking_list(), 259535);
        assert_eq!(ctx.people.assignable(), ["Alice Example", "Bob Example"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::from_toml(TEMPLATE).unwrap();
        config.fields.owner = 4242;
        assert!(AppContext::from_config(config).is_err());
    }
}
