//! Writing review outcomes back to Affinity
//!
//! Tracking is a four-step saga without rollback: owner, reviewer, a new
//! entry in the tracking list, then the owner field on that new entry. A
//! partial failure is logged with the steps that did go through so it can be
//! fixed by hand.

use log::{debug, error, info, warn};
use serde_json::{Value, json};

use super::deal::{Deal, TrackingStatus};
use crate::api::{CrmGateway, FieldValue, Operation, OperationResult};
use crate::config::FieldRoles;

/// Where a field write lands
#[derive(Debug, Clone, Copy)]
pub struct EntryTarget<'a> {
    pub list_entry_id: i64,
    pub entity_id: i64,
    /// The entry's current field values, scanned for an existing record
    pub field_values: &'a [FieldValue],
}

impl<'a> From<&'a Deal> for EntryTarget<'a> {
    fn from(deal: &'a Deal) -> Self {
        Self {
            list_entry_id: deal.id(),
            entity_id: deal.entity_id(),
            field_values: &deal.field_values,
        }
    }
}

/// Update the field's existing record, or create one
pub async fn set_field(
    gateway: &dyn CrmGateway,
    target: EntryTarget<'_>,
    field_id: i64,
    value: Value,
) -> OperationResult {
    let operation = match target.field_values.iter().find(|fv| fv.field_id == field_id) {
        Some(existing) => Operation::update_field_value(existing.id, value),
        None => Operation::create_field_value(
            field_id,
            target.entity_id,
            Some(target.list_entry_id),
            value,
        ),
    };
    gateway.execute(operation).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStep {
    Owner,
    Reviewed,
    CrossList,
    CrossListOwner,
}

impl TrackStep {
    pub fn label(&self) -> &'static str {
        match self {
            TrackStep::Owner => "owner set",
            TrackStep::Reviewed => "reviewer set",
            TrackStep::CrossList => "added to tracking list",
            TrackStep::CrossListOwner => "tracking list owner set",
        }
    }
}

fn labels(steps: &[TrackStep]) -> String {
    steps.iter().map(TrackStep::label).collect::<Vec<_>>().join(", ")
}

/// What the user is told after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Success(String),
    Warning(String),
    Failure(String),
}

impl ActionOutcome {
    /// Success and warnings move the queue forward
    pub fn advances(&self) -> bool {
        !matches!(self, ActionOutcome::Failure(_))
    }

    pub fn message(&self) -> &str {
        match self {
            ActionOutcome::Success(m) | ActionOutcome::Warning(m) | ActionOutcome::Failure(m) => m,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackReport {
    pub completed: Vec<TrackStep>,
    pub failed: Vec<TrackStep>,
    pub cross_list_entry_id: Option<i64>,
}

impl TrackReport {
    fn record(&mut self, step: TrackStep, ok: bool) {
        if ok {
            self.completed.push(step);
        } else {
            self.failed.push(step);
        }
    }

    pub fn outcome(&self, deal_name: &str, person: &str) -> ActionOutcome {
        if self.failed.is_empty() {
            ActionOutcome::Success(format!("Tracked {} for {}", deal_name, person))
        } else if self.failed == [TrackStep::CrossListOwner] {
            ActionOutcome::Warning(format!(
                "Tracked {} for {}, but the tracking list owner update failed",
                deal_name, person
            ))
        } else if self.completed.is_empty() {
            ActionOutcome::Failure(format!("Failed to track {}", deal_name))
        } else {
            ActionOutcome::Failure(format!(
                "Tracking {} failed ({}); already applied: {}. Fix manually in Affinity.",
                deal_name,
                labels(&self.failed),
                labels(&self.completed)
            ))
        }
    }
}

/// Applies track and pass actions for one configuration
pub struct FieldUpdater<'a> {
    gateway: &'a dyn CrmGateway,
    roles: &'a FieldRoles,
    tracking_list_id: i64,
}

impl<'a> FieldUpdater<'a> {
    pub fn new(gateway: &'a dyn CrmGateway, roles: &'a FieldRoles, tracking_list_id: i64) -> Self {
        Self {
            gateway,
            roles,
            tracking_list_id,
        }
    }

    /// Write a field on the deal and mirror it locally when accepted
    async fn write_deal_field(&self, deal: &mut Deal, field_id: i64, name: &str, value: Value) -> bool {
        match deal.existing_field_value(field_id) {
            Some(existing) => debug!("Updating {} (field value {})", name, existing.id),
            None => debug!("Creating {} on entry {}", name, deal.id()),
        }
        let result = set_field(self.gateway, EntryTarget::from(&*deal), field_id, value.clone()).await;
        if result.is_success() {
            deal.apply_field_write(field_id, name, value, result.data.as_ref());
        }
        result.is_success()
    }

    pub async fn track_entry(&self, deal: &mut Deal, person_id: i64) -> TrackReport {
        let mut report = TrackReport::default();
        let person = json!(person_id);
        info!("Tracking entry {} for person {}", deal.id(), person_id);

        let owner = self.roles.owner.clone();
        let ok = self
            .write_deal_field(deal, self.roles.owner_id, &owner, person.clone())
            .await;
        report.record(TrackStep::Owner, ok);

        let reviewed = self.roles.reviewed.clone();
        let ok = self
            .write_deal_field(deal, self.roles.reviewed_id, &reviewed, person.clone())
            .await;
        report.record(TrackStep::Reviewed, ok);

        let created = self
            .gateway
            .execute(Operation::create_list_entry(self.tracking_list_id, deal.entity_id()))
            .await;
        report.record(TrackStep::CrossList, created.is_success());

        if created.is_success() {
            deal.tracking_status = TrackingStatus::Yes;
            report.cross_list_entry_id = created.created_id();

            let ok = match report.cross_list_entry_id {
                Some(new_entry_id) => {
                    let target = EntryTarget {
                        list_entry_id: new_entry_id,
                        entity_id: deal.entity_id(),
                        field_values: &[],
                    };
                    set_field(self.gateway, target, self.roles.tracking_owner_id, person)
                        .await
                        .is_success()
                }
                None => {
                    warn!("Tracking list entry created without an id in the response");
                    false
                }
            };
            report.record(TrackStep::CrossListOwner, ok);
        }

        if !report.failed.is_empty() && !report.completed.is_empty() {
            error!(
                "Partial tracking of entry {} (entity {}): completed [{}], failed [{}]; needs a manual fix",
                deal.id(),
                deal.entity_id(),
                labels(&report.completed),
                labels(&report.failed)
            );
        }
        report
    }

    /// Mark the deal reviewed by the pass identity
    pub async fn pass_entry(&self, deal: &mut Deal, pass_id: i64) -> ActionOutcome {
        info!("Passing on entry {}", deal.id());
        let reviewed = self.roles.reviewed.clone();
        if self
            .write_deal_field(deal, self.roles.reviewed_id, &reviewed, json!(pass_id))
            .await
        {
            ActionOutcome::Success(format!("Passed on {}", deal.name()))
        } else {
            ActionOutcome::Failure(format!("Failed to pass on {}", deal.name()))
        }
    }
}
