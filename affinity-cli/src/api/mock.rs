//! Scriptable in-memory gateway for tests

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

use super::gateway::CrmGateway;
use super::models::{FieldValue, FieldValueScope, ListEntry, Organization};
use super::operations::{Operation, OperationResult};

type FailRule = Box<dyn Fn(&Operation) -> bool + Send + Sync>;

#[derive(Default)]
struct MockState {
    list_entries: Vec<Value>,
    field_values: HashMap<i64, Vec<Value>>,
    organizations: HashMap<i64, Value>,
    fail_reads: bool,
    calls: HashMap<&'static str, usize>,
    operations: Vec<Operation>,
    next_id: i64,
}

pub struct MockGateway {
    state: Mutex<MockState>,
    fail_rule: Mutex<Option<FailRule>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1000,
                ..MockState::default()
            }),
            fail_rule: Mutex::new(None),
        }
    }

    pub fn set_list_entries(&self, entries: Vec<Value>) {
        self.state.lock().unwrap().list_entries = entries;
    }

    /// Field values returned for an entity id
    pub fn add_field_values(&self, entity_id: i64, values: Vec<Value>) {
        self.state
            .lock()
            .unwrap()
            .field_values
            .insert(entity_id, values);
    }

    pub fn set_organization(&self, organization: Value) {
        let id = organization["id"].as_i64().unwrap();
        self.state.lock().unwrap().organizations.insert(id, organization);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    /// Writes matching the predicate come back as HTTP 500
    pub fn fail_on(&self, rule: impl Fn(&Operation) -> bool + Send + Sync + 'static) {
        *self.fail_rule.lock().unwrap() = Some(Box::new(rule));
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().unwrap().operations.clone()
    }

    fn record(&self, method: &'static str) -> bool {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(method).or_insert(0) += 1;
        state.fail_reads
    }
}

#[async_trait]
impl CrmGateway for MockGateway {
    async fn list_entries(&self, _list_id: i64, page_size: u32) -> Option<Vec<ListEntry>> {
        if self.record("list_entries") {
            return None;
        }
        let state = self.state.lock().unwrap();
        Some(
            state
                .list_entries
                .iter()
                .take(page_size as usize)
                .map(|v| serde_json::from_value(v.clone()).unwrap())
                .collect(),
        )
    }

    async fn field_values(&self, scope: FieldValueScope) -> Option<Vec<FieldValue>> {
        if self.record("field_values") {
            return None;
        }
        let (_, id) = scope.query_param();
        let state = self.state.lock().unwrap();
        Some(
            state
                .field_values
                .get(&id)
                .map(|values| {
                    values
                        .iter()
                        .map(|v| serde_json::from_value(v.clone()).unwrap())
                        .collect()
                })
                .unwrap_or_default(),
        )
    }

    async fn organization(&self, organization_id: i64) -> Option<Organization> {
        if self.record("organization") {
            return None;
        }
        let state = self.state.lock().unwrap();
        let raw = state
            .organizations
            .get(&organization_id)
            .cloned()
            .unwrap_or_else(|| json!({"id": organization_id, "list_entries": []}));
        Some(serde_json::from_value(raw).unwrap())
    }

    async fn execute(&self, operation: Operation) -> OperationResult {
        self.record("execute");
        let failed = self
            .fail_rule
            .lock()
            .unwrap()
            .as_ref()
            .map(|rule| rule(&operation))
            .unwrap_or(false);

        let mut state = self.state.lock().unwrap();
        state.operations.push(operation.clone());
        if failed {
            return OperationResult::from_status(operation, 500, None);
        }

        state.next_id += 1;
        let id = state.next_id;
        let data = match &operation {
            Operation::CreateFieldValue {
                field_id,
                entity_id,
                list_entry_id,
                value,
            } => json!({
                "id": id,
                "field_id": field_id,
                "entity_id": entity_id,
                "list_entry_id": list_entry_id,
                "value": value,
            }),
            Operation::UpdateFieldValue {
                field_value_id,
                value,
            } => json!({"id": field_value_id, "value": value}),
            Operation::CreateListEntry { list_id, entity_id } => {
                json!({"id": id, "list_id": list_id, "entity_id": entity_id})
            }
        };
        let status = match operation {
            Operation::UpdateFieldValue { .. } => 200,
            _ => 201,
        };
        OperationResult::from_status(operation, status, Some(data))
    }
}
