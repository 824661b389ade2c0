//! Turning raw list entries into display-ready deals

use log::{debug, info, warn};
use std::collections::VecDeque;

use super::deal::{Deal, TrackingStatus};
use super::extract::extract_formatted_values;
use crate::api::{CrmGateway, FieldValueScope, ListEntry};
use crate::config::FieldMap;

/// Page size used for the single list-entries fetch
pub const DEFAULT_PAGE_SIZE: u32 = 250;

/// Attaches field values and cross-list membership to entries
pub struct Enricher<'a> {
    gateway: &'a dyn CrmGateway,
    field_map: &'a FieldMap,
    tracking_list_id: i64,
}

impl<'a> Enricher<'a> {
    pub fn new(gateway: &'a dyn CrmGateway, field_map: &'a FieldMap, tracking_list_id: i64) -> Self {
        Self {
            gateway,
            field_map,
            tracking_list_id,
        }
    }

    pub async fn enrich(&self, entry: ListEntry) -> Deal {
        let entity_id = entry.entity_id;
        let mut deal = Deal::new(entry);

        match self.gateway.field_values(FieldValueScope::Entity(entity_id)).await {
            Some(values) => deal.field_values = values,
            None => warn!("No field values for entity {}", entity_id),
        }
        deal.formatted_values = extract_formatted_values(&deal.field_values, self.field_map);

        if let Some(org) = self.gateway.organization(entity_id).await {
            if org.is_in_list(self.tracking_list_id) {
                deal.tracking_status = TrackingStatus::Yes;
            }
        }

        debug!(
            "Enriched entry {} ({} fields, tracking {})",
            deal.id(),
            deal.formatted_values.len(),
            deal.tracking_status
        );
        deal
    }
}

/// Sequential, resumable enrichment of one page of list entries.
///
/// The caller pulls one deal at a time with [`EntryLoader::next`], which lets
/// the UI show the first deal and redraw between the rest.
#[derive(Debug, Default)]
pub struct EntryLoader {
    pending: VecDeque<ListEntry>,
    total: usize,
}

impl EntryLoader {
    /// Fetch the page of entries. A failed fetch yields an empty loader.
    pub async fn fetch(gateway: &dyn CrmGateway, list_id: i64, page_size: u32) -> Self {
        let entries = gateway.list_entries(list_id, page_size).await.unwrap_or_default();
        info!("Fetched {} entries from list {}", entries.len(), list_id);
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<ListEntry>) -> Self {
        Self {
            total: entries.len(),
            pending: entries.into(),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn loaded(&self) -> usize {
        self.total - self.pending.len()
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Enrich the next entry, `None` once everything is loaded
    pub async fn next(&mut self, enricher: &Enricher<'_>) -> Option<Deal> {
        let entry = self.pending.pop_front()?;
        Some(enricher.enrich(entry).await)
    }

    /// Drain the loader to completion
    pub async fn load_all(mut self, enricher: &Enricher<'_>) -> Vec<Deal> {
        let mut deals = Vec::with_capacity(self.pending.len());
        while let Some(deal) = self.next(enricher).await {
            deals.push(deal);
            if deals.len() % 25 == 0 {
                info!("Loaded {}/{} deals", deals.len(), self.total);
            }
        }
        deals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockGateway;
    use serde_json::json;

    fn setup() -> (MockGateway, FieldMap) {
        let mock = MockGateway::new();
        mock.set_list_entries(vec![
            json!({"id": 1, "entity_id": 10, "entity": {"name": "Acme"}}),
            json!({"id": 2, "entity_id": 20, "entity": {"name": "Globex"}}),
            json!({"id": 3, "entity_id": 30, "entity": {"name": "Initech"}}),
        ]);
        mock.add_field_values(10, vec![
            json!({"id": 100, "field_id": 1004, "entity_id": 10, "text_value": "Seed & Series A"}),
            json!({"id": 101, "field_id": 9999, "entity_id": 10, "value": "unmapped"}),
        ]);
        mock.set_organization(json!({
            "id": 20,
            "list_entries": [{"id": 7, "list_id": 300}]
        }));
        (mock, FieldMap::from_pairs([(1004, "Deal category")]))
    }

    #[tokio::test]
    async fn test_enrich_entry() {
        let (mock, map) = setup();
        let enricher = Enricher::new(&mock, &map, 300);
        let entry = mock.list_entries(1, 250).await.unwrap().remove(0);

        let deal = enricher.enrich(entry).await;
        assert_eq!(deal.field_values.len(), 2);
        assert_eq!(deal.formatted_values["Deal category"], json!("Seed & Series A"));
        assert_eq!(deal.formatted_values.len(), 1);
        assert_eq!(deal.tracking_status, TrackingStatus::No);
    }

    #[tokio::test]
    async fn test_tracking_membership() {
        let (mock, map) = setup();
        let enricher = Enricher::new(&mock, &map, 300);
        let entry = mock.list_entries(1, 250).await.unwrap().remove(1);
        assert_eq!(enricher.enrich(entry).await.tracking_status, TrackingStatus::Yes);
    }

    #[tokio::test]
    async fn test_loader_incremental() {
        let (mock, map) = setup();
        let enricher = Enricher::new(&mock, &map, 300);
        let mut loader = EntryLoader::fetch(&mock, 1, DEFAULT_PAGE_SIZE).await;
        assert_eq!(loader.total(), 3);
        assert_eq!(loader.loaded(), 0);

        let first = loader.next(&enricher).await.unwrap();
        assert_eq!(first.name(), "Acme");
        assert_eq!(loader.loaded(), 1);
        assert!(!loader.is_complete());

        let rest = loader.load_all(&enricher).await;
        let names: Vec<_> = rest.iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, vec!["Globex", "Initech"]);
    }

    #[tokio::test]
    async fn test_loader_failed_fetch_is_empty() {
        let (mock, map) = setup();
        mock.fail_reads(true);
        let enricher = Enricher::new(&mock, &map, 300);
        let mut loader = EntryLoader::fetch(&mock, 1, DEFAULT_PAGE_SIZE).await;
        assert_eq!(loader.total(), 0);
        assert!(loader.is_complete());
        assert!(loader.next(&enricher).await.is_none());
    }

    #[tokio::test]
    async fn test_enrich_survives_read_failures() {
        let (mock, map) = setup();
        let entry = mock.list_entries(1, 250).await.unwrap().remove(0);
        mock.fail_reads(true);
        let enricher = Enricher::new(&mock, &map, 300);
        let deal = enricher.enrich(entry).await;
        assert!(deal.formatted_values.is_empty());
        assert_eq!(deal.tracking_status, TrackingStatus::No);
    }
}
