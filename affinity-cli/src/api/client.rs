//! HTTP client for the Affinity v1 REST API

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

use super::gateway::CrmGateway;
use super::models::{FieldValue, FieldValueScope, ListEntry, Organization};
use super::operations::{Operation, OperationResult};

pub const DEFAULT_BASE_URL: &str = "https://api.affinity.co";

/// Authenticated Affinity client.
///
/// Affinity uses HTTP Basic auth with an empty user name and the API key as
/// the password, i.e. `Authorization: Basic base64(":" + key)`.
pub struct AffinityClient {
    base_url: String,
    api_key: String,
    http: Client,
    errors: Mutex<Vec<String>>,
}

impl AffinityClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
            errors: Mutex::new(Vec::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!("GET {} {:?}", path, query);
        let response = self
            .http
            .get(self.url(path))
            .basic_auth("", Some(&self.api_key))
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GET {} returned {}: {}", path, status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("GET {} returned invalid JSON", path))
    }

    /// One page of list entries as returned, envelope removed
    pub async fn raw_list_entries(&self, list_id: i64, page_size: u32) -> Result<Value> {
        let path = format!("/lists/{}/list-entries", list_id);
        let body = self
            .get_json(&path, &[("page_size", page_size.to_string())])
            .await?;
        Ok(unwrap_list_entries(body))
    }

    pub async fn raw_field_values(&self, scope: FieldValueScope) -> Result<Value> {
        let (param, id) = scope.query_param();
        self.get_json("/field-values", &[(param, id.to_string())]).await
    }

    pub async fn fetch_list_entries(&self, list_id: i64, page_size: u32) -> Result<Vec<ListEntry>> {
        parse_list_entries(self.raw_list_entries(list_id, page_size).await?)
    }

    pub async fn fetch_field_values(&self, scope: FieldValueScope) -> Result<Vec<FieldValue>> {
        let body = self.raw_field_values(scope).await?;
        serde_json::from_value(body).with_context(|| format!("Unexpected field values for {}", scope))
    }

    pub async fn fetch_organization(&self, organization_id: i64) -> Result<Organization> {
        let path = format!("/organizations/{}", organization_id);
        let body = self.get_json(&path, &[]).await?;
        serde_json::from_value(body)
            .with_context(|| format!("Unexpected organization shape for {}", organization_id))
    }

    /// Send a write. Only transport failures are errors; HTTP statuses are
    /// folded into the returned result.
    pub async fn send(&self, operation: &Operation) -> Result<OperationResult> {
        debug!("{} ({}) {}", operation, operation.operation_type(), operation.body());
        let request = match operation.http_method() {
            "PUT" => self.http.put(self.url(&operation.path())),
            _ => self.http.post(self.url(&operation.path())),
        };

        let response = request
            .basic_auth("", Some(&self.api_key))
            .json(&operation.body())
            .send()
            .await
            .with_context(|| format!("{} failed", operation))?;

        let status = response.status().as_u16();
        let data = response.json::<Value>().await.ok();
        Ok(OperationResult::from_status(operation.clone(), status, data))
    }

    fn record_error(&self, message: String) {
        error!("{}", message);
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(message);
        }
    }
}

/// Strip the `{"list_entries": [...]}` envelope if present
pub fn unwrap_list_entries(body: Value) -> Value {
    match body {
        Value::Object(mut envelope) if envelope.contains_key("list_entries") => envelope
            .remove("list_entries")
            .unwrap_or(Value::Array(Vec::new())),
        other => other,
    }
}

/// Accept both a bare array and the enveloped form
pub fn parse_list_entries(body: Value) -> Result<Vec<ListEntry>> {
    serde_json::from_value(unwrap_list_entries(body)).context("Unexpected list entries shape")
}

#[async_trait]
impl CrmGateway for AffinityClient {
    async fn list_entries(&self, list_id: i64, page_size: u32) -> Option<Vec<ListEntry>> {
        match self.fetch_list_entries(list_id, page_size).await {
            Ok(entries) => Some(entries),
            Err(e) => {
                self.record_error(format!("Error fetching list entries: {:#}", e));
                None
            }
        }
    }

    async fn field_values(&self, scope: FieldValueScope) -> Option<Vec<FieldValue>> {
        match self.fetch_field_values(scope).await {
            Ok(values) => Some(values),
            Err(e) => {
                self.record_error(format!("Error fetching field values: {:#}", e));
                None
            }
        }
    }

    async fn organization(&self, organization_id: i64) -> Option<Organization> {
        match self.fetch_organization(organization_id).await {
            Ok(org) => Some(org),
            Err(e) => {
                self.record_error(format!("Error fetching organization: {:#}", e));
                None
            }
        }
    }

    async fn execute(&self, operation: Operation) -> OperationResult {
        match self.send(&operation).await {
            Ok(result) => {
                if let Some(err) = &result.error {
                    self.record_error(err.clone());
                }
                result
            }
            Err(e) => {
                let message = format!("{:#}", e);
                self.record_error(message.clone());
                OperationResult::error(operation, message)
            }
        }
    }

    fn take_errors(&self) -> Vec<String> {
        match self.errors.lock() {
            Ok(mut errors) => std::mem::take(&mut *errors),
            Err(_) => Vec::new(),
        }
    }
}
