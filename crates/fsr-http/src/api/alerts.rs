//! Alert records.

use serde_json::Value;
use tracing::instrument;

use fsr_core::{Collection, ListParams, Result};

use crate::client::FortiSoar;
use crate::http::ApiRequest;

const ALERTS: &str = "/api/3/alerts";

/// CRUD over `/api/3/alerts`.
#[derive(Debug, Clone, Copy)]
pub struct Alerts<'a> {
    client: &'a FortiSoar,
}

impl<'a> Alerts<'a> {
    pub(crate) fn new(client: &'a FortiSoar) -> Self {
        Self { client }
    }

    /// Create an alert from a field map.
    #[instrument(skip(self, fields))]
    pub async fn create(&self, fields: Value) -> Result<Value> {
        self.client.post(ALERTS, fields).await
    }

    /// Fetch an alert by UUID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Value> {
        self.client
            .send(ApiRequest::get(alert_path(id)))
            .await?
            .json()
    }

    /// List alerts.
    #[instrument(skip(self))]
    pub async fn list(&self, params: &ListParams) -> Result<Collection> {
        self.client
            .send(ApiRequest::get(ALERTS).query_pairs(params.to_pairs()))
            .await?
            .parse()
    }

    /// Update fields on an alert.
    #[instrument(skip(self, fields))]
    pub async fn update(&self, id: &str, fields: Value) -> Result<Value> {
        self.client.put(&alert_path(id), fields).await
    }

    /// Delete an alert.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&alert_path(id)).await
    }
}

fn alert_path(id: &str) -> String {
    format!("{ALERTS}/{}", id.trim_matches('/'))
}
