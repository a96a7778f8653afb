//! HTTP client for the visitor service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use ride_engine::{EngineError, EngineResult, VisitorLookup, VisitorServiceConfig};
use ride_types::{VisitorId, VisitorRecord};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

/// Visitor record as served by `GET /api/v1/visitors/{id}`
#[derive(Debug, Deserialize)]
struct VisitorResponse {
    #[serde(alias = "guid")]
    id: Uuid,
    #[serde(default)]
    name: String,
}

/// [`VisitorLookup`] backed by the visitor service's REST API
pub struct HttpVisitorLookup {
    client: Client,
    base_url: String,
}

impl HttpVisitorLookup {
    pub fn new(config: &VisitorServiceConfig) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EngineError::Configuration(format!("visitor client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn visitor_url(&self, visitor_id: VisitorId) -> String {
        format!("{}/api/v1/visitors/{}", self.base_url, visitor_id.as_uuid())
    }
}

fn lookup_failed(visitor_id: VisitorId, reason: impl ToString) -> EngineError {
    EngineError::VisitorLookupFailed {
        visitor_id,
        reason: reason.to_string(),
    }
}

#[async_trait]
impl VisitorLookup for HttpVisitorLookup {
    async fn get_visitor(&self, visitor_id: VisitorId) -> EngineResult<VisitorRecord> {
        let url = self.visitor_url(visitor_id);
        debug!(url = %url, "Fetching visitor");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| lookup_failed(visitor_id, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(EngineError::VisitorNotFound(visitor_id)),
            status if status.is_success() => {
                let body: VisitorResponse = response
                    .json()
                    .await
                    .map_err(|e| lookup_failed(visitor_id, e))?;

                if body.id != *visitor_id.as_uuid() {
                    return Err(lookup_failed(
                        visitor_id,
                        format!("service returned visitor {}", body.id),
                    ));
                }
                Ok(VisitorRecord::new(visitor_id, body.name))
            }
            status => Err(lookup_failed(visitor_id, format!("unexpected status {}", status))),
        }
    }
}
