use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when reading from the ride store
#[derive(Debug, Error)]
pub enum RideStoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Connection details for the hosted ride store
#[derive(Debug, Clone)]
pub struct RideStoreConfig {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub rides_collection: String,
    pub timeout_secs: u64,
}

/// Read-only client for the ride documents collection
///
/// The store owns ride lifecycle and seat bookkeeping; this client only
/// lists the currently active rides so they can be ranked.
pub struct RideStoreClient {
    config: RideStoreConfig,
    client: Client,
}

impl RideStoreClient {
    pub fn new(config: RideStoreConfig) -> Result<Self, RideStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint.trim_end_matches('/'),
            self.config.database_id,
            self.config.rides_collection
        )
    }

    /// Fetch every ride currently marked active
    ///
    /// Rides come back as raw records; unreadable ones are reported by the
    /// matcher rather than dropped here. Seat availability is not filtered
    /// here either.
    pub async fn active_rides(&self) -> Result<Vec<Value>, RideStoreError> {
        let queries = vec![r#"equal("status", "active")"#.to_string()];
        let queries_json = serde_json::to_string(&queries)
            .map_err(|e| RideStoreError::InvalidResponse(e.to_string()))?;
        let encoded_queries = urlencoding::encode(&queries_json);

        let url = format!("{}?queries={}", self.documents_url(), encoded_queries);

        tracing::debug!("Fetching active rides from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.config.api_key)
            .header("X-Appwrite-Project", &self.config.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RideStoreError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch active rides: {} - {}", status, body);
            return Err(RideStoreError::ApiError(format!(
                "Failed to fetch active rides: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        parse_ride_documents(&json)
    }
}

/// Pull ride records out of a `{ "documents": [...] }` listing
///
/// A document may hold the ride directly or under a `data` key. A wrapped
/// ride without its own `$id` takes the document's.
pub fn parse_ride_documents(json: &Value) -> Result<Vec<Value>, RideStoreError> {
    let documents = json
        .get("documents")
        .and_then(|d| d.as_array())
        .ok_or_else(|| RideStoreError::InvalidResponse("Missing documents array".into()))?;

    let rides: Vec<Value> = documents.iter().map(ride_record).collect();

    tracing::debug!("Parsed {} ride documents", rides.len());

    Ok(rides)
}

fn ride_record(document: &Value) -> Value {
    match (document.get("data"), document.get("$id")) {
        (Some(Value::Object(data)), Some(id)) if !data.contains_key("$id") => {
            let mut data = data.clone();
            data.insert("$id".to_string(), id.clone());
            Value::Object(data)
        }
        (Some(data), _) => data.clone(),
        (None, _) => document.clone(),
    }
}
