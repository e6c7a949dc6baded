use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, error};
use crate::domain::{error::ImportError, models::ValidProduct, ports::ProductCreator};

/// Product backend reached through a PostgREST-style table endpoint.
pub struct RestProductRepository {
    client: Client,
    base_url: String,
    table: String,
    api_key: Option<String>,
}

impl RestProductRepository {
    pub fn new(base_url: String, table: String, api_key: Option<String>) -> Self {
        debug!("Initializing REST product repository: {} (table: {})", base_url, table);
        Self {
            client: Client::new(),
            base_url,
            table,
            api_key,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), self.table)
    }
}

#[async_trait]
impl ProductCreator for RestProductRepository {
    async fn create_product(&self, product: &ValidProduct) -> Result<serde_json::Value, ImportError> {
        let url = self.endpoint();
        let payload = serde_json::to_value(product)?;
        debug!("POST {} for sku {}", url, product.sku);

        let mut request = self.client
            .post(&url)
            .header("Prefer", "return=representation")
            .json(&[payload]);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                error!("Request to {} failed: {}", url, e);
                ImportError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = backend_message(status, &body);
            error!("Backend rejected sku {} with {}: {}", product.sku, status, message);
            return Err(ImportError::Backend(message));
        }

        let created = first_record(response.json().await?)?;
        info!("Created product {} (id: {})", product.sku, created.get("id").unwrap_or(&serde_json::Value::Null));
        Ok(created)
    }
}

/// Picks the error text out of a failed response, preferring the JSON
/// `message` field the backend sends.
pub fn backend_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("request failed with status {}", status),
    }
}

/// Unwraps the representation returned for a single-row insert.
pub fn first_record(body: serde_json::Value) -> Result<serde_json::Value, ImportError> {
    match body {
        serde_json::Value::Array(mut rows) if !rows.is_empty() => Ok(rows.swap_remove(0)),
        serde_json::Value::Object(_) => Ok(body),
        _ => Err(ImportError::Backend("backend returned no created record".to_string())),
    }
}
