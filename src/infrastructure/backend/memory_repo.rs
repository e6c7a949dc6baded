use std::collections::HashSet;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;
use crate::domain::{error::ImportError, models::ValidProduct, ports::ProductCreator};

/// Keeps created products in memory. Backs `--dry-run` and tests.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<Vec<serde_json::Value>>,
    skus: Mutex<HashSet<String>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn products(&self) -> Vec<serde_json::Value> {
        self.products.lock().await.clone()
    }
}

#[async_trait]
impl ProductCreator for InMemoryProductRepository {
    async fn create_product(&self, product: &ValidProduct) -> Result<serde_json::Value, ImportError> {
        if !self.skus.lock().await.insert(product.sku.clone()) {
            warn!("Duplicate sku {} rejected", product.sku);
            return Err(ImportError::Backend(format!(
                "duplicate key value violates unique constraint: sku {} already exists",
                product.sku
            )));
        }

        let mut record = serde_json::to_value(product)?;
        if let serde_json::Value::Object(fields) = &mut record {
            fields.insert("id".to_string(), serde_json::Value::String(Uuid::new_v4().to_string()));
            fields.insert("inserted_at".to_string(), serde_json::Value::String(Utc::now().to_rfc3339()));
        }

        let mut products = self.products.lock().await;
        products.push(record.clone());
        debug!("Stored product {} ({} in memory)", product.sku, products.len());
        Ok(record)
    }
}
