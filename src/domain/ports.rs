use async_trait::async_trait;
use crate::domain::{error::ImportError, models::ValidProduct};

#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, ImportError>;
}

/// Persists one product and returns the stored record, including any
/// server-assigned identifiers.
#[async_trait]
pub trait ProductCreator: Send + Sync {
    async fn create_product(&self, product: &ValidProduct) -> Result<serde_json::Value, ImportError>;
}
