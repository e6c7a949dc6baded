use std::sync::Arc;
use futures_util::{stream, StreamExt};
use tracing::{debug, info, warn};
use crate::domain::{
    models::{UploadFailure, UploadOutcome, UploadProgress, UploadResult, UploadSuccess, ValidProduct},
    ports::ProductCreator,
};

/// Creates products one at a time, in input order. A failed record is
/// recorded and the next one is attempted; nothing is retried or rolled back.
pub struct SequentialUploader {
    creator: Arc<dyn ProductCreator>,
}

impl SequentialUploader {
    pub fn new(creator: Arc<dyn ProductCreator>) -> Self {
        Self { creator }
    }

    pub async fn upload(
        &self,
        products: &[ValidProduct],
        mut on_progress: Option<&mut (dyn FnMut(UploadProgress) + Send)>,
    ) -> UploadResult {
        let total = products.len();
        info!("Uploading {} products sequentially", total);

        let creator = &self.creator;
        let outcomes: Vec<UploadOutcome> = stream::iter(products.iter().enumerate())
            .then(|(index, product)| async move {
                debug!("Creating product {} of {} (sku: {})", index + 1, total, product.sku);
                match creator.create_product(product).await {
                    Ok(created) => UploadOutcome::Created(UploadSuccess { index, product: created }),
                    Err(e) => {
                        warn!("Failed to create product {} (sku: {}): {}", index, product.sku, e);
                        UploadOutcome::Failed(UploadFailure {
                            index,
                            product: product.clone(),
                            error: e.to_string(),
                        })
                    }
                }
            })
            .inspect(|outcome| {
                if let Some(callback) = on_progress.as_mut() {
                    callback(UploadProgress::new(outcome.index() + 1, total));
                }
            })
            .collect()
            .await;

        let result = UploadResult::from_outcomes(total, outcomes);
        info!(
            "Upload finished: {} created, {} failed, {} total",
            result.successful.len(),
            result.failed.len(),
            result.total
        );
        result
    }
}
