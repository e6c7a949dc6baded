use std::path::Path;
use std::sync::Arc;
use serde::Serialize;
use tracing::{info, debug, error, warn};
use crate::application::{
    uploader::SequentialUploader,
    validator::{RowValidator, ValidationPolicy},
};
use crate::domain::{
    error::ImportError,
    models::{ParsedProduct, UploadProgress, UploadResult, ValidProduct, ValidationReport},
    ports::{FileFetcher, ProductCreator},
};
use crate::infrastructure::parsers::csv_parser::parse_products;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub validation: ValidationReport,
    pub upload: UploadResult,
}

pub struct ImportService {
    file_fetcher: Arc<dyn FileFetcher>,
    validator: RowValidator,
    uploader: SequentialUploader,
}

impl ImportService {
    pub fn new(
        file_fetcher: Arc<dyn FileFetcher>,
        product_creator: Arc<dyn ProductCreator>,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            file_fetcher,
            validator: RowValidator::new(policy),
            uploader: SequentialUploader::new(product_creator),
        }
    }

    /// Checks the file type, reads the file and parses every row.
    pub async fn load_file(&self, path: &str) -> Result<Vec<ParsedProduct>, ImportError> {
        debug!("Step 1: Checking file type of {}", path);
        check_file_type(path)?;

        debug!("Step 2: Fetching file {}", path);
        let bytes = self.file_fetcher.fetch_file(path).await
            .map_err(|e| {
                error!("Failed to fetch file {}: {}", path, e);
                e
            })?;
        info!("Successfully fetched file, size: {} bytes", bytes.len());

        debug!("Step 3: Parsing CSV content");
        let rows = parse_products(&bytes)
            .map_err(|e| {
                error!("Failed to parse file {}: {}", path, e);
                e
            })?;
        info!("Successfully parsed {} rows from {}", rows.len(), path);
        Ok(rows)
    }

    pub fn validate(&self, rows: &[ParsedProduct]) -> ValidationReport {
        self.validator.validate(rows)
    }

    /// Loads and validates a file without touching the backend.
    pub async fn prepare(&self, path: &str) -> Result<ValidationReport, ImportError> {
        let rows = self.load_file(path).await?;
        debug!("Step 4: Validating {} rows", rows.len());
        let report = self.validate(&rows);
        if !report.errors.is_empty() {
            warn!("{} rows of {} failed validation", report.errors.len(), path);
        }
        Ok(report)
    }

    pub async fn upload(
        &self,
        products: &[ValidProduct],
        on_progress: Option<&mut (dyn FnMut(UploadProgress) + Send)>,
    ) -> UploadResult {
        self.uploader.upload(products, on_progress).await
    }

    /// Full pipeline. Only a file-level failure is returned as an error;
    /// rejected rows and failed uploads are reported in the summary.
    pub async fn import_file(
        &self,
        path: &str,
        on_progress: Option<&mut (dyn FnMut(UploadProgress) + Send)>,
    ) -> Result<ImportSummary, ImportError> {
        info!("Starting product import from {}", path);
        let validation = self.prepare(path).await?;

        if validation.valid_products.is_empty() {
            warn!("No valid products in {}, nothing to upload", path);
            return Ok(ImportSummary { validation, upload: UploadResult::default() });
        }

        debug!("Step 5: Uploading {} valid products", validation.valid_products.len());
        let upload = self.upload(&validation.valid_products, on_progress).await;

        info!(
            "✅ Import of {} finished - {} created, {} failed, {} rows rejected",
            path,
            upload.successful.len(),
            upload.failed.len(),
            validation.errors.len()
        );
        Ok(ImportSummary { validation, upload })
    }
}

fn check_file_type(path: &str) -> Result<(), ImportError> {
    let is_csv = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        Ok(())
    } else {
        warn!("Rejected non-CSV file: {}", path);
        Err(ImportError::UnsupportedFile(path.to_string()))
    }
}
