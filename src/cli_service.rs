use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, debug, warn};
use crate::{
    application::import_service::{ImportService, ImportSummary},
    domain::{
        error::ImportError,
        models::{UploadProgress, UploadResult, ValidProduct, ValidationReport},
        ports::ProductCreator,
    },
    infrastructure::{
        backend::{memory_repo::InMemoryProductRepository, rest_repo::RestProductRepository},
        config::{AppConfig, ENV_API_URL},
        file_adapter::LocalFileFetcher,
        parsers::template,
    },
};

const DESCRIPTION_PREVIEW_CHARS: usize = 50;

pub struct CliService {
    service: ImportService,
}

impl CliService {
    pub fn new(config: &AppConfig, dry_run: bool) -> Result<Self, ImportError> {
        debug!("Initializing CLI service (dry run: {})", dry_run);

        let creator: Arc<dyn ProductCreator> = if dry_run {
            info!("Dry run: products are kept in memory only");
            Arc::new(InMemoryProductRepository::new())
        } else {
            let api_url = config.api_url.clone().ok_or_else(|| {
                ImportError::Config(format!("{} is required unless --dry-run is given", ENV_API_URL))
            })?;
            if config.api_key.is_none() {
                warn!("No API key configured, requests are sent unauthenticated");
            }
            info!("Using product backend {} (table: {})", api_url, config.table);
            Arc::new(RestProductRepository::new(api_url, config.table.clone(), config.api_key.clone()))
        };

        let service = ImportService::new(
            Arc::new(LocalFileFetcher::new()),
            creator,
            config.validation_policy(),
        );
        Ok(Self { service })
    }

    pub async fn import(&self, path: &str) -> Result<ImportSummary, ImportError> {
        let progress_bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} Uploading products... [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress_bar.set_style(style);
        }

        let mut on_progress = |progress: UploadProgress| {
            progress_bar.set_length(progress.total as u64);
            progress_bar.set_position(progress.current as u64);
            progress_bar.set_message(format!("{}%", progress.percentage));
        };
        let summary = self.service.import_file(path, Some(&mut on_progress)).await;
        progress_bar.finish_and_clear();
        let summary = summary?;

        println!("{}", render_validation(&summary.validation, 0));
        if summary.upload.total > 0 {
            println!("{}", render_upload(&summary.upload));
        }
        Ok(summary)
    }

    pub async fn validate(&self, path: &str, preview: usize) -> Result<ValidationReport, ImportError> {
        let report = self.service.prepare(path).await?;
        println!("{}", render_validation(&report, preview));
        Ok(report)
    }

    pub async fn write_sample(output: &Path) -> Result<(), ImportError> {
        template::write_sample(output).await?;
        println!("Sample CSV template written to {}", output.display());
        Ok(())
    }
}

pub fn render_validation(report: &ValidationReport, preview: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Validation Results:");
    let _ = writeln!(out, "  {} valid products found", report.valid_products.len());
    if !report.errors.is_empty() {
        let _ = writeln!(out, "  {} errors found", report.errors.len());
        let _ = writeln!(out, "Errors:");
        for error in &report.errors {
            let _ = writeln!(out, "  - {}", error);
        }
    }

    if preview > 0 && !report.valid_products.is_empty() {
        let _ = writeln!(out, "Valid Products ({}):", report.valid_products.len());
        for product in report.valid_products.iter().take(preview) {
            let _ = writeln!(out, "  {}", preview_line(product));
        }
        if report.valid_products.len() > preview {
            let _ = writeln!(
                out,
                "Showing first {} products. {} more will be uploaded.",
                preview,
                report.valid_products.len() - preview
            );
        }
    }
    out.trim_end().to_string()
}

pub fn render_upload(result: &UploadResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Upload Complete!");
    let _ = writeln!(out, "  {} products uploaded successfully", result.successful.len());
    if !result.failed.is_empty() {
        let _ = writeln!(out, "  {} products failed to upload", result.failed.len());
        let _ = writeln!(out, "Failed Uploads:");
        for failure in &result.failed {
            let _ = writeln!(out, "  - {}: {}", failure.product.name, failure.error);
        }
    }
    out.trim_end().to_string()
}

fn preview_line(product: &ValidProduct) -> String {
    let description = if product.description.is_empty() {
        "-".to_string()
    } else if product.description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let head: String = product.description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        product.description.clone()
    };
    let attrs = &product.attributes;

    format!(
        "{} | {} | {} | ₹{} | [{}] | carat: {} | shape: {} | color: {}",
        product.sku,
        product.name,
        description,
        product.price,
        product.categories.join(", "),
        attrs.carat.as_deref().unwrap_or("-"),
        attrs.shape.as_deref().unwrap_or("-"),
        attrs.color.as_deref().unwrap_or("-"),
    )
}
