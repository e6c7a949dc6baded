use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use product_import::application::import_service::ImportService;
use product_import::application::validator::{RowValidator, ValidationPolicy};
use product_import::domain::error::ImportError;
use product_import::domain::models::{UploadProgress, ValidProduct};
use product_import::domain::ports::ProductCreator;
use product_import::infrastructure::backend::memory_repo::InMemoryProductRepository;
use product_import::infrastructure::file_adapter::LocalFileFetcher;
use product_import::infrastructure::parsers::{csv_parser::parse_products, template::generate_sample};
use tempfile::Builder;

/// Rejects products whose name contains a marker and logs every call.
struct FlakyBackend {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ProductCreator for FlakyBackend {
    async fn create_product(&self, product: &ValidProduct) -> Result<serde_json::Value, ImportError> {
        self.calls.lock().unwrap().push(product.sku.clone());
        if product.name.contains("Broken") {
            return Err(ImportError::Backend("new row violates row-level security policy".to_string()));
        }
        Ok(serde_json::json!({ "id": product.sku.to_lowercase(), "name": product.name }))
    }
}

fn csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn sample_template_round_trips_without_errors() {
    let sample = generate_sample().unwrap();
    let rows = parse_products(sample.as_bytes()).unwrap();
    let report = RowValidator::default().validate(&rows);

    assert_eq!(report.errors, vec![]);
    assert_eq!(report.valid_products.len(), rows.len());
    assert_eq!(report.valid_products[0].price, 50000.0);
    assert_eq!(report.valid_products[0].attributes.clarity.as_deref(), Some("VVS1"));
    assert!(report.valid_products[1].attributes.is_empty());
}

#[tokio::test]
async fn failure_in_the_middle_does_not_block_later_rows() {
    let file = csv_file(
        "SKU,Product Name,Price\n\
         P0,Ring,100\n\
         P1,Band,200\n\
         P2,Broken Clasp,300\n\
         P3,Pendant,400\n\
         P4,Bangle,500\n",
    );
    let backend = Arc::new(FlakyBackend { calls: Mutex::new(Vec::new()) });
    let service = ImportService::new(
        Arc::new(LocalFileFetcher::new()),
        backend.clone(),
        ValidationPolicy::default(),
    );

    let mut seen = Vec::new();
    let mut on_progress = |p: UploadProgress| seen.push((p.current, p.total));
    let summary = service
        .import_file(file.path().to_str().unwrap(), Some(&mut on_progress))
        .await
        .unwrap();

    let upload = summary.upload;
    assert_eq!(upload.total, 5);
    assert_eq!(upload.successful.len() + upload.failed.len(), upload.total);
    assert_eq!(upload.failed[0].index, 2);
    assert_eq!(upload.failed[0].error, "new row violates row-level security policy");
    assert_eq!(upload.successful.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1, 3, 4]);
    assert_eq!(upload.successful[3].product["id"], "p4");
    assert_eq!(*backend.calls.lock().unwrap(), vec!["P0", "P1", "P2", "P3", "P4"]);
    assert_eq!(seen, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
}

#[tokio::test]
async fn dry_run_backend_receives_only_valid_rows() {
    let file = csv_file(
        "Sku Id,Title,Description,Price,Category,Carat,Shape,Color,Clarity,Origin,Treatment\n\
         R-1,Burmese Ruby,  Unheated ruby  ,\"₹1,25,000\",\"Ruby, Loose Stones\",2.03,Oval,Pigeon Blood,VS,Burma,None\n\
         ,Orphan,,,,,,,,,\n\
         R-2,Star Ruby,,,,,Cabochon,,,,\n",
    );
    let repo = Arc::new(InMemoryProductRepository::new());
    let service = ImportService::new(
        Arc::new(LocalFileFetcher::new()),
        repo.clone(),
        ValidationPolicy { default_price: 999.0 },
    );

    let summary = service.import_file(file.path().to_str().unwrap(), None).await.unwrap();

    assert_eq!(summary.validation.error_messages(), vec!["Row 3: SKU is required"]);
    let stored = repo.products().await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0]["price"], 125000.0);
    assert_eq!(stored[0]["description"], "Unheated ruby");
    assert_eq!(stored[0]["categories"], serde_json::json!(["Ruby", "Loose Stones"]));
    assert_eq!(stored[0]["treatment"], "None");
    assert_eq!(stored[1]["price"], 999.0);
    assert_eq!(stored[1]["shape"], "Cabochon");
    assert!(stored[1].get("carat").is_none());
}

#[tokio::test]
async fn non_csv_file_is_refused() {
    let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
    file.write_all(b"sku,name\nS1,Ring\n").unwrap();
    let service = ImportService::new(
        Arc::new(LocalFileFetcher::new()),
        Arc::new(InMemoryProductRepository::new()),
        ValidationPolicy::default(),
    );

    let err = service.prepare(file.path().to_str().unwrap()).await.unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFile(_)));
}
