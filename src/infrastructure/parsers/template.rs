use std::path::Path;
use csv::WriterBuilder;
use tracing::{debug, info};
use crate::domain::error::ImportError;

pub const SAMPLE_FILE_NAME: &str = "sample_products.csv";

const SAMPLE_HEADERS: [&str; 12] = [
    "SKU",
    "Product Name",
    "Description",
    "Price",
    "Categories",
    "Carat",
    "Dimensions",
    "Shape",
    "Color",
    "Clarity",
    "Origin",
    "Treatment",
];

const SAMPLE_ROWS: [[&str; 12]; 3] = [
    [
        "RING-001",
        "Diamond Ring",
        "Beautiful diamond engagement ring with platinum setting",
        "₹50000",
        "Rings, Diamond, Engagement",
        "1.2",
        "6.8 x 6.8 mm",
        "Round",
        "D",
        "VVS1",
        "South Africa",
        "None",
    ],
    [
        "NECK-001",
        "Gold Necklace",
        "Traditional gold necklace with intricate design",
        "₹25000",
        "Necklaces, Gold, Traditional",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
    ],
    [
        "EAR-001",
        "Pearl Earrings",
        "Elegant pearl drop earrings",
        "₹8000",
        "Earrings, Pearl, Elegant",
        "",
        "8 mm",
        "Drop",
        "White",
        "",
        "Japan",
        "",
    ],
];

/// Builds the onboarding template in the same format the importer reads.
pub fn generate_sample() -> Result<String, ImportError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(SAMPLE_HEADERS)
        .map_err(|e| ImportError::Io(e.into()))?;
    for row in SAMPLE_ROWS {
        writer.write_record(row).map_err(|e| ImportError::Io(e.into()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::Io(e.into_error()))?;
    debug!("Generated sample CSV with {} rows", SAMPLE_ROWS.len());
    into_text(bytes)
}

fn into_text(bytes: Vec<u8>) -> Result<String, ImportError> {
    String::from_utf8(bytes)
        .map_err(|e| ImportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

pub async fn write_sample(path: &Path) -> Result<(), ImportError> {
    let content = generate_sample()?;
    tokio::fs::write(path, content.as_bytes()).await?;
    info!("Wrote sample CSV template to {}", path.display());
    Ok(())
}
