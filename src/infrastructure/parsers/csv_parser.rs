use csv::{ReaderBuilder, StringRecord};
use std::io::Cursor;
use tracing::{debug, info, error};
use crate::domain::{
    error::ImportError,
    models::{FieldName, FieldValue, NormalizedField, ParsedProduct},
};
use super::field_map::{normalize_header, parse_price, split_categories};

/// Decodes a product CSV. Any structural problem fails the whole file and
/// every problem found is listed in the returned error.
pub fn parse_products(bytes: &[u8]) -> Result<Vec<ParsedProduct>, ImportError> {
    debug!("Creating CSV reader with headers enabled");
    let mut issues = Vec::new();

    if let Some(line) = find_unterminated_quote(bytes) {
        issues.push(format!("Quoted field unterminated (opened on line {})", line));
    }

    let cursor = Cursor::new(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(cursor);

    let headers = reader.headers()
        .map_err(|e| {
            error!("Failed to read CSV headers: {}", e);
            issues.push(e.to_string());
            ImportError::Parse { issues: issues.clone() }
        })?
        .clone();

    if headers.iter().all(|h| h.trim().is_empty()) {
        error!("CSV input has no header row");
        issues.push("Missing header row".to_string());
        return Err(ImportError::Parse { issues });
    }

    let fields: Vec<FieldName> = headers
        .iter()
        .map(|h| normalize_header(h.trim_start_matches('\u{feff}')))
        .collect();
    debug!("CSV headers: {:?}", headers);
    debug!("Normalized fields: {:?}", fields.iter().map(FieldName::as_str).collect::<Vec<_>>());
    info!("Found {} columns in CSV", fields.len());

    let mut products = Vec::new();
    let mut row_count = 0;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                error!("Failed to read CSV record after row {}: {}", row_count, e);
                issues.push(e.to_string());
                continue;
            }
        };

        if record.iter().all(|cell| cell.trim().is_empty()) {
            debug!("Skipping blank CSV record");
            continue;
        }

        row_count += 1;
        products.push(build_product(&fields, &record));

        if row_count % 1000 == 0 {
            debug!("Processed {} CSV rows", row_count);
        }
    }

    if !issues.is_empty() {
        error!("CSV parsing failed with {} issue(s)", issues.len());
        return Err(ImportError::Parse { issues });
    }

    info!("Parsed {} rows from CSV", row_count);
    Ok(products)
}

/// Applies the per-field transform for a normalized field.
pub fn transform_field(field: &FieldName, raw: &str) -> FieldValue {
    match field {
        FieldName::Known(NormalizedField::Price) => FieldValue::Price(parse_price(raw)),
        FieldName::Known(NormalizedField::Categories) => FieldValue::List(split_categories(raw)),
        _ => FieldValue::Text(raw.to_string()),
    }
}

fn build_product(fields: &[FieldName], record: &StringRecord) -> ParsedProduct {
    fields
        .iter()
        .zip(record.iter())
        .fold(ParsedProduct::new(), |product, (field, raw)| {
            product.with_field(field.as_str(), transform_field(field, raw))
        })
}

/// Returns the line a still-open quoted field started on. The csv reader
/// accepts such input and reads to EOF, so it is checked separately.
fn find_unterminated_quote(bytes: &[u8]) -> Option<usize> {
    let mut line = 1;
    let mut opened_on = 0;
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut iter = bytes.iter().peekable();

    while let Some(&b) = iter.next() {
        if in_quotes {
            match b {
                b'"' if iter.peek() == Some(&&b'"') => {
                    iter.next();
                }
                b'"' => in_quotes = false,
                b'\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' if at_field_start => {
                in_quotes = true;
                opened_on = line;
                at_field_start = false;
            }
            b',' | b'\r' => at_field_start = true,
            b'\n' => {
                line += 1;
                at_field_start = true;
            }
            _ => at_field_start = false,
        }
    }

    in_quotes.then_some(opened_on)
}
