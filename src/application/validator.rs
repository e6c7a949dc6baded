use chrono::Utc;
use tracing::{debug, info};
use crate::domain::models::{
    FieldValue, GemAttributes, NormalizedField, ParsedProduct, RejectionReason, RowRejection,
    ValidProduct, ValidationOutcome, ValidationReport,
};
use crate::infrastructure::parsers::field_map::{parse_price, split_categories};

pub const DEFAULT_PRICE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationPolicy {
    /// Used when a row has no positive price.
    pub default_price: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self { default_price: DEFAULT_PRICE }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RowValidator {
    policy: ValidationPolicy,
}

impl RowValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn validate(&self, rows: &[ParsedProduct]) -> ValidationReport {
        debug!("Validating {} parsed rows", rows.len());
        let report: ValidationReport = rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.validate_row(index, row))
            .collect();

        info!(
            "Validation finished: {} valid products, {} errors",
            report.valid_products.len(),
            report.errors.len()
        );
        report
    }

    /// `index` is the row's 0-based position among the data rows.
    pub fn validate_row(&self, index: usize, row: &ParsedProduct) -> ValidationOutcome {
        let sku = match present_text(row, NormalizedField::Sku.as_str()) {
            Some(sku) => sku,
            None => return reject(index, RejectionReason::MissingSku),
        };

        let name = match present_text(row, "title")
            .or_else(|| present_text(row, NormalizedField::Name.as_str()))
        {
            Some(name) => name,
            None => return reject(index, RejectionReason::MissingName),
        };

        let mut attributes = GemAttributes::default();
        for field in NormalizedField::GEM_ATTRIBUTES {
            if let Some(value) = row.field(field).filter(|v| v.is_present()) {
                attributes.set(field, attribute_text(value));
            }
        }

        ValidationOutcome::Valid(ValidProduct {
            sku: sku.to_string(),
            name: name.to_string(),
            description: present_text(row, NormalizedField::Description.as_str())
                .unwrap_or_default()
                .to_string(),
            price: self.resolve_price(row.field(NormalizedField::Price)),
            categories: categories(row.field(NormalizedField::Categories)),
            created_at: Utc::now(),
            attributes,
        })
    }

    fn resolve_price(&self, value: Option<&FieldValue>) -> f64 {
        let price = match value {
            Some(FieldValue::Price(price)) => Some(*price),
            Some(FieldValue::Text(raw)) => Some(parse_price(raw)),
            _ => None,
        };
        price
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(self.policy.default_price)
    }
}

fn reject(index: usize, reason: RejectionReason) -> ValidationOutcome {
    let rejection = RowRejection::at_index(index, reason);
    debug!("Rejected row: {}", rejection);
    ValidationOutcome::Rejected(rejection)
}

/// Trimmed text of a field, if it is present and non-blank.
fn present_text<'a>(row: &'a ParsedProduct, name: &str) -> Option<&'a str> {
    row.text(name).map(str::trim).filter(|s| !s.is_empty())
}

fn categories(value: Option<&FieldValue>) -> Vec<String> {
    match value {
        Some(FieldValue::List(items)) => items.clone(),
        Some(FieldValue::Text(raw)) => split_categories(raw),
        _ => Vec::new(),
    }
}

fn attribute_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Price(number) => number.to_string(),
        FieldValue::List(items) => items.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    fn row(sku: &str, name: &str) -> ParsedProduct {
        ParsedProduct::new()
            .with_field("sku", text(sku))
            .with_field("name", text(name))
    }

    #[test]
    fn missing_sku_on_first_row_reports_row_2() {
        let rows = vec![ParsedProduct::new().with_field("name", text("Diamond Ring"))];
        let report = RowValidator::default().validate(&rows);

        assert!(report.valid_products.is_empty());
        assert_eq!(report.error_messages(), vec!["Row 2: SKU is required"]);
    }

    #[test]
    fn blank_sku_is_missing() {
        let report = RowValidator::default().validate(&[row("   ", "Ring")]);
        assert_eq!(report.error_messages(), vec!["Row 2: SKU is required"]);
    }

    #[test]
    fn missing_name_is_rejected() {
        let rows = vec![row("S1", "Ring"), row("S2", "  ")];
        let report = RowValidator::default().validate(&rows);

        assert_eq!(report.valid_products.len(), 1);
        assert_eq!(report.error_messages(), vec!["Row 3: Product name is required"]);
    }

    #[test]
    fn title_is_preferred_over_name() {
        let with_title = row("S1", "Name").with_field("title", text(" Title "));
        let blank_title = row("S2", "Name").with_field("title", text(""));

        let report = RowValidator::default().validate(&[with_title, blank_title]);
        assert_eq!(report.valid_products[0].name, "Title");
        assert_eq!(report.valid_products[1].name, "Name");
    }

    #[test]
    fn missing_price_uses_default() {
        let report = RowValidator::default().validate(&[row("S1", "Ring")]);
        assert_eq!(report.valid_products[0].price, 1000.0);
    }

    #[test]
    fn price_with_trailing_text_is_kept() {
        use crate::infrastructure::parsers::csv_parser::parse_products;

        let csv = "SKU,Name,Price\nR1,Ring,\"₹50,000/-\"\nR2,Band,5000 INR\nR3,Stud,per quote\n";
        let rows = parse_products(csv.as_bytes()).unwrap();
        let report = RowValidator::default().validate(&rows);

        let prices: Vec<f64> = report.valid_products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![50000.0, 5000.0, 1000.0]);
    }

    #[test]
    fn zero_price_uses_configured_default() {
        let validator = RowValidator::new(ValidationPolicy { default_price: 250.0 });
        let rows = vec![
            row("S1", "Ring").with_field("price", FieldValue::Price(0.0)),
            row("S2", "Band").with_field("price", FieldValue::Price(420.5)),
        ];
        let report = validator.validate(&rows);

        assert_eq!(report.valid_products[0].price, 250.0);
        assert_eq!(report.valid_products[1].price, 420.5);
    }

    #[test]
    fn builds_trimmed_product_with_present_attributes() {
        let parsed = ParsedProduct::new()
            .with_field("sku", text("  S1 "))
            .with_field("name", text(" Ruby Pendant "))
            .with_field("description", text("  Pigeon blood ruby "))
            .with_field("categories", text("Pendants, Ruby"))
            .with_field("carat", text("2.01"))
            .with_field("shape", text(""))
            .with_field("origin", text("Burma"));

        let report = RowValidator::default().validate(&[parsed]);
        let product = &report.valid_products[0];

        assert_eq!(product.sku, "S1");
        assert_eq!(product.name, "Ruby Pendant");
        assert_eq!(product.description, "Pigeon blood ruby");
        assert_eq!(product.categories, vec!["Pendants", "Ruby"]);
        assert_eq!(product.attributes.carat.as_deref(), Some("2.01"));
        assert_eq!(product.attributes.origin.as_deref(), Some("Burma"));
        assert!(product.attributes.shape.is_none());
        assert!(product.attributes.treatment.is_none());
    }

    #[test]
    fn every_row_yields_exactly_one_outcome() {
        let rows = vec![
            row("S1", "Ring"),
            ParsedProduct::new(),
            row("S3", ""),
            row("S4", "Band"),
            ParsedProduct::new().with_field("name", text("No sku")),
        ];
        let report = RowValidator::default().validate(&rows);

        assert_eq!(report.total_rows(), rows.len());
        assert_eq!(report.valid_products.len(), 2);
        let rows_with_errors: Vec<_> = report.errors.iter().map(|e| e.row_number).collect();
        assert_eq!(rows_with_errors, vec![3, 4, 6]);
    }
}
