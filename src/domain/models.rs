use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical product fields a CSV column can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedField {
    Sku,
    Name,
    Description,
    Price,
    Categories,
    Carat,
    Dimensions,
    Shape,
    Color,
    Clarity,
    Origin,
    Treatment,
}

impl NormalizedField {
    pub const ALL: [NormalizedField; 12] = [
        NormalizedField::Sku,
        NormalizedField::Name,
        NormalizedField::Description,
        NormalizedField::Price,
        NormalizedField::Categories,
        NormalizedField::Carat,
        NormalizedField::Dimensions,
        NormalizedField::Shape,
        NormalizedField::Color,
        NormalizedField::Clarity,
        NormalizedField::Origin,
        NormalizedField::Treatment,
    ];

    /// Optional gemstone attributes carried through to the created product.
    pub const GEM_ATTRIBUTES: [NormalizedField; 7] = [
        NormalizedField::Carat,
        NormalizedField::Dimensions,
        NormalizedField::Shape,
        NormalizedField::Color,
        NormalizedField::Clarity,
        NormalizedField::Origin,
        NormalizedField::Treatment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NormalizedField::Sku => "sku",
            NormalizedField::Name => "name",
            NormalizedField::Description => "description",
            NormalizedField::Price => "price",
            NormalizedField::Categories => "categories",
            NormalizedField::Carat => "carat",
            NormalizedField::Dimensions => "dimensions",
            NormalizedField::Shape => "shape",
            NormalizedField::Color => "color",
            NormalizedField::Clarity => "clarity",
            NormalizedField::Origin => "origin",
            NormalizedField::Treatment => "treatment",
        }
    }
}

impl fmt::Display for NormalizedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name a header resolves to: a canonical field, or the lower-cased
/// header itself when it is not in the synonym table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldName {
    Known(NormalizedField),
    Unmapped(String),
}

impl FieldName {
    pub fn as_str(&self) -> &str {
        match self {
            FieldName::Known(field) => field.as_str(),
            FieldName::Unmapped(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Price(f64),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Present and non-empty. Zero prices count as present.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Text(value) => !value.trim().is_empty(),
            FieldValue::Price(_) => true,
            FieldValue::List(items) => !items.is_empty(),
        }
    }
}

/// One CSV data row after header normalization and field transforms.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedProduct {
    fields: BTreeMap<String, FieldValue>,
}

impl ParsedProduct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later values for the same name replace earlier ones.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn field(&self, field: NormalizedField) -> Option<&FieldValue> {
        self.get(field.as_str())
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GemAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
}

impl GemAttributes {
    fn slot_mut(&mut self, field: NormalizedField) -> Option<&mut Option<String>> {
        match field {
            NormalizedField::Carat => Some(&mut self.carat),
            NormalizedField::Dimensions => Some(&mut self.dimensions),
            NormalizedField::Shape => Some(&mut self.shape),
            NormalizedField::Color => Some(&mut self.color),
            NormalizedField::Clarity => Some(&mut self.clarity),
            NormalizedField::Origin => Some(&mut self.origin),
            NormalizedField::Treatment => Some(&mut self.treatment),
            _ => None,
        }
    }

    /// Returns false when `field` is not a gem attribute.
    pub fn set(&mut self, field: NormalizedField, value: String) -> bool {
        match self.slot_mut(field) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, field: NormalizedField) -> Option<&str> {
        let slot = match field {
            NormalizedField::Carat => &self.carat,
            NormalizedField::Dimensions => &self.dimensions,
            NormalizedField::Shape => &self.shape,
            NormalizedField::Color => &self.color,
            NormalizedField::Clarity => &self.clarity,
            NormalizedField::Origin => &self.origin,
            NormalizedField::Treatment => &self.treatment,
            _ => return None,
        };
        slot.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        NormalizedField::GEM_ATTRIBUTES
            .iter()
            .all(|field| self.get(*field).is_none())
    }
}

/// A row that passed validation, ready for the product backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub attributes: GemAttributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    MissingSku,
    MissingName,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingSku => f.write_str("SKU is required"),
            RejectionReason::MissingName => f.write_str("Product name is required"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    /// Line number in the source file; the header is line 1.
    pub row_number: usize,
    pub reason: RejectionReason,
}

impl RowRejection {
    pub fn at_index(index: usize, reason: RejectionReason) -> Self {
        Self {
            row_number: index + 2,
            reason,
        }
    }
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row_number, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid(ValidProduct),
    Rejected(RowRejection),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid_products: Vec<ValidProduct>,
    pub errors: Vec<RowRejection>,
}

impl ValidationReport {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn total_rows(&self) -> usize {
        self.valid_products.len() + self.errors.len()
    }
}

impl FromIterator<ValidationOutcome> for ValidationReport {
    fn from_iter<I: IntoIterator<Item = ValidationOutcome>>(outcomes: I) -> Self {
        let mut report = ValidationReport::default();
        for outcome in outcomes {
            match outcome {
                ValidationOutcome::Valid(product) => report.valid_products.push(product),
                ValidationOutcome::Rejected(rejection) => report.errors.push(rejection),
            }
        }
        report
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub current: usize,
    pub total: usize,
    pub percentage: u8,
}

impl UploadProgress {
    pub fn new(current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            ((current as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            current,
            total,
            percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSuccess {
    pub index: usize,
    /// Record as returned by the backend, server-assigned fields included.
    pub product: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadFailure {
    pub index: usize,
    pub product: ValidProduct,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Created(UploadSuccess),
    Failed(UploadFailure),
}

impl UploadOutcome {
    pub fn index(&self) -> usize {
        match self {
            UploadOutcome::Created(success) => success.index,
            UploadOutcome::Failed(failure) => failure.index,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadResult {
    pub successful: Vec<UploadSuccess>,
    pub failed: Vec<UploadFailure>,
    pub total: usize,
}

impl UploadResult {
    pub fn from_outcomes(total: usize, outcomes: impl IntoIterator<Item = UploadOutcome>) -> Self {
        let (successful, failed) = outcomes.into_iter().fold(
            (Vec::new(), Vec::new()),
            |(mut successful, mut failed), outcome| {
                match outcome {
                    UploadOutcome::Created(success) => successful.push(success),
                    UploadOutcome::Failed(failure) => failed.push(failure),
                }
                (successful, failed)
            },
        );
        Self {
            successful,
            failed,
            total,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.successful.len() + self.failed.len() == self.total
    }
}
