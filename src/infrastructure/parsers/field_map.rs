use once_cell::sync::Lazy;
use regex::Regex;
use crate::domain::models::{FieldName, NormalizedField};

/// Lower-cased header text recognised for each canonical field.
pub const HEADER_SYNONYMS: &[(&str, NormalizedField)] = &[
    ("sku", NormalizedField::Sku),
    ("sku id", NormalizedField::Sku),
    ("product name", NormalizedField::Name),
    ("name", NormalizedField::Name),
    ("title", NormalizedField::Name),
    ("description", NormalizedField::Description),
    ("price", NormalizedField::Price),
    ("categories", NormalizedField::Categories),
    ("category", NormalizedField::Categories),
    ("tags", NormalizedField::Categories),
    ("carat", NormalizedField::Carat),
    ("dimensions", NormalizedField::Dimensions),
    ("shape", NormalizedField::Shape),
    ("color", NormalizedField::Color),
    ("clarity", NormalizedField::Clarity),
    ("origin", NormalizedField::Origin),
    ("treatment", NormalizedField::Treatment),
];

static PRICE_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{Sc},]").expect("valid price pattern"));
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid number pattern")
});

pub fn normalize_header(header: &str) -> FieldName {
    let lowered = header.trim().to_lowercase();
    HEADER_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == lowered)
        .map(|(_, field)| FieldName::Known(*field))
        .unwrap_or(FieldName::Unmapped(lowered))
}

/// Strips currency symbols and thousands separators, then reads the leading
/// number; trailing text such as `/-` or `INR` is ignored. Anything that does
/// not start with a finite, non-negative number becomes 0.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned = PRICE_NOISE.replace_all(raw, "");
    let price = LEADING_NUMBER
        .find(cleaned.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok());
    match price {
        Some(price) if price.is_finite() && price >= 0.0 => price,
        _ => 0.0,
    }
}

pub fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
