//! Conversion from [`StoredProductRecord`] to [`CanonicalProduct`].
//!
//! [`normalize_product`] is the lenient path used on every read: it never
//! fails and substitutes defaults for anything missing or malformed.
//! [`parse_product`] applies the same mapping but first rejects rows whose
//! required, numeric, or flag fields are shaped wrong, so callers can log the
//! bad row instead of silently rendering zeros. [`read_product`] combines
//! the two for read paths.

use serde_json::Value;

use crate::error::{FieldIssue, ValidationError};
use crate::products::{CanonicalProduct, StoredProductRecord};

/// Image used when a row carries no usable image data at all.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-product.jpg";

const REQUIRED_TEXT_FIELDS: [&str; 4] = ["name", "slug", "category", "description"];
const NUMERIC_FIELDS: [&str; 3] = ["price", "original_price", "discount_percent"];
const FLAG_FIELDS: [&str; 4] = ["in_stock", "is_featured", "is_promo", "is_best_seller"];

/// Normalizes a stored row into a [`CanonicalProduct`].
///
/// Infallible: absent optional fields become empty strings, `0`, or `false`;
/// `original_price` falls back to `price`; `images` always has at least one
/// entry.
#[must_use]
pub fn normalize_product(record: &StoredProductRecord) -> CanonicalProduct {
    let images = resolve_images(record);
    let image_url = images
        .first()
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    let price = to_number(record.get("price"));
    let original_price = record
        .get("original_price")
        .map_or(price, |v| to_number(Some(v)));

    CanonicalProduct {
        id: to_text(record.get("id")),
        slug: to_text(record.get("slug")),
        name: to_text(record.get("name")),
        category: to_text(record.get("category")),
        description: to_text(record.get("description")),
        features: record.get("features").map(resolve_features).unwrap_or_default(),
        images,
        image_url,
        videos: Vec::new(),
        price,
        original_price,
        discount_percent: to_number(record.get("discount_percent")),
        in_stock: is_truthy(record.get("in_stock")),
        is_featured: is_truthy(record.get("is_featured")),
        is_promo: is_truthy(record.get("is_promo")),
        is_best_seller: is_truthy(record.get("is_best_seller")),
        model_no: to_text(record.get("model_no")),
        dimensions: to_text(record.get("dimensions")),
        materials: to_text(record.get("materials")),
        weight_capacity: to_text(record.get("weight_capacity")),
        warranty: to_text(record.get("warranty")),
        delivery_timeframe: to_text(record.get("delivery_timeframe")),
    }
}

/// Read-path conversion: strict parse first so malformed rows show up in
/// logs, then the lenient mapping so the page still renders.
#[must_use]
pub fn read_product(record: &StoredProductRecord) -> CanonicalProduct {
    parse_product(record).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "stored product failed validation; using defaults");
        normalize_product(record)
    })
}

/// Strictly parses a stored row into a [`CanonicalProduct`].
///
/// # Errors
///
/// Returns [`ValidationError`] listing every field that is missing when
/// required, non-numeric where a number is expected, or non-boolean where a
/// flag is expected.
pub fn parse_product(record: &StoredProductRecord) -> Result<CanonicalProduct, ValidationError> {
    let mut issues = Vec::new();

    match record.get("id") {
        Some(Value::String(s)) if !s.is_empty() => {}
        Some(Value::Number(_)) => {}
        Some(other) => issues.push(FieldIssue {
            field: "id",
            reason: format!("expected string or number, got {}", kind(other)),
        }),
        None => issues.push(missing("id")),
    }

    for field in REQUIRED_TEXT_FIELDS {
        match record.get(field) {
            Some(Value::String(s)) if field == "description" || !s.is_empty() => {}
            Some(Value::String(_)) => issues.push(FieldIssue {
                field,
                reason: "must not be empty".to_string(),
            }),
            Some(other) => issues.push(FieldIssue {
                field,
                reason: format!("expected string, got {}", kind(other)),
            }),
            None => issues.push(missing(field)),
        }
    }

    for field in NUMERIC_FIELDS {
        match record.get(field) {
            Some(value) => {
                if parse_numeric(value).is_none() {
                    issues.push(FieldIssue {
                        field,
                        reason: format!("expected a finite number, got {}", describe(value)),
                    });
                }
            }
            None if field == "price" => issues.push(missing(field)),
            None => {}
        }
    }

    for field in FLAG_FIELDS {
        if let Some(value) = record.get(field) {
            if !value.is_boolean() {
                issues.push(FieldIssue {
                    field,
                    reason: format!("expected boolean, got {}", describe(value)),
                });
            }
        }
    }

    match record.get("images") {
        None | Some(Value::Array(_) | Value::String(_)) => {}
        Some(other) => issues.push(FieldIssue {
            field: "images",
            reason: format!("expected array or string, got {}", kind(other)),
        }),
    }

    if issues.is_empty() {
        Ok(normalize_product(record))
    } else {
        let record_id = record
            .get("id")
            .map_or_else(|| "<unknown>".to_string(), |v| to_text(Some(v)));
        Err(ValidationError { record_id, issues })
    }
}

/// Resolves the ordered image list for a row. Never returns an empty vec.
fn resolve_images(record: &StoredProductRecord) -> Vec<String> {
    let mut images = match record.get("images") {
        Some(Value::Array(items)) => text_items(items),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => text_items(&items),
            _ => split_delimited(raw),
        },
        _ => Vec::new(),
    };

    if images.is_empty() {
        if let Some(url) = record.str_field("image_url") {
            images.push(url.to_string());
        }
    }

    if images.is_empty() {
        images.push(PLACEHOLDER_IMAGE.to_string());
    }

    images
}

/// Features arrive as a native array, a JSON-encoded array, or one plain
/// string. Plain strings are not split: feature text routinely contains
/// commas.
fn resolve_features(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => text_items(items),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => text_items(&items),
            _ => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Vec::new()
                } else {
                    vec![trimmed.to_string()]
                }
            }
        },
        other => text_items(std::slice::from_ref(other)),
    }
}

fn text_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| to_text(Some(item)).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn split_delimited(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Numeric cast. Unparseable or non-finite input becomes `0.0`.
fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(v) => parse_numeric(v).unwrap_or(0.0),
    }
}

/// Parses numbers and numeric strings. A blank string counts as zero, the
/// same way a numeric cast treats it.
fn parse_numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_text(n),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| to_text(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(obj @ Value::Object(_)) => obj.to_string(),
    }
}

// Whole floats render without a trailing `.0` so `500.0` and `500` read the same.
#[allow(clippy::cast_possible_truncation)]
fn number_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

fn missing(field: &'static str) -> FieldIssue {
    FieldIssue {
        field,
        reason: "required field is missing".to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("string {s:?}"),
        other => kind(other).to_string(),
    }
}
