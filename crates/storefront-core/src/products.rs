use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A product row exactly as the backing store returned it.
///
/// Columns may be missing, null, plain strings, JSON-encoded strings, or
/// native arrays. Nothing about the shape is trusted until it passes through
/// [`crate::normalize_product`] or [`crate::parse_product`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredProductRecord(Map<String, Value>);

impl StoredProductRecord {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wraps a JSON value when it is an object; any other shape yields `None`.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the field value, treating an explicit `null` as absent.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Returns the field as a non-empty string, if it is one.
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.str_field("slug")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for StoredProductRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// The typed product shape consumed by catalog, detail, home, and compare
/// pages. Field names serialize exactly as the storefront front-end expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub features: Vec<String>,
    /// Never empty; falls back to [`crate::PLACEHOLDER_IMAGE`].
    pub images: Vec<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub videos: Vec<String>,
    pub price: f64,
    pub original_price: f64,
    pub discount_percent: f64,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
    #[serde(rename = "isFeatured")]
    pub is_featured: bool,
    pub is_promo: bool,
    pub is_best_seller: bool,
    #[serde(rename = "modelNo")]
    pub model_no: String,
    pub dimensions: String,
    pub materials: String,
    pub weight_capacity: String,
    pub warranty: String,
    pub delivery_timeframe: String,
}
