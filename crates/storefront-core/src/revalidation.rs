//! Revalidation events and the cache paths/tags they invalidate.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::products::StoredProductRecord;

/// Product listing page; invalidated on every event.
pub const PRODUCTS_PATH: &str = "/products";
/// Cache tag attached to listing data.
pub const PRODUCTS_TAG: &str = "products";
/// Storefront home page (featured products and deals).
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Insert => write!(f, "INSERT"),
            EventType::Update => write!(f, "UPDATE"),
            EventType::Delete => write!(f, "DELETE"),
        }
    }
}

/// A change notification for a single product row.
///
/// Database webhooks send `record: null` on DELETE; that deserializes as an
/// empty record and the deleted row is read from `old_record`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevalidationEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub record: StoredProductRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_record: Option<StoredProductRecord>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<StoredProductRecord, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StoredProductRecord>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Cache paths and tags affected by one event, de-duplicated and in the
/// order the rules fired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevalidationPlan {
    pub paths: Vec<String>,
    pub tags: Vec<String>,
}

impl RevalidationPlan {
    /// Computes the plan for `event`. Every applicable rule contributes:
    ///
    /// - the listing path and tag, always;
    /// - `/products/{slug}` for the new record's slug;
    /// - `/products/{old_slug}` when an UPDATE renamed the slug, or for the
    ///   deleted row on DELETE;
    /// - `/` when either record is (or was) featured or a featured deal.
    #[must_use]
    pub fn for_event(event: &RevalidationEvent) -> Self {
        let mut plan = Self::default();
        plan.push_path(PRODUCTS_PATH.to_string());
        plan.push_tag(PRODUCTS_TAG.to_string());

        let new_slug = event.record.slug();
        if let Some(slug) = new_slug {
            plan.push_path(product_path(slug));
        }

        let old = event.old_record.as_ref();
        let old_slug = old.and_then(StoredProductRecord::slug);
        match (event.event_type, old_slug) {
            (EventType::Update, Some(old_slug)) if Some(old_slug) != new_slug => {
                plan.push_path(product_path(old_slug));
            }
            (EventType::Delete, Some(old_slug)) => plan.push_path(product_path(old_slug)),
            _ => {}
        }

        let touches_home = ["is_featured", "is_featured_deal"].iter().any(|field| {
            flag(&event.record, field) || old.is_some_and(|r| flag(r, field))
        });
        if touches_home {
            plan.push_path(HOME_PATH.to_string());
        }

        plan
    }

    fn push_path(&mut self, path: String) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    fn push_tag(&mut self, tag: String) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }
}

/// Detail page path for a product slug.
#[must_use]
pub fn product_path(slug: &str) -> String {
    format!("{PRODUCTS_PATH}/{slug}")
}

fn flag(record: &StoredProductRecord, field: &str) -> bool {
    match record.get(field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}
