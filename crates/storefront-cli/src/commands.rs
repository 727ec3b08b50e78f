use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde_json::{json, Value};
use storefront_core::{
    normalize_product, parse_product, read_product, CanonicalProduct, EventType,
    RevalidationEvent, StoredProductRecord,
};
use storefront_revalidate::RevalidateClient;

pub(crate) fn normalize(file: Option<&Path>, strict: bool) -> anyhow::Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let input: Value = serde_json::from_str(&raw).context("input is not valid JSON")?;
    let products = normalize_rows(input, strict)?;
    println!("{}", serde_json::to_string_pretty(&products)?);
    Ok(())
}

fn normalize_rows(input: Value, strict: bool) -> anyhow::Result<Vec<CanonicalProduct>> {
    let rows = match input {
        Value::Array(items) => items,
        other => vec![other],
    };

    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let record = StoredProductRecord::from_value(row)
                .with_context(|| format!("row {idx} is not a JSON object"))?;
            if strict {
                Ok(parse_product(&record)?)
            } else {
                Ok(normalize_product(&record))
            }
        })
        .collect()
}

pub(crate) fn build_event(
    event_type: EventType,
    slug: Option<&str>,
    old_slug: Option<&str>,
    featured: bool,
    was_featured: bool,
) -> RevalidationEvent {
    let record = |slug: Option<&str>, featured: bool| {
        let mut fields = serde_json::Map::new();
        if let Some(slug) = slug {
            fields.insert("slug".to_string(), json!(slug));
        }
        fields.insert("is_featured".to_string(), json!(featured));
        StoredProductRecord::new(fields)
    };

    let has_old = old_slug.is_some() || was_featured;
    RevalidationEvent {
        event_type,
        record: if event_type == EventType::Delete && slug.is_none() {
            StoredProductRecord::default()
        } else {
            record(slug, featured)
        },
        old_record: has_old.then(|| record(old_slug, was_featured)),
    }
}

pub(crate) async fn revalidate(event: &RevalidationEvent) -> anyhow::Result<()> {
    let config = storefront_core::load_app_config()?;
    let client = RevalidateClient::from_config(&config)?;
    tracing::info!(endpoint = %client.endpoint(), event_type = %event.event_type, "forwarding event");

    let receipt = client.forward(event).await?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}

pub(crate) async fn compare(ids: &[String]) -> anyhow::Result<()> {
    let config = storefront_core::load_app_config()?;
    let pool_config = storefront_db::PoolConfig::from_app_config(&config);
    let pool = storefront_db::connect_pool(&config.database_url, pool_config).await?;

    let rows = storefront_db::fetch_products_by_ids(&pool, ids).await?;
    if rows.len() < ids.len() {
        tracing::warn!(
            requested = ids.len(),
            found = rows.len(),
            "some product ids were not found"
        );
    }

    let products: Vec<CanonicalProduct> = rows.iter().map(read_product).collect();
    println!("{}", serde_json::to_string_pretty(&products)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use storefront_core::{RevalidationPlan, PLACEHOLDER_IMAGE};

    use super::*;

    #[test]
    fn normalize_rows_accepts_single_object() {
        let products = normalize_rows(json!({ "id": "1", "slug": "stool" }), false).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].images, vec![PLACEHOLDER_IMAGE]);
    }

    #[test]
    fn normalize_rows_rejects_non_object_rows() {
        let err = normalize_rows(json!([{ "id": "1" }, 5]), false).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn normalize_rows_strict_surfaces_validation_error() {
        let err = normalize_rows(json!({ "id": "1", "slug": "stool" }), true).unwrap_err();
        assert!(err.to_string().contains("invalid product record 1"));
    }

    #[test]
    fn build_event_rename_produces_both_detail_paths() {
        let event = build_event(EventType::Update, Some("new"), Some("old"), false, false);
        let plan = RevalidationPlan::for_event(&event);
        assert!(plan.paths.contains(&"/products/new".to_string()));
        assert!(plan.paths.contains(&"/products/old".to_string()));
        assert!(!plan.paths.contains(&"/".to_string()));
    }

    #[test]
    fn build_event_delete_without_slug_uses_old_record() {
        let event = build_event(EventType::Delete, None, Some("gone"), false, true);
        assert!(event.record.is_empty());
        let plan = RevalidationPlan::for_event(&event);
        assert_eq!(plan.paths, vec!["/products", "/products/gone", "/"]);
    }
}
