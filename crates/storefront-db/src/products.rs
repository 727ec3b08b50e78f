//! Read queries for the `products` table.
//!
//! Rows are selected as `to_jsonb(p)` so callers receive the stored shape
//! untouched and normalize it themselves.

use serde_json::Value;
use sqlx::PgPool;
use storefront_core::StoredProductRecord;

use crate::DbError;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Filters for [`list_products`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductListFilters<'a> {
    pub category: Option<&'a str>,
    /// Clamped to `1..=200`; defaults to 50.
    pub limit: Option<i64>,
}

/// Row limit actually applied by the listing queries.
#[must_use]
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn into_records(rows: Vec<Value>) -> Vec<StoredProductRecord> {
    rows.into_iter()
        .filter_map(StoredProductRecord::from_value)
        .collect()
}

/// Fetches the products whose ids appear in `ids`, in the order given.
/// Unknown ids are skipped; duplicates in `ids` yield one row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_products_by_ids(
    pool: &PgPool,
    ids: &[String],
) -> Result<Vec<StoredProductRecord>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_scalar::<_, Value>(
        "SELECT to_jsonb(p) FROM products p \
         WHERE p.id = ANY($1::text[]) \
         ORDER BY array_position($1::text[], p.id)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(into_records(rows))
}

/// Lists products ordered by name, optionally filtered by category.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    filters: ProductListFilters<'_>,
) -> Result<Vec<StoredProductRecord>, DbError> {
    let rows = sqlx::query_scalar::<_, Value>(
        "SELECT to_jsonb(p) FROM products p \
         WHERE ($1::text IS NULL OR p.category = $1) \
         ORDER BY p.name, p.id \
         LIMIT $2",
    )
    .bind(filters.category)
    .bind(clamp_limit(filters.limit))
    .fetch_all(pool)
    .await?;

    Ok(into_records(rows))
}

/// Fetches one product by slug.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<StoredProductRecord>, DbError> {
    let row = sqlx::query_scalar::<_, Value>("SELECT to_jsonb(p) FROM products p WHERE p.slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    Ok(row.and_then(StoredProductRecord::from_value))
}

/// Products flagged `is_featured`, most recently updated first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_featured_products(
    pool: &PgPool,
    limit: Option<i64>,
) -> Result<Vec<StoredProductRecord>, DbError> {
    let rows = sqlx::query_scalar::<_, Value>(
        "SELECT to_jsonb(p) FROM products p \
         WHERE p.is_featured \
         ORDER BY p.updated_at DESC, p.id \
         LIMIT $1",
    )
    .bind(clamp_limit(limit))
    .fetch_all(pool)
    .await?;

    Ok(into_records(rows))
}

/// Products flagged `is_featured_deal`, largest discount first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_featured_deals(
    pool: &PgPool,
    limit: Option<i64>,
) -> Result<Vec<StoredProductRecord>, DbError> {
    let rows = sqlx::query_scalar::<_, Value>(
        "SELECT to_jsonb(p) FROM products p \
         WHERE p.is_featured_deal \
         ORDER BY p.discount_percent DESC NULLS LAST, p.id \
         LIMIT $1",
    )
    .bind(clamp_limit(limit))
    .fetch_all(pool)
    .await?;

    Ok(into_records(rows))
}
