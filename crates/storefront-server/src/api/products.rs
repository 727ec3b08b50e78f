//! Catalog read endpoints. Listing, detail, and home responses are served
//! from the page cache when present; compare always reads through.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_core::{
    product_path, read_product, CanonicalProduct, StoredProductRecord, HOME_PATH, PRODUCTS_PATH,
    PRODUCTS_TAG,
};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_COMPARE_IDS: usize = 20;
const HOME_SECTION_LIMIT: i64 = 12;

const X_CACHE: &str = "x-cache";

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompareQuery {
    /// Comma-separated product ids.
    #[serde(default)]
    pub ids: String,
}

#[derive(Debug, Serialize)]
pub(super) struct HomeData {
    featured: Vec<CanonicalProduct>,
    deals: Vec<CanonicalProduct>,
}

fn to_canonical_all(records: &[StoredProductRecord]) -> Vec<CanonicalProduct> {
    records.iter().map(read_product).collect()
}

/// Cache key for a listing request. The category is percent-encoded and the
/// limit is the clamped value the query runs with, so one query's result set
/// can never be stored under another query's key.
fn listing_key(query: &ProductQuery) -> String {
    if query.category.is_none() && query.limit.is_none() {
        return PRODUCTS_PATH.to_string();
    }
    let limit = storefront_db::clamp_limit(query.limit);
    match &query.category {
        Some(category) => format!(
            "{PRODUCTS_PATH}?category={}&limit={limit}",
            utf8_percent_encode(category, NON_ALPHANUMERIC)
        ),
        None => format!("{PRODUCTS_PATH}?limit={limit}"),
    }
}

fn cached_response(req_id: RequestId, data: Value, hit: bool) -> impl IntoResponse {
    (
        [(X_CACHE, if hit { "hit" } else { "miss" })],
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

fn to_value<T: Serialize>(request_id: &str, data: &T) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize page data");
        ApiError::new(request_id, "internal_error", "failed to render page data")
    })
}

/// `GET /api/v1/products`
///
/// A store failure degrades to an empty, uncached listing. An empty result
/// for a category filter is not cached either.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let key = listing_key(&query);
    if let Some(data) = state.cache.get(&key).await {
        return Ok(cached_response(req_id, data, true));
    }

    let filters = storefront_db::ProductListFilters {
        category: query.category.as_deref(),
        limit: query.limit,
    };
    match storefront_db::list_products(&state.pool, filters).await {
        Ok(rows) => {
            let data = to_value(&req_id.0, &to_canonical_all(&rows))?;
            if !(rows.is_empty() && query.category.is_some()) {
                state.cache.insert(key, data.clone(), &[PRODUCTS_TAG]).await;
            }
            Ok(cached_response(req_id, data, false))
        }
        Err(e) => {
            tracing::error!(error = %e, "product listing query failed; serving empty list");
            Ok(cached_response(req_id, Value::Array(Vec::new()), false))
        }
    }
}

/// `GET /api/v1/products/{slug}`
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let key = product_path(&slug);
    if let Some(data) = state.cache.get(&key).await {
        return Ok(cached_response(req_id, data, true));
    }

    let row = storefront_db::get_product_by_slug(&state.pool, &slug)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "product not found"))?;

    let data = to_value(&req_id.0, &read_product(&row))?;
    state.cache.insert(key, data.clone(), &[]).await;
    Ok(cached_response(req_id, data, false))
}

/// `GET /api/v1/home`
///
/// Featured products and deals. Either section degrades to empty on a store
/// failure, and a degraded page is not cached.
pub(super) async fn home(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(data) = state.cache.get(HOME_PATH).await {
        return Ok(cached_response(req_id, data, true));
    }

    let featured =
        storefront_db::list_featured_products(&state.pool, Some(HOME_SECTION_LIMIT)).await;
    let deals = storefront_db::list_featured_deals(&state.pool, Some(HOME_SECTION_LIMIT)).await;
    let complete = featured.is_ok() && deals.is_ok();

    let section = |result: Result<Vec<StoredProductRecord>, storefront_db::DbError>,
                   name: &str| {
        result.map_or_else(
            |e| {
                tracing::error!(error = %e, section = name, "home section query failed");
                Vec::new()
            },
            |rows| to_canonical_all(&rows),
        )
    };

    let data = to_value(
        &req_id.0,
        &HomeData {
            featured: section(featured, "featured"),
            deals: section(deals, "deals"),
        },
    )?;

    if complete {
        state.cache.insert(HOME_PATH, data.clone(), &[]).await;
    }
    Ok(cached_response(req_id, data, false))
}

/// `GET /api/v1/compare?ids=a,b,c`
///
/// Bulk fetch then normalize, in request order. A store failure yields an
/// empty list rather than an error.
pub(super) async fn compare_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<Vec<CanonicalProduct>>>, ApiError> {
    let ids = parse_id_list(&query.ids);
    if ids.len() > MAX_COMPARE_IDS {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("at most {MAX_COMPARE_IDS} products can be compared"),
        ));
    }

    let data = match storefront_db::fetch_products_by_ids(&state.pool, &ids).await {
        Ok(rows) => to_canonical_all(&rows),
        Err(e) => {
            tracing::error!(error = %e, count = ids.len(), "compare fetch failed; serving empty list");
            Vec::new()
        }
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn parse_id_list(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_list_trims_and_dedupes() {
        assert_eq!(parse_id_list(" a,b, ,a,c "), vec!["a", "b", "c"]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn listing_key_is_page_path_without_filters() {
        let query = ProductQuery {
            category: None,
            limit: None,
        };
        assert_eq!(listing_key(&query), "/products");
    }

    #[test]
    fn listing_key_includes_clamped_filters() {
        let query = ProductQuery {
            category: Some("sofas".to_string()),
            limit: Some(10),
        };
        assert_eq!(listing_key(&query), "/products?category=sofas&limit=10");

        let oversized = ProductQuery {
            category: None,
            limit: Some(5_000),
        };
        let max = ProductQuery {
            category: None,
            limit: Some(200),
        };
        assert_eq!(listing_key(&oversized), listing_key(&max));
    }

    #[test]
    fn listing_key_escapes_category_separators() {
        let filtered = ProductQuery {
            category: Some("a".to_string()),
            limit: Some(5),
        };
        let smuggled = ProductQuery {
            category: Some("a&limit=5".to_string()),
            limit: None,
        };
        assert_ne!(listing_key(&filtered), listing_key(&smuggled));
        assert_eq!(
            listing_key(&smuggled),
            "/products?category=a%26limit%3D5&limit=50"
        );
    }
}
