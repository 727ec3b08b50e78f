use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SetInventoryRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub(super) struct InventoryItem {
    product_id: String,
    warehouse_id: i64,
    quantity: i32,
    updated_at: DateTime<Utc>,
}

/// `PUT /api/v1/admin/inventory/{product_id}/{warehouse_id}`
pub(super) async fn set_inventory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((product_id, warehouse_id)): Path<(String, i64)>,
    Json(body): Json<SetInventoryRequest>,
) -> Result<Json<ApiResponse<InventoryItem>>, ApiError> {
    if body.quantity < 0 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "quantity must be zero or greater",
        ));
    }

    let row =
        storefront_db::upsert_inventory(&state.pool, &product_id, warehouse_id, body.quantity)
            .await
            .map_err(|e| match e {
                storefront_db::DbError::NotFound => ApiError::new(
                    req_id.0.clone(),
                    "not_found",
                    "product or warehouse not found",
                ),
                other => map_db_error(req_id.0.clone(), &other),
            })?;

    tracing::info!(
        product_id = %row.product_id,
        warehouse_id = row.warehouse_id,
        quantity = row.quantity,
        "inventory updated"
    );

    Ok(Json(ApiResponse {
        data: InventoryItem {
            product_id: row.product_id,
            warehouse_id: row.warehouse_id,
            quantity: row.quantity,
            updated_at: row.updated_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
