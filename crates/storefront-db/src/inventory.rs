//! Stock levels per product and warehouse.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// A row from the `inventory` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InventoryRow {
    pub product_id: String,
    pub warehouse_id: i64,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// Sets the stock level for a product in a warehouse.
///
/// Conflicts on `(product_id, warehouse_id)` replace `quantity` and bump
/// `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the product or warehouse does not exist,
/// or [`DbError::Sqlx`] for any other failure (including a negative
/// quantity rejected by the table check).
pub async fn upsert_inventory(
    pool: &PgPool,
    product_id: &str,
    warehouse_id: i64,
    quantity: i32,
) -> Result<InventoryRow, DbError> {
    let result = sqlx::query_as::<_, InventoryRow>(
        "INSERT INTO inventory (product_id, warehouse_id, quantity) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (product_id, warehouse_id) DO UPDATE SET \
             quantity   = EXCLUDED.quantity, \
             updated_at = NOW() \
         RETURNING product_id, warehouse_id, quantity, updated_at",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .bind(quantity)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(db_err))
            if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
        {
            tracing::debug!(product_id, warehouse_id, "inventory upsert hit missing parent row");
            Err(DbError::NotFound)
        }
        Err(e) => Err(DbError::Sqlx(e)),
    }
}
