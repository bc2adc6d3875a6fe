//! Barang routes - inventory items

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::models::{Barang, BarangInput};
use crate::state::AppState;
use crate::{Error, Result};

fn validate_barang(input: &BarangInput) -> Result<()> {
    if input.nama_barang.is_empty() {
        return Err(Error::BadRequest("nama_barang is required".to_string()));
    }
    if input.stok < 0 {
        return Err(Error::BadRequest("stok cannot be negative".to_string()));
    }
    if input.harga < 0.0 {
        return Err(Error::BadRequest("harga cannot be negative".to_string()));
    }
    if input.harga_modal < 0.0 {
        return Err(Error::BadRequest(
            "harga_modal cannot be negative".to_string(),
        ));
    }
    if input.harga_modal > input.harga {
        return Err(Error::BadRequest(
            "harga_modal cannot exceed harga".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/pegawai/barang - List inventory, ordered by name
pub async fn list_barang(State(state): State<AppState>) -> Result<Json<Vec<Barang>>> {
    let items: Vec<Barang> = sqlx::query_as(
        r#"
        SELECT id_barang, nama_barang, stok, harga, harga_modal
        FROM barang
        ORDER BY nama_barang ASC
        "#,
    )
    .fetch_all(state.pool())
    .await?;

    Ok(Json(items))
}

/// POST /api/pegawai/barang - Add an inventory item
pub async fn create_barang(
    State(state): State<AppState>,
    Json(input): Json<BarangInput>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    validate_barang(&input)?;

    let (id_barang,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO barang (nama_barang, stok, harga, harga_modal)
        VALUES (?, ?, ?, ?)
        RETURNING id_barang
        "#,
    )
    .bind(&input.nama_barang)
    .bind(input.stok)
    .bind(input.harga)
    .bind(input.harga_modal)
    .fetch_one(state.pool())
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Barang created", "id_barang": id_barang })),
    ))
}

/// PUT /api/pegawai/barang/{id} - Update an inventory item
pub async fn update_barang(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<BarangInput>,
) -> Result<Json<serde_json::Value>> {
    validate_barang(&input)?;

    let result = sqlx::query(
        r#"
        UPDATE barang
        SET nama_barang = ?, stok = ?, harga = ?, harga_modal = ?
        WHERE id_barang = ?
        "#,
    )
    .bind(&input.nama_barang)
    .bind(input.stok)
    .bind(input.harga)
    .bind(input.harga_modal)
    .bind(id)
    .execute(state.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Barang {} not found", id)));
    }

    Ok(Json(json!({ "message": "Barang updated" })))
}

/// DELETE /api/pegawai/barang/{id} - Remove an inventory item
pub async fn delete_barang(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM barang WHERE id_barang = ?")
        .bind(id)
        .execute(state.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Barang {} not found", id)));
    }

    Ok(Json(json!({ "message": "Barang deleted" })))
}
