//! Pegawai routes - staff records (admin scope)
//!
//! A pegawai row links 1:1 to an existing user account. Deleting the
//! staff record leaves the user account intact.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::json;

use servisku_core::{hash_password, ROLE_PEGAWAI};

use crate::models::{AvailableUser, CreatePegawai, PegawaiRow, UpdatePegawai};
use crate::state::AppState;
use crate::{Error, Result};

/// GET /api/admin/pegawai/available-users - Users not yet linked as staff
pub async fn available_users(State(state): State<AppState>) -> Result<Json<Vec<AvailableUser>>> {
    let users: Vec<AvailableUser> = sqlx::query_as(
        r#"
        SELECT u.id_user, u.nama, u.username
        FROM user u
        LEFT JOIN pegawai p ON u.id_user = p.id_user
        WHERE u.role = ? AND p.id_pegawai IS NULL
        ORDER BY u.nama ASC
        "#,
    )
    .bind(ROLE_PEGAWAI)
    .fetch_all(state.pool())
    .await?;

    Ok(Json(users))
}

/// GET /api/admin/pegawai - Staff joined with their user accounts
pub async fn list_pegawai(State(state): State<AppState>) -> Result<Json<Vec<PegawaiRow>>> {
    let rows: Vec<PegawaiRow> = sqlx::query_as(
        r#"
        SELECT
            p.id_pegawai,
            p.id_user,
            p.nama_pegawai,
            u.username,
            p.jabatan,
            COALESCE(p.alamat, '') AS alamat,
            COALESCE(p.no_hp, '') AS no_hp,
            p.tanggal_masuk,
            p.status
        FROM pegawai p
        JOIN user u ON p.id_user = u.id_user
        ORDER BY p.id_pegawai DESC
        "#,
    )
    .fetch_all(state.pool())
    .await?;

    Ok(Json(rows))
}

/// POST /api/admin/pegawai - Link an existing user as staff
pub async fn create_pegawai(
    State(state): State<AppState>,
    Json(req): Json<CreatePegawai>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    if req.id_user == 0 {
        return Err(Error::BadRequest("id_user is required".to_string()));
    }
    if req.jabatan.is_empty() {
        return Err(Error::BadRequest("jabatan is required".to_string()));
    }

    let nama: Option<(String,)> = sqlx::query_as("SELECT nama FROM user WHERE id_user = ?")
        .bind(req.id_user)
        .fetch_optional(state.pool())
        .await?;
    let (nama_user,) = nama.ok_or_else(|| Error::NotFound("user not found".to_string()))?;

    let (linked,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pegawai WHERE id_user = ?")
        .bind(req.id_user)
        .fetch_one(state.pool())
        .await?;
    if linked > 0 {
        return Err(Error::BadRequest(
            "user is already registered as pegawai".to_string(),
        ));
    }

    let status = match req.status {
        Some(s) if !s.is_empty() => s,
        _ => "aktif".to_string(),
    };

    let (id_pegawai,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO pegawai (id_user, nama_pegawai, jabatan, alamat, no_hp, tanggal_masuk, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id_pegawai
        "#,
    )
    .bind(req.id_user)
    .bind(&nama_user)
    .bind(&req.jabatan)
    .bind(&req.alamat)
    .bind(&req.no_hp)
    .bind(Utc::now().naive_utc())
    .bind(&status)
    .fetch_one(state.pool())
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Pegawai created", "id_pegawai": id_pegawai })),
    ))
}

/// PUT /api/admin/pegawai/{id} - Update a staff record
///
/// A non-blank password in the body resets the linked user's password.
pub async fn update_pegawai(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePegawai>,
) -> Result<Json<serde_json::Value>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id_user FROM pegawai WHERE id_pegawai = ?")
        .bind(id)
        .fetch_optional(state.pool())
        .await?;
    let (id_user,) = row.ok_or_else(|| Error::NotFound(format!("Pegawai {} not found", id)))?;

    if let Some(password) = req.password.as_deref() {
        if !password.trim().is_empty() {
            let hashed = hash_password(password)?;
            sqlx::query("UPDATE user SET password = ? WHERE id_user = ?")
                .bind(&hashed)
                .bind(id_user)
                .execute(state.pool())
                .await?;
        }
    }

    sqlx::query(
        r#"
        UPDATE pegawai
        SET jabatan = ?, alamat = ?, no_hp = ?, status = ?
        WHERE id_pegawai = ?
        "#,
    )
    .bind(&req.jabatan)
    .bind(&req.alamat)
    .bind(&req.no_hp)
    .bind(&req.status)
    .bind(id)
    .execute(state.pool())
    .await?;

    Ok(Json(json!({ "message": "Pegawai updated" })))
}

/// DELETE /api/admin/pegawai/{id} - Remove a staff record, keep the user
pub async fn delete_pegawai(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM pegawai WHERE id_pegawai = ?")
        .bind(id)
        .execute(state.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Pegawai {} not found", id)));
    }

    Ok(Json(json!({ "message": "Pegawai deleted" })))
}
