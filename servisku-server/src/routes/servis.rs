//! Servis routes - repair tickets and their line items
//!
//! Every mutating operation runs in a transaction and re-derives the
//! ticket's biaya_total from its line items plus labor, so the stored
//! total never drifts from SUM(detail_servis.biaya) + biaya_servis.
//! Line-item cost is computed server-side as jumlah * harga_satuan.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::{Sqlite, SqlitePool, Transaction};

use servisku_core::StatusServis;

use crate::models::{
    CreateDetailServis, DetailItemInput, DetailServis, SearchParams, Servis, ServisInput,
    ServisWithDetail,
};
use crate::state::AppState;
use crate::{Error, Result};

async fn fetch_detail(pool: &SqlitePool, id_servis: i64) -> Result<Vec<DetailServis>> {
    let detail: Vec<DetailServis> = sqlx::query_as(
        r#"
        SELECT id_detail, id_servis, id_barang, deskripsi, jumlah, harga_satuan, biaya
        FROM detail_servis
        WHERE id_servis = ?
        "#,
    )
    .bind(id_servis)
    .fetch_all(pool)
    .await?;

    Ok(detail)
}

/// Re-derive biaya_total for one ticket inside the caller's transaction
async fn recompute_total(tx: &mut Transaction<'_, Sqlite>, id_servis: i64) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE servis
        SET biaya_total = biaya_servis + (
            SELECT COALESCE(SUM(biaya), 0.0)
            FROM detail_servis
            WHERE detail_servis.id_servis = servis.id_servis
        )
        WHERE id_servis = ?
        "#,
    )
    .bind(id_servis)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_detail_items(
    tx: &mut Transaction<'_, Sqlite>,
    id_servis: i64,
    items: &[DetailItemInput],
) -> Result<()> {
    for item in items {
        let biaya = item.jumlah as f64 * item.harga_satuan;
        sqlx::query(
            r#"
            INSERT INTO detail_servis (id_servis, id_barang, deskripsi, jumlah, harga_satuan, biaya)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id_servis)
        .bind(item.id_barang)
        .bind(&item.deskripsi)
        .bind(item.jumlah)
        .bind(item.harga_satuan)
        .bind(biaya)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// GET /api/servis/search - Public ticket lookup by customer name/phone
pub async fn search_servis(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ServisWithDetail>>> {
    let name = params.name.unwrap_or_default();
    let phone = params.phone.unwrap_or_default();

    if name.is_empty() && phone.is_empty() {
        return Err(Error::BadRequest(
            "name or phone query parameter is required".to_string(),
        ));
    }

    let mut sql = String::from(
        r#"
        SELECT id_servis, nama_pelanggan, no_whatsapp, tipe_hp, keluhan,
               status_servis, biaya_servis, biaya_total, tanggal_masuk, tanggal_selesai
        FROM servis
        WHERE 1=1
        "#,
    );
    if !name.is_empty() {
        sql.push_str(" AND LOWER(nama_pelanggan) LIKE ?");
    }
    if !phone.is_empty() {
        sql.push_str(" AND no_whatsapp LIKE ?");
    }
    sql.push_str(" ORDER BY tanggal_masuk DESC");

    let mut query = sqlx::query_as::<_, Servis>(&sql);
    if !name.is_empty() {
        query = query.bind(format!("%{}%", name.to_lowercase()));
    }
    if !phone.is_empty() {
        query = query.bind(format!("%{}%", phone));
    }

    let tickets = query.fetch_all(state.pool()).await?;

    let mut results = Vec::with_capacity(tickets.len());
    for servis in tickets {
        let detail = fetch_detail(state.pool(), servis.id_servis).await?;
        results.push(ServisWithDetail { servis, detail });
    }

    Ok(Json(results))
}

/// GET /api/pegawai/servis - List all tickets, newest first
pub async fn list_servis(State(state): State<AppState>) -> Result<Json<Vec<Servis>>> {
    let tickets: Vec<Servis> = sqlx::query_as(
        r#"
        SELECT id_servis, nama_pelanggan, no_whatsapp, tipe_hp, keluhan,
               status_servis, biaya_servis, biaya_total, tanggal_masuk, tanggal_selesai
        FROM servis
        ORDER BY id_servis DESC
        "#,
    )
    .fetch_all(state.pool())
    .await?;

    Ok(Json(tickets))
}

/// POST /api/pegawai/servis - Create a ticket with its line items
pub async fn create_servis(
    State(state): State<AppState>,
    Json(req): Json<ServisInput>,
) -> Result<Json<serde_json::Value>> {
    let status = StatusServis::normalize(req.status_servis.as_deref().unwrap_or_default());
    let tanggal_masuk = req.tanggal_masuk.unwrap_or_else(|| Utc::now().naive_utc());

    let mut tx = state.pool().begin().await?;

    let (id_servis,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO servis (nama_pelanggan, no_whatsapp, tipe_hp, keluhan,
                            status_servis, biaya_servis, biaya_total, tanggal_masuk, tanggal_selesai)
        VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
        RETURNING id_servis
        "#,
    )
    .bind(&req.nama_pelanggan)
    .bind(&req.no_whatsapp)
    .bind(&req.tipe_hp)
    .bind(&req.keluhan)
    .bind(status.as_str())
    .bind(req.biaya_servis)
    .bind(tanggal_masuk)
    .bind(req.tanggal_selesai)
    .fetch_one(&mut *tx)
    .await?;

    insert_detail_items(&mut tx, id_servis, &req.detail).await?;
    recompute_total(&mut tx, id_servis).await?;

    tx.commit().await?;

    Ok(Json(json!({ "message": "Servis created", "id_servis": id_servis })))
}

/// GET /api/pegawai/servis/{id} - Ticket with its line items
pub async fn get_servis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ServisWithDetail>> {
    let servis: Servis = sqlx::query_as(
        r#"
        SELECT id_servis, nama_pelanggan, no_whatsapp, tipe_hp, keluhan,
               status_servis, biaya_servis, biaya_total, tanggal_masuk, tanggal_selesai
        FROM servis
        WHERE id_servis = ?
        "#,
    )
    .bind(id)
    .fetch_optional(state.pool())
    .await?
    .ok_or_else(|| Error::NotFound(format!("Servis {} not found", id)))?;

    let detail = fetch_detail(state.pool(), id).await?;

    Ok(Json(ServisWithDetail { servis, detail }))
}

/// PUT /api/pegawai/servis/{id} - Update header, replace line items
pub async fn update_servis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ServisInput>,
) -> Result<Json<serde_json::Value>> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id_servis FROM servis WHERE id_servis = ?")
        .bind(id)
        .fetch_optional(state.pool())
        .await?;
    if exists.is_none() {
        return Err(Error::NotFound(format!("Servis {} not found", id)));
    }

    let status = StatusServis::normalize(req.status_servis.as_deref().unwrap_or_default());

    let mut tx = state.pool().begin().await?;

    sqlx::query(
        r#"
        UPDATE servis
        SET nama_pelanggan = ?, no_whatsapp = ?, tipe_hp = ?, keluhan = ?,
            status_servis = ?, biaya_servis = ?,
            tanggal_masuk = COALESCE(?, tanggal_masuk),
            tanggal_selesai = ?
        WHERE id_servis = ?
        "#,
    )
    .bind(&req.nama_pelanggan)
    .bind(&req.no_whatsapp)
    .bind(&req.tipe_hp)
    .bind(&req.keluhan)
    .bind(status.as_str())
    .bind(req.biaya_servis)
    .bind(req.tanggal_masuk)
    .bind(req.tanggal_selesai)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    // Replace line items wholesale
    sqlx::query("DELETE FROM detail_servis WHERE id_servis = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    insert_detail_items(&mut tx, id, &req.detail).await?;
    recompute_total(&mut tx, id).await?;

    tx.commit().await?;

    Ok(Json(json!({ "message": "Servis updated" })))
}

/// DELETE /api/pegawai/servis/{id} - Delete a ticket and its line items
pub async fn delete_servis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let mut tx = state.pool().begin().await?;

    sqlx::query("DELETE FROM detail_servis WHERE id_servis = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM servis WHERE id_servis = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Servis {} not found", id)));
    }

    tx.commit().await?;

    Ok(Json(json!({ "message": "Servis deleted" })))
}

/// POST /api/pegawai/detail-servis - Add a line item to a ticket
pub async fn add_detail_servis(
    State(state): State<AppState>,
    Json(req): Json<CreateDetailServis>,
) -> Result<Json<serde_json::Value>> {
    let mut tx = state.pool().begin().await?;

    let exists: Option<(i64,)> = sqlx::query_as("SELECT id_servis FROM servis WHERE id_servis = ?")
        .bind(req.id_servis)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(Error::NotFound(format!(
            "Servis {} not found",
            req.id_servis
        )));
    }

    let biaya = req.jumlah as f64 * req.harga_satuan;
    let (id_detail,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO detail_servis (id_servis, id_barang, deskripsi, jumlah, harga_satuan, biaya)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id_detail
        "#,
    )
    .bind(req.id_servis)
    .bind(req.id_barang)
    .bind(&req.deskripsi)
    .bind(req.jumlah)
    .bind(req.harga_satuan)
    .bind(biaya)
    .fetch_one(&mut *tx)
    .await?;

    recompute_total(&mut tx, req.id_servis).await?;

    tx.commit().await?;

    Ok(Json(json!({ "message": "Detail created", "id_detail": id_detail })))
}

/// PUT /api/pegawai/detail-servis/{id} - Update a line item
pub async fn update_detail_servis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CreateDetailServis>,
) -> Result<Json<serde_json::Value>> {
    let mut tx = state.pool().begin().await?;

    let row: Option<(i64,)> = sqlx::query_as("SELECT id_servis FROM detail_servis WHERE id_detail = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let (id_servis,) = row.ok_or_else(|| Error::NotFound(format!("Detail {} not found", id)))?;

    let biaya = req.jumlah as f64 * req.harga_satuan;
    sqlx::query(
        r#"
        UPDATE detail_servis
        SET id_barang = ?, deskripsi = ?, jumlah = ?, harga_satuan = ?, biaya = ?
        WHERE id_detail = ?
        "#,
    )
    .bind(req.id_barang)
    .bind(&req.deskripsi)
    .bind(req.jumlah)
    .bind(req.harga_satuan)
    .bind(biaya)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    recompute_total(&mut tx, id_servis).await?;

    tx.commit().await?;

    Ok(Json(json!({ "message": "Detail updated" })))
}

/// DELETE /api/pegawai/detail-servis/{id} - Remove a line item
pub async fn delete_detail_servis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let mut tx = state.pool().begin().await?;

    let row: Option<(i64,)> = sqlx::query_as("SELECT id_servis FROM detail_servis WHERE id_detail = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let (id_servis,) = row.ok_or_else(|| Error::NotFound(format!("Detail {} not found", id)))?;

    sqlx::query("DELETE FROM detail_servis WHERE id_detail = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    recompute_total(&mut tx, id_servis).await?;

    tx.commit().await?;

    Ok(Json(json!({ "message": "Detail deleted" })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_util::{json_body, pegawai_request, public_request, request, test_app};

    const TICKET: &str = r#"{
        "nama_pelanggan": "Andi Wijaya",
        "no_whatsapp": "0812333444",
        "tipe_hp": "iPhone 11",
        "keluhan": "LCD pecah",
        "status_servis": "dalam perbaikan",
        "biaya_servis": 50000.0,
        "detail": [
            {"deskripsi": "LCD iPhone 11", "jumlah": 1, "harga_satuan": 450000.0},
            {"deskripsi": "Baut set", "jumlah": 2, "harga_satuan": 5000.0}
        ]
    }"#;

    #[tokio::test]
    async fn test_total_is_line_items_plus_labor() {
        let (app, _state) = test_app().await;

        let response = request(&app, pegawai_request("POST", "/api/pegawai/servis", Some(TICKET))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let created = json_body(response).await;
        let id = created["id_servis"].as_i64().unwrap();

        let response = request(
            &app,
            pegawai_request("GET", &format!("/api/pegawai/servis/{}", id), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let ticket = json_body(response).await;

        // 450000 + 2*5000 + 50000 labor, with line-item cost computed
        // server-side from jumlah * harga_satuan
        assert_eq!(ticket["biaya_total"].as_f64().unwrap(), 510000.0);
        assert_eq!(ticket["status_servis"].as_str().unwrap(), "dalam_perbaikan");
        assert_eq!(ticket["detail"].as_array().unwrap().len(), 2);
        assert_eq!(ticket["detail"][1]["biaya"].as_f64().unwrap(), 10000.0);
    }

    #[tokio::test]
    async fn test_detail_mutations_keep_total_consistent() {
        let (app, state) = test_app().await;

        let response = request(&app, pegawai_request("POST", "/api/pegawai/servis", Some(TICKET))).await;
        let id = json_body(response).await["id_servis"].as_i64().unwrap();

        // Add a line item through the standalone endpoint
        let body = format!(
            r#"{{"id_servis": {}, "deskripsi": "Tempered glass", "jumlah": 1, "harga_satuan": 25000.0}}"#,
            id
        );
        let response = request(
            &app,
            pegawai_request("POST", "/api/pegawai/detail-servis", Some(&body)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let id_detail = json_body(response).await["id_detail"].as_i64().unwrap();

        let (total,): (f64,) =
            sqlx::query_as("SELECT biaya_total FROM servis WHERE id_servis = ?")
                .bind(id)
                .fetch_one(state.pool())
                .await
                .unwrap();
        assert_eq!(total, 535000.0);

        // Remove it again
        let response = request(
            &app,
            pegawai_request("DELETE", &format!("/api/pegawai/detail-servis/{}", id_detail), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let (total,): (f64,) =
            sqlx::query_as("SELECT biaya_total FROM servis WHERE id_servis = ?")
                .bind(id)
                .fetch_one(state.pool())
                .await
                .unwrap();
        assert_eq!(total, 510000.0);
    }

    #[tokio::test]
    async fn test_delete_servis_removes_line_items() {
        let (app, state) = test_app().await;

        let response = request(&app, pegawai_request("POST", "/api/pegawai/servis", Some(TICKET))).await;
        let id = json_body(response).await["id_servis"].as_i64().unwrap();

        let response = request(
            &app,
            pegawai_request("DELETE", &format!("/api/pegawai/servis/{}", id), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM detail_servis WHERE id_servis = ?")
                .bind(id)
                .fetch_one(state.pool())
                .await
                .unwrap();
        assert_eq!(count, 0);

        let response = request(
            &app,
            pegawai_request("GET", &format!("/api/pegawai/servis/{}", id), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_public_search() {
        let (app, _state) = test_app().await;

        request(&app, pegawai_request("POST", "/api/pegawai/servis", Some(TICKET))).await;

        // No parameters -> 400
        let response = request(&app, public_request("GET", "/api/servis/search", None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Case-insensitive name match, no token required
        let response = request(
            &app,
            public_request("GET", "/api/servis/search?name=andi", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let results = json_body(response).await;
        assert_eq!(results.as_array().unwrap().len(), 1);
        assert_eq!(results[0]["nama_pelanggan"].as_str().unwrap(), "Andi Wijaya");

        // Phone match
        let response = request(
            &app,
            public_request("GET", "/api/servis/search?phone=0812333", None),
        )
        .await;
        let results = json_body(response).await;
        assert_eq!(results.as_array().unwrap().len(), 1);

        // No hits is an empty array, not an error
        let response = request(
            &app,
            public_request("GET", "/api/servis/search?name=nonexistent", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let results = json_body(response).await;
        assert_eq!(results.as_array().unwrap().len(), 0);
    }
}
