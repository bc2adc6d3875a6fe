//! Laporan routes - financial report snapshots
//!
//! Generation aggregates revenue, cost-of-goods, and profit over a date
//! range (by tanggal_masuk date) and freezes the result: the laporan row
//! and its per-ticket snapshot rows are written in one transaction and
//! never recomputed afterwards.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;

use servisku_core::JenisLaporan;

use crate::models::{
    DetailLaporanServis, GenerateLaporan, Laporan, LaporanSummary, LaporanWithDetail,
};
use crate::state::AppState;
use crate::{Error, Result};

const LAPORAN_COLUMNS: &str = r#"
    id_laporan, judul_laporan, jenis_laporan,
    tanggal_awal, tanggal_akhir,
    total_servis, total_pendapatan, total_modal, laba_bersih,
    COALESCE(keterangan, '') AS keterangan, created_at
"#;

/// GET /api/{scope}/laporan - List reports, newest first
pub async fn list_laporan(State(state): State<AppState>) -> Result<Json<Vec<Laporan>>> {
    let sql = format!(
        "SELECT {} FROM laporan ORDER BY created_at DESC, id_laporan DESC",
        LAPORAN_COLUMNS
    );
    let reports: Vec<Laporan> = sqlx::query_as(&sql).fetch_all(state.pool()).await?;

    Ok(Json(reports))
}

/// GET /api/{scope}/laporan/{id} - Report with its snapshot rows
pub async fn get_laporan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LaporanWithDetail>> {
    let sql = format!("SELECT {} FROM laporan WHERE id_laporan = ?", LAPORAN_COLUMNS);
    let laporan: Laporan = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(state.pool())
        .await?
        .ok_or_else(|| Error::NotFound(format!("Laporan {} not found", id)))?;

    let detail_servis: Vec<DetailLaporanServis> = sqlx::query_as(
        r#"
        SELECT id_detail, id_laporan, id_servis, nama_pelanggan, tipe_hp,
               biaya_total, modal_servis, laba_servis
        FROM detail_laporan_servis
        WHERE id_laporan = ?
        ORDER BY id_detail DESC
        "#,
    )
    .bind(id)
    .fetch_all(state.pool())
    .await?;

    Ok(Json(LaporanWithDetail {
        laporan,
        detail_servis,
    }))
}

/// POST /api/{scope}/laporan - Generate a frozen report over a date range
pub async fn generate_laporan(
    State(state): State<AppState>,
    Json(req): Json<GenerateLaporan>,
) -> Result<Json<serde_json::Value>> {
    let jenis = JenisLaporan::parse(&req.jenis_laporan)
        .ok_or_else(|| Error::BadRequest("invalid jenis_laporan".to_string()))?;

    let judul = format!(
        "Laporan {} - {} s/d {}",
        jenis.title(),
        req.tanggal_awal,
        req.tanggal_akhir
    );

    let mut tx = state.pool().begin().await?;

    let (total_servis, total_pendapatan): (i64, f64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(biaya_total), 0.0)
        FROM servis
        WHERE DATE(tanggal_masuk) BETWEEN ? AND ?
        "#,
    )
    .bind(req.tanggal_awal)
    .bind(req.tanggal_akhir)
    .fetch_one(&mut *tx)
    .await?;

    // Cost-of-goods: purchase price of the inventory consumed, not the
    // sale price on the line item
    let (total_modal,): (f64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(ds.jumlah * COALESCE(b.harga_modal, 0.0)), 0.0)
        FROM detail_servis ds
        INNER JOIN servis s ON ds.id_servis = s.id_servis
        LEFT JOIN barang b ON ds.id_barang = b.id_barang
        WHERE DATE(s.tanggal_masuk) BETWEEN ? AND ?
        "#,
    )
    .bind(req.tanggal_awal)
    .bind(req.tanggal_akhir)
    .fetch_one(&mut *tx)
    .await?;

    let laba_bersih = total_pendapatan - total_modal;

    let (id_laporan,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO laporan (judul_laporan, jenis_laporan, tanggal_awal, tanggal_akhir,
                             total_servis, total_pendapatan, total_modal, laba_bersih, keterangan)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id_laporan
        "#,
    )
    .bind(&judul)
    .bind(jenis.as_str())
    .bind(req.tanggal_awal)
    .bind(req.tanggal_akhir)
    .bind(total_servis)
    .bind(total_pendapatan)
    .bind(total_modal)
    .bind(laba_bersih)
    .bind(&req.keterangan)
    .fetch_one(&mut *tx)
    .await?;

    // Per-ticket snapshot rows, frozen at generation time
    sqlx::query(
        r#"
        INSERT INTO detail_laporan_servis (id_laporan, id_servis, nama_pelanggan, tipe_hp,
                                           biaya_total, modal_servis, laba_servis)
        SELECT
            ?,
            s.id_servis,
            s.nama_pelanggan,
            s.tipe_hp,
            s.biaya_total,
            COALESCE(SUM(ds.jumlah * COALESCE(b.harga_modal, 0.0)), 0.0),
            s.biaya_total - COALESCE(SUM(ds.jumlah * COALESCE(b.harga_modal, 0.0)), 0.0)
        FROM servis s
        LEFT JOIN detail_servis ds ON s.id_servis = ds.id_servis
        LEFT JOIN barang b ON ds.id_barang = b.id_barang
        WHERE DATE(s.tanggal_masuk) BETWEEN ? AND ?
        GROUP BY s.id_servis
        "#,
    )
    .bind(id_laporan)
    .bind(req.tanggal_awal)
    .bind(req.tanggal_akhir)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Generated laporan {}: servis={} pendapatan={} modal={} laba={}",
        id_laporan,
        total_servis,
        total_pendapatan,
        total_modal,
        laba_bersih
    );

    Ok(Json(json!({
        "message": "Laporan created",
        "id_laporan": id_laporan,
        "summary": LaporanSummary {
            total_servis,
            total_pendapatan,
            total_modal,
            laba_bersih,
        },
    })))
}

/// DELETE /api/{scope}/laporan/{id} - Delete a report and its snapshots
pub async fn delete_laporan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let mut tx = state.pool().begin().await?;

    sqlx::query("DELETE FROM detail_laporan_servis WHERE id_laporan = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM laporan WHERE id_laporan = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Laporan {} not found", id)));
    }

    tx.commit().await?;

    Ok(Json(json!({ "message": "Laporan deleted" })))
}
