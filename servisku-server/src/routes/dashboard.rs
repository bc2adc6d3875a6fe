//! Dashboard routes - aggregate stats over the servis and barang tables
//!
//! Three shapes, mounted under both the admin and pegawai scopes:
//! - period stats (today / last 7 days / this month) with a revenue chart
//! - operational overview for the landing page
//! - a single-row simple-stats widget

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::models::{
    BarangMenipis, ChartData, DashboardOverview, DashboardStats, PeriodStats, ServisRingkas,
    SimpleStats,
};
use crate::state::AppState;
use crate::Result;

/// Stock at or below this count as "running low"
const LOW_STOCK_THRESHOLD: i64 = 5;

async fn period_stats(pool: &SqlitePool, where_sql: &str, bind: &str) -> Result<PeriodStats> {
    let sql = format!(
        "SELECT COUNT(*), COALESCE(SUM(s.biaya_total), 0.0) FROM servis s WHERE {}",
        where_sql
    );
    let (total_servis, total_pendapatan): (i64, f64) =
        sqlx::query_as(&sql).bind(bind).fetch_one(pool).await?;

    let sql = format!(
        r#"
        SELECT COALESCE(SUM(ds.jumlah * COALESCE(b.harga_modal, 0.0)), 0.0)
        FROM detail_servis ds
        INNER JOIN servis s ON ds.id_servis = s.id_servis
        LEFT JOIN barang b ON ds.id_barang = b.id_barang
        WHERE {}
        "#,
        where_sql
    );
    let (modal,): (f64,) = sqlx::query_as(&sql).bind(bind).fetch_one(pool).await?;

    Ok(PeriodStats {
        total_servis,
        total_pendapatan,
        laba_bersih: total_pendapatan - modal,
    })
}

/// GET /api/{scope}/dashboard - Period stats plus a 7-day revenue chart
pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    let today = Utc::now().date_naive();
    let week_ago = today - Duration::days(7);
    let month = today.format("%Y-%m").to_string();

    let hari_ini = period_stats(
        state.pool(),
        "DATE(s.tanggal_masuk) = ?",
        &today.to_string(),
    )
    .await?;
    let minggu_ini = period_stats(
        state.pool(),
        "DATE(s.tanggal_masuk) >= ?",
        &week_ago.to_string(),
    )
    .await?;
    let bulan_ini = period_stats(
        state.pool(),
        "strftime('%Y-%m', s.tanggal_masuk) = ?",
        &month,
    )
    .await?;

    let chart_pendapatan: Vec<ChartData> = sqlx::query_as(
        r#"
        SELECT DATE(tanggal_masuk) AS tanggal, COALESCE(SUM(biaya_total), 0.0) AS pendapatan
        FROM servis
        WHERE DATE(tanggal_masuk) >= ?
        GROUP BY DATE(tanggal_masuk)
        ORDER BY tanggal ASC
        "#,
    )
    .bind(week_ago.to_string())
    .fetch_all(state.pool())
    .await?;

    Ok(Json(DashboardStats {
        hari_ini,
        minggu_ini,
        bulan_ini,
        chart_pendapatan,
    }))
}

/// GET /api/{scope}/dashboard-stats - Operational overview
pub async fn dashboard_overview(State(state): State<AppState>) -> Result<Json<DashboardOverview>> {
    let today = Utc::now().date_naive().to_string();
    let month = Utc::now().date_naive().format("%Y-%m").to_string();

    let (total_servis_hari_ini,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM servis WHERE DATE(tanggal_masuk) = ?")
            .bind(&today)
            .fetch_one(state.pool())
            .await?;

    let (servis_dalam_perbaikan,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM servis WHERE status_servis = 'dalam_perbaikan'")
            .fetch_one(state.pool())
            .await?;

    let (servis_selesai,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM servis WHERE status_servis IN ('selesai', 'siap_diambil')",
    )
    .fetch_one(state.pool())
    .await?;

    let (stok_menipis,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM barang WHERE stok <= ?")
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(state.pool())
        .await?;

    let (total_pendapatan_hari_ini,): (f64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(biaya_total), 0.0) FROM servis WHERE DATE(tanggal_masuk) = ?",
    )
    .bind(&today)
    .fetch_one(state.pool())
    .await?;

    let (total_pendapatan_bulan_ini,): (f64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(biaya_total), 0.0) FROM servis WHERE strftime('%Y-%m', tanggal_masuk) = ?",
    )
    .bind(&month)
    .fetch_one(state.pool())
    .await?;

    let servis_hari_ini: Vec<ServisRingkas> = sqlx::query_as(
        r#"
        SELECT id_servis, nama_pelanggan, tipe_hp, status_servis
        FROM servis
        WHERE DATE(tanggal_masuk) = ?
        ORDER BY id_servis DESC
        LIMIT 5
        "#,
    )
    .bind(&today)
    .fetch_all(state.pool())
    .await?;

    let barang_menipis: Vec<BarangMenipis> = sqlx::query_as(
        r#"
        SELECT id_barang, nama_barang, stok
        FROM barang
        WHERE stok <= ?
        ORDER BY stok ASC
        LIMIT 5
        "#,
    )
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_all(state.pool())
    .await?;

    Ok(Json(DashboardOverview {
        total_servis_hari_ini,
        servis_dalam_perbaikan,
        servis_selesai,
        stok_menipis,
        total_pendapatan_hari_ini,
        total_pendapatan_bulan_ini,
        servis_hari_ini,
        barang_menipis,
    }))
}

/// GET /api/{scope}/simple-stats - Today's counters in one row
pub async fn simple_stats(State(state): State<AppState>) -> Result<Json<SimpleStats>> {
    let today = Utc::now().date_naive().to_string();

    let (total_servis, total_pendapatan, servis_selesai, servis_proses): (i64, f64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(biaya_total), 0.0),
                COALESCE(SUM(CASE WHEN status_servis IN ('selesai', 'siap_diambil') THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status_servis = 'dalam_perbaikan' THEN 1 ELSE 0 END), 0)
            FROM servis
            WHERE DATE(tanggal_masuk) = ?
            "#,
        )
        .bind(&today)
        .fetch_one(state.pool())
        .await?;

    Ok(Json(SimpleStats {
        total_servis,
        total_pendapatan,
        servis_selesai,
        servis_proses,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_util::{json_body, pegawai_request, request, test_app};

    #[tokio::test]
    async fn test_dashboard_counts_today() {
        let (app, _state) = test_app().await;

        let ticket = r#"{
            "nama_pelanggan": "Rudi",
            "no_whatsapp": "0813111222",
            "tipe_hp": "Xiaomi Redmi 9",
            "keluhan": "Mati total",
            "status_servis": "dalam_perbaikan",
            "biaya_servis": 75000.0
        }"#;
        let response = request(&app, pegawai_request("POST", "/api/pegawai/servis", Some(ticket))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = request(
            &app,
            pegawai_request("GET", "/api/pegawai/dashboard-stats", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let overview = json_body(response).await;
        assert_eq!(overview["total_servis_hari_ini"].as_i64().unwrap(), 1);
        assert_eq!(overview["servis_dalam_perbaikan"].as_i64().unwrap(), 1);
        assert_eq!(
            overview["total_pendapatan_hari_ini"].as_f64().unwrap(),
            75000.0
        );
        assert_eq!(overview["servis_hari_ini"].as_array().unwrap().len(), 1);

        let response = request(&app, pegawai_request("GET", "/api/pegawai/dashboard", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let stats = json_body(response).await;
        assert_eq!(stats["hari_ini"]["total_servis"].as_i64().unwrap(), 1);
        assert_eq!(
            stats["hari_ini"]["total_pendapatan"].as_f64().unwrap(),
            75000.0
        );
        assert_eq!(stats["chart_pendapatan"].as_array().unwrap().len(), 1);

        let response = request(&app, pegawai_request("GET", "/api/pegawai/simple-stats", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let simple = json_body(response).await;
        assert_eq!(simple["total_servis"].as_i64().unwrap(), 1);
        assert_eq!(simple["servis_proses"].as_i64().unwrap(), 1);
        assert_eq!(simple["servis_selesai"].as_i64().unwrap(), 0);
    }
}
