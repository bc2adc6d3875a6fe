//! Data models for the repair-shop API
//!
//! Row structs mirror the relational schema one to one; request and
//! response types follow the JSON wire format the frontend consumes:
//! - User/Pegawai: account and staff records
//! - Barang: inventory items
//! - Servis/DetailServis: repair tickets and their line items
//! - Laporan/DetailLaporanServis: frozen financial report snapshots

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Users
// ============================================================================

/// Public projection of a user, embedded in auth responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id_user: i64,
    pub nama: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub nama: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserPublic,
}

// ============================================================================
// Pegawai
// ============================================================================

/// A staff row joined with its user account for listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PegawaiRow {
    pub id_pegawai: i64,
    pub id_user: i64,
    pub nama_pegawai: String,
    pub username: String,
    /// Position: kasir, teknisi
    pub jabatan: String,
    pub alamat: String,
    pub no_hp: String,
    pub tanggal_masuk: NaiveDateTime,
    /// aktif or nonaktif
    pub status: String,
}

/// A user eligible to be linked as staff
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AvailableUser {
    pub id_user: i64,
    pub nama: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePegawai {
    #[serde(default)]
    pub id_user: i64,
    #[serde(default)]
    pub jabatan: String,
    pub alamat: Option<String>,
    pub no_hp: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePegawai {
    /// When set and non-blank, the linked user's password is re-hashed
    pub password: Option<String>,
    #[serde(default)]
    pub jabatan: String,
    pub alamat: Option<String>,
    pub no_hp: Option<String>,
    #[serde(default)]
    pub status: String,
}

// ============================================================================
// Barang
// ============================================================================

/// An inventory item: sale price (harga) and cost price (harga_modal)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Barang {
    pub id_barang: i64,
    pub nama_barang: String,
    pub stok: i64,
    pub harga: f64,
    pub harga_modal: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BarangInput {
    #[serde(default)]
    pub nama_barang: String,
    #[serde(default)]
    pub stok: i64,
    #[serde(default)]
    pub harga: f64,
    #[serde(default)]
    pub harga_modal: f64,
}

// ============================================================================
// Servis
// ============================================================================

/// A repair ticket. biaya_total is derived: line items plus labor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Servis {
    pub id_servis: i64,
    pub nama_pelanggan: String,
    pub no_whatsapp: String,
    pub tipe_hp: String,
    pub keluhan: String,
    pub status_servis: String,
    /// Labor cost
    pub biaya_servis: f64,
    /// Line items + labor, recomputed on every write
    pub biaya_total: f64,
    pub tanggal_masuk: NaiveDateTime,
    pub tanggal_selesai: Option<NaiveDateTime>,
}

/// A line item on a ticket, optionally referencing an inventory item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DetailServis {
    pub id_detail: i64,
    pub id_servis: i64,
    pub id_barang: Option<i64>,
    pub deskripsi: String,
    pub jumlah: i64,
    pub harga_satuan: f64,
    /// jumlah * harga_satuan, computed server-side
    pub biaya: f64,
}

/// Ticket with embedded line items
#[derive(Debug, Clone, Serialize)]
pub struct ServisWithDetail {
    #[serde(flatten)]
    pub servis: Servis,
    pub detail: Vec<DetailServis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailItemInput {
    pub id_barang: Option<i64>,
    #[serde(default)]
    pub deskripsi: String,
    #[serde(default)]
    pub jumlah: i64,
    #[serde(default)]
    pub harga_satuan: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServisInput {
    #[serde(default)]
    pub nama_pelanggan: String,
    #[serde(default)]
    pub no_whatsapp: String,
    #[serde(default)]
    pub tipe_hp: String,
    #[serde(default)]
    pub keluhan: String,
    pub status_servis: Option<String>,
    #[serde(default)]
    pub biaya_servis: f64,
    /// Missing on create means "now"
    pub tanggal_masuk: Option<NaiveDateTime>,
    pub tanggal_selesai: Option<NaiveDateTime>,
    #[serde(default)]
    pub detail: Vec<DetailItemInput>,
}

/// Standalone line-item create (ticket id in the body)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDetailServis {
    #[serde(default)]
    pub id_servis: i64,
    pub id_barang: Option<i64>,
    #[serde(default)]
    pub deskripsi: String,
    #[serde(default)]
    pub jumlah: i64,
    #[serde(default)]
    pub harga_satuan: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    pub phone: Option<String>,
}

// ============================================================================
// Laporan
// ============================================================================

/// A generated report: totals frozen at generation time
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Laporan {
    pub id_laporan: i64,
    pub judul_laporan: String,
    /// harian, mingguan, bulanan, custom
    pub jenis_laporan: String,
    pub tanggal_awal: NaiveDate,
    pub tanggal_akhir: NaiveDate,
    pub total_servis: i64,
    pub total_pendapatan: f64,
    pub total_modal: f64,
    pub laba_bersih: f64,
    pub keterangan: String,
    pub created_at: NaiveDateTime,
}

/// Per-ticket snapshot row inside a report
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DetailLaporanServis {
    pub id_detail: i64,
    pub id_laporan: i64,
    pub id_servis: i64,
    pub nama_pelanggan: String,
    pub tipe_hp: String,
    pub biaya_total: f64,
    pub modal_servis: f64,
    pub laba_servis: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaporanWithDetail {
    #[serde(flatten)]
    pub laporan: Laporan,
    pub detail_servis: Vec<DetailLaporanServis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateLaporan {
    #[serde(default)]
    pub jenis_laporan: String,
    pub tanggal_awal: NaiveDate,
    pub tanggal_akhir: NaiveDate,
    pub keterangan: Option<String>,
}

/// Aggregates echoed back from report generation
#[derive(Debug, Clone, Serialize)]
pub struct LaporanSummary {
    pub total_servis: i64,
    pub total_pendapatan: f64,
    pub total_modal: f64,
    pub laba_bersih: f64,
}

// ============================================================================
// Dashboards
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PeriodStats {
    pub total_servis: i64,
    pub total_pendapatan: f64,
    pub laba_bersih: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChartData {
    pub tanggal: String,
    pub pendapatan: f64,
}

/// Period breakdown: today, last 7 days, this month, plus a revenue chart
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub hari_ini: PeriodStats,
    pub minggu_ini: PeriodStats,
    pub bulan_ini: PeriodStats,
    pub chart_pendapatan: Vec<ChartData>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServisRingkas {
    pub id_servis: i64,
    pub nama_pelanggan: String,
    pub tipe_hp: String,
    pub status_servis: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BarangMenipis {
    pub id_barang: i64,
    pub nama_barang: String,
    pub stok: i64,
}

/// Operational overview for the dashboard landing page
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub total_servis_hari_ini: i64,
    pub servis_dalam_perbaikan: i64,
    pub servis_selesai: i64,
    pub stok_menipis: i64,
    pub total_pendapatan_hari_ini: f64,
    pub total_pendapatan_bulan_ini: f64,
    pub servis_hari_ini: Vec<ServisRingkas>,
    pub barang_menipis: Vec<BarangMenipis>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimpleStats {
    pub total_servis: i64,
    pub total_pendapatan: f64,
    pub servis_selesai: i64,
    pub servis_proses: i64,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
