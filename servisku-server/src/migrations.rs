//! Database migrations for the repair-shop schema

use sqlx::SqlitePool;

use crate::Result;

/// Run all migrations. Idempotent; executed on every startup.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user (
            id_user INTEGER PRIMARY KEY AUTOINCREMENT,
            nama TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'pegawai',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pegawai (
            id_pegawai INTEGER PRIMARY KEY AUTOINCREMENT,
            id_user INTEGER NOT NULL UNIQUE REFERENCES user(id_user),
            nama_pegawai TEXT NOT NULL,
            jabatan TEXT NOT NULL,
            alamat TEXT,
            no_hp TEXT,
            tanggal_masuk TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'aktif'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS barang (
            id_barang INTEGER PRIMARY KEY AUTOINCREMENT,
            nama_barang TEXT NOT NULL,
            stok INTEGER NOT NULL DEFAULT 0,
            harga REAL NOT NULL DEFAULT 0,
            harga_modal REAL NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS servis (
            id_servis INTEGER PRIMARY KEY AUTOINCREMENT,
            nama_pelanggan TEXT NOT NULL,
            no_whatsapp TEXT NOT NULL,
            tipe_hp TEXT NOT NULL,
            keluhan TEXT NOT NULL,
            status_servis TEXT NOT NULL DEFAULT 'pending',
            biaya_servis REAL NOT NULL DEFAULT 0,
            biaya_total REAL NOT NULL DEFAULT 0,
            tanggal_masuk TEXT NOT NULL,
            tanggal_selesai TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS detail_servis (
            id_detail INTEGER PRIMARY KEY AUTOINCREMENT,
            id_servis INTEGER NOT NULL REFERENCES servis(id_servis) ON DELETE CASCADE,
            id_barang INTEGER REFERENCES barang(id_barang) ON DELETE SET NULL,
            deskripsi TEXT NOT NULL,
            jumlah INTEGER NOT NULL DEFAULT 1,
            harga_satuan REAL NOT NULL DEFAULT 0,
            biaya REAL NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS laporan (
            id_laporan INTEGER PRIMARY KEY AUTOINCREMENT,
            judul_laporan TEXT NOT NULL,
            jenis_laporan TEXT NOT NULL,
            tanggal_awal TEXT NOT NULL,
            tanggal_akhir TEXT NOT NULL,
            total_servis INTEGER NOT NULL DEFAULT 0,
            total_pendapatan REAL NOT NULL DEFAULT 0,
            total_modal REAL NOT NULL DEFAULT 0,
            laba_bersih REAL NOT NULL DEFAULT 0,
            keterangan TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS detail_laporan_servis (
            id_detail INTEGER PRIMARY KEY AUTOINCREMENT,
            id_laporan INTEGER NOT NULL REFERENCES laporan(id_laporan) ON DELETE CASCADE,
            id_servis INTEGER NOT NULL,
            nama_pelanggan TEXT NOT NULL,
            tipe_hp TEXT NOT NULL,
            biaya_total REAL NOT NULL DEFAULT 0,
            modal_servis REAL NOT NULL DEFAULT 0,
            laba_servis REAL NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_username ON user(username)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pegawai_user ON pegawai(id_user)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_servis_tanggal ON servis(tanggal_masuk)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_servis_status ON servis(status_servis)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_detail_servis_servis ON detail_servis(id_servis)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_detail_laporan_laporan ON detail_laporan_servis(id_laporan)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
