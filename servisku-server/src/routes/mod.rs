//! Route handlers for the servisku API
//!
//! Organized by resource type:
//! - servis: repair tickets and their line items
//! - barang: inventory items
//! - pegawai: staff records (admin scope)
//! - laporan: financial report snapshots
//! - dashboard: aggregate stats endpoints
//! - health: health check endpoint

pub mod barang;
pub mod dashboard;
pub mod health;
pub mod laporan;
pub mod pegawai;
pub mod servis;

pub use barang::*;
pub use dashboard::*;
pub use health::*;
pub use laporan::*;
pub use pegawai::*;
pub use servis::*;
