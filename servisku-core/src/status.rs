//! Repair-ticket status and report-kind enums.
//!
//! Clients send loosely formatted status strings ("dalam perbaikan",
//! "belum dikerjakan", trailing whitespace); `StatusServis::normalize`
//! maps them onto the stored enum, defaulting to pending.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a repair ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusServis {
    Pending,
    DalamPerbaikan,
    Selesai,
    SiapDiambil,
}

impl StatusServis {
    /// Map a loose client string onto the enum. Unknown input is pending.
    pub fn normalize(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "dalam_perbaikan" | "dalam perbaikan" => Self::DalamPerbaikan,
            "selesai" => Self::Selesai,
            "siap_diambil" | "siap diambil" => Self::SiapDiambil,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::DalamPerbaikan => "dalam_perbaikan",
            Self::Selesai => "selesai",
            Self::SiapDiambil => "siap_diambil",
        }
    }
}

/// Kind of financial report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JenisLaporan {
    Harian,
    Mingguan,
    Bulanan,
    Custom,
}

impl JenisLaporan {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "harian" => Some(Self::Harian),
            "mingguan" => Some(Self::Mingguan),
            "bulanan" => Some(Self::Bulanan),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Harian => "harian",
            Self::Mingguan => "mingguan",
            Self::Bulanan => "bulanan",
            Self::Custom => "custom",
        }
    }

    /// Capitalized form used in generated report titles
    pub fn title(&self) -> &'static str {
        match self {
            Self::Harian => "Harian",
            Self::Mingguan => "Mingguan",
            Self::Bulanan => "Bulanan",
            Self::Custom => "Custom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_exact() {
        assert_eq!(StatusServis::normalize("pending"), StatusServis::Pending);
        assert_eq!(
            StatusServis::normalize("dalam_perbaikan"),
            StatusServis::DalamPerbaikan
        );
        assert_eq!(StatusServis::normalize("selesai"), StatusServis::Selesai);
        assert_eq!(
            StatusServis::normalize("siap_diambil"),
            StatusServis::SiapDiambil
        );
    }

    #[test]
    fn test_normalize_loose_input() {
        assert_eq!(
            StatusServis::normalize("Dalam Perbaikan"),
            StatusServis::DalamPerbaikan
        );
        assert_eq!(
            StatusServis::normalize("siap diambil"),
            StatusServis::SiapDiambil
        );
        assert_eq!(StatusServis::normalize("pending "), StatusServis::Pending);
        assert_eq!(
            StatusServis::normalize("belum dikerjakan"),
            StatusServis::Pending
        );
        assert_eq!(StatusServis::normalize(""), StatusServis::Pending);
    }

    #[test]
    fn test_jenis_laporan_parse() {
        assert_eq!(JenisLaporan::parse("harian"), Some(JenisLaporan::Harian));
        assert_eq!(JenisLaporan::parse("Bulanan"), Some(JenisLaporan::Bulanan));
        assert_eq!(JenisLaporan::parse("tahunan"), None);
    }
}
