use serde::{Deserialize, Serialize};

/// Fixed conversion ratio between kilograms and liters of wine.
///
/// This is the single domain-specific unit policy: trade statistics report
/// wine interchangeably in kilograms and liters at a 1:1 ratio.
pub const LITERS_PER_KG: f64 = 1.0;

/// Unit of the `volume` column in an export input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeUnit {
    #[default]
    Liters,
    Kilograms,
}

/// Converts a volume in kilograms to liters.
pub fn kg_to_liters(kilograms: f64) -> f64 {
    kilograms * LITERS_PER_KG
}

impl VolumeUnit {
    /// Normalizes a raw volume figure in this unit to liters.
    pub fn to_liters(self, volume: f64) -> f64 {
        match self {
            VolumeUnit::Liters => volume,
            VolumeUnit::Kilograms => kg_to_liters(volume),
        }
    }
}
