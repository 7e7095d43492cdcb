use std::{fmt, str::FromStr};

use crate::colocate_errors::ColocateError;

/// How contact evidence between two entities becomes an edge weight.
///
/// * [`WeightingPolicy::CountWeight`] – `"count_weight"`: the edge weight counts contacts.
/// * [`WeightingPolicy::DistanceWeight`] – `"distance_weight"` (also accepted as
///   `"dist_weight"`): the edge weight is `dt − distance`, keeping the smallest seen.
///
/// Parsing any other string fails with [`ColocateError::InvalidConfiguration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeightingPolicy {
    #[default]
    CountWeight,
    DistanceWeight,
}

impl WeightingPolicy {
    pub const ALL: [WeightingPolicy; 2] =
        [WeightingPolicy::CountWeight, WeightingPolicy::DistanceWeight];

    /// Canonical name, as used in output file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightingPolicy::CountWeight => "count_weight",
            WeightingPolicy::DistanceWeight => "distance_weight",
        }
    }
}

impl FromStr for WeightingPolicy {
    type Err = ColocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "count_weight" => Ok(WeightingPolicy::CountWeight),
            "distance_weight" | "dist_weight" => Ok(WeightingPolicy::DistanceWeight),
            other => Err(ColocateError::InvalidConfiguration(format!(
                "unknown weighting policy {other:?}, expected \"count_weight\" or \"distance_weight\""
            ))),
        }
    }
}

impl fmt::Display for WeightingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
