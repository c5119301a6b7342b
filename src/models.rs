use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric summary of one uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Observation {
    pub total_revenue: f64,
    pub total_quantity: f64,
    pub row_count: u64,
}

impl Observation {
    pub fn features(&self) -> [f64; 3] {
        [self.total_revenue, self.total_quantity, self.row_count as f64]
    }

    pub fn labeled(self, is_risky: bool) -> LabeledObservation {
        LabeledObservation {
            total_revenue: self.total_revenue,
            total_quantity: self.total_quantity,
            row_count: self.row_count,
            is_risky,
        }
    }
}

/// One row of the history file. Field order is the column order on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledObservation {
    pub total_revenue: f64,
    pub total_quantity: f64,
    pub row_count: u64,
    #[serde(with = "flag")]
    pub is_risky: bool,
}

impl LabeledObservation {
    pub fn observation(&self) -> Observation {
        Observation {
            total_revenue: self.total_revenue,
            total_quantity: self.total_quantity,
            row_count: self.row_count,
        }
    }
}

pub type HistoryTable = Vec<LabeledObservation>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskAssessment {
    Scored { probability: f64 },
    InsufficientHistory,
}

impl RiskAssessment {
    pub fn probability(&self) -> f64 {
        match self {
            RiskAssessment::Scored { probability } => *probability,
            RiskAssessment::InsufficientHistory => 0.0,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, RiskAssessment::Scored { .. })
    }
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskAssessment::Scored { probability } => write!(f, "{:.1} %", probability * 100.0),
            RiskAssessment::InsufficientHistory => write!(f, "not enough history"),
        }
    }
}

// The history file stores the label as 0/1.
mod flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::custom(format!("is_risky must be 0 or 1, got {other}"))),
        }
    }
}
