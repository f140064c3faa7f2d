// Dashboard domain model - factory-wide KPI snapshot
use super::lenient::{lenient_f64, lenient_u32};
use serde::{Deserialize, Serialize};

/// Factory-wide KPI record, replaced wholesale on every poll tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub production: Production,
    #[serde(default)]
    pub kpi: Kpi,
    #[serde(default)]
    pub quality: Quality,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub current: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub target: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hourly_rate: f64,
    /// Seconds per unit
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cycle_time: f64,
}

/// Percentages in [0, 100]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub oee: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub otd: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fty: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quality {
    /// Fraction in [0, 1]
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overall_score: f64,
}

impl DashboardSnapshot {
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if !value.is_object() {
            return Err(serde::de::Error::custom("dashboard payload is not an object"));
        }
        serde_json::from_value(value)
    }

    /// Achievement against target in percent, zero when no target is set.
    pub fn achievement_rate(&self) -> f64 {
        if self.production.target == 0 {
            return 0.0;
        }
        self.production.current as f64 / self.production.target as f64 * 100.0
    }
}
