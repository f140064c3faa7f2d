// Station domain model - per-station telemetry snapshot
use super::lenient::{value_to_f64, value_to_u32};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StationStatus {
    Running,
    Idle,
    Maintenance,
    Error,
}

impl StationStatus {
    /// Case-insensitive; unknown labels read as idle. A warning keeps the
    /// station flagged regardless of progress, so it reads as maintenance.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => StationStatus::Running,
            "MAINTENANCE" | "WARNING" => StationStatus::Maintenance,
            "ERROR" | "FAULT" => StationStatus::Error,
            _ => StationStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSnapshot {
    pub station_id: String,
    pub status: StationStatus,
    /// Fraction in [0, 1]
    pub efficiency: f64,
    pub temperature: f64,
    pub alert_count: u32,
    pub metrics: BTreeMap<String, f64>,
    pub last_update: DateTime<Utc>,
    /// Percent of the current unit's work done at this station, [0, 100]
    pub progress: f64,
    pub operation: String,
    pub cycle_time: f64,
    pub production_count: u32,
}

const ID_KEYS: &[&str] = &["stationId", "station_id", "id"];
const PROGRESS_KEYS: &[&str] = &["progress", "progressRate"];
const OPERATION_KEYS: &[&str] = &["currentOperation", "operation"];
const CYCLE_TIME_KEYS: &[&str] = &["cycleTime", "cycle_time"];
const PRODUCTION_KEYS: &[&str] = &["productionCount", "production_count"];
const ALERT_KEYS: &[&str] = &["alertCount", "alert_count"];
const UPDATE_KEYS: &[&str] = &["lastUpdate", "timestamp", "lastUpdated"];

const DEFAULT_OPERATION: &str = "대기";

/// Keys consumed by named fields; every other numeric field lands in `metrics`.
const CONSUMED_KEYS: &[&str] = &[
    "stationId", "station_id", "id", "status", "efficiency", "temperature", "progress",
    "progressRate", "currentOperation", "operation", "cycleTime", "cycle_time",
    "productionCount", "production_count", "alertCount", "alert_count", "lastUpdate",
    "timestamp", "lastUpdated", "metrics",
];

impl StationSnapshot {
    /// Ingest a station list payload.
    ///
    /// Accepts either a bare array or an object carrying a `stations` array
    /// (the KPI endpoint wraps its list with a summary). Non-object entries
    /// are skipped.
    pub fn list_from_json(value: Value, received_at: DateTime<Utc>) -> Result<Vec<Self>, serde_json::Error> {
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove("stations") {
                Some(Value::Array(entries)) => entries,
                _ => return Err(serde::de::Error::custom("station payload has no stations array")),
            },
            _ => return Err(serde::de::Error::custom("station payload is not a list")),
        };

        let mut stations = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match entry {
                Value::Object(map) => stations.push(Self::from_map(&map, index, received_at)),
                other => tracing::warn!("Skipping malformed station entry {}: {}", index, other),
            }
        }
        Ok(stations)
    }

    fn from_map(map: &Map<String, Value>, index: usize, received_at: DateTime<Utc>) -> Self {
        let station_id = first(map, ID_KEYS)
            .and_then(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| format!("STATION_{}", index));

        let status = map
            .get("status")
            .and_then(Value::as_str)
            .map(StationStatus::from_label)
            .unwrap_or(StationStatus::Idle);

        let raw_efficiency = map.get("efficiency").map(value_to_f64).unwrap_or(0.0);
        let efficiency = if raw_efficiency > 1.0 { raw_efficiency / 100.0 } else { raw_efficiency };

        let operation = first(map, OPERATION_KEYS)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_OPERATION)
            .to_string();

        let last_update = first(map, UPDATE_KEYS)
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .unwrap_or(received_at);

        let mut metrics: BTreeMap<String, f64> = map
            .get("metrics")
            .and_then(Value::as_object)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), value_to_f64(v))).collect())
            .unwrap_or_default();
        for (key, value) in map {
            if CONSUMED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(n) = value.as_f64() {
                metrics.entry(key.clone()).or_insert(n);
            }
        }

        Self {
            station_id,
            status,
            efficiency: efficiency.clamp(0.0, 1.0),
            temperature: map.get("temperature").map(value_to_f64).unwrap_or(0.0),
            alert_count: first(map, ALERT_KEYS).map(value_to_u32).unwrap_or(0),
            metrics,
            last_update,
            progress: first(map, PROGRESS_KEYS).map(value_to_f64).unwrap_or(0.0).clamp(0.0, 100.0),
            operation,
            cycle_time: first(map, CYCLE_TIME_KEYS).map(value_to_f64).unwrap_or(0.0),
            production_count: first(map, PRODUCTION_KEYS).map(value_to_u32).unwrap_or(0),
        }
    }
}

fn first<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| map.get(*k)).find(|v| !v.is_null())
}

/// RFC 3339, or a zone-less local timestamp as the backend's LocalDateTime
/// emits, read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
