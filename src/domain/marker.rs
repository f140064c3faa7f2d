// Marker domain model - product positions derived from station snapshots
use super::layout::{Direction, LayoutGeometry};
use super::station::{StationSnapshot, StationStatus};
use super::transform::Point;
use serde::Serialize;

pub const MARKER_RADIUS: f64 = 14.0;

pub const VEHICLE_MODELS: [&str; 3] = ["SEDAN_A", "SUV_B", "TRUCK_C"];

/// Station id to (line name, process index) on the factory layout.
const STATION_SLOTS: &[(&str, &str, usize)] = &[
    ("A01_DOOR", "A", 0),
    ("A02_WIRE", "A", 1),
    ("A03_HEAD", "A", 2),
    ("A04_CRASH", "A", 3),
    ("B01_FUEL", "B", 0),
    ("B02_CHASSIS", "B", 1),
    ("B03_MUFFLER", "B", 2),
    ("C01_FEM", "C", 0),
    ("C02_GLASS", "C", 1),
    ("C03_SEAT", "C", 2),
    ("C04_BUMPER", "C", 3),
    ("C05_TIRE", "C", 4),
    ("D01_WHEEL", "D", 2),
    ("D02_LAMP", "D", 1),
    ("D03_WATER", "D", 0),
];

pub fn station_slot(station_id: &str) -> Option<(&'static str, usize)> {
    STATION_SLOTS
        .iter()
        .find(|(id, _, _)| *id == station_id)
        .map(|(_, line, index)| (*line, *index))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    pub station_id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: &'static str,
    /// Vehicle model initial drawn inside the circle
    pub label: String,
    pub progress: f64,
}

impl Marker {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Vehicle model assigned to a station, cycling through the model list by
/// the first number in the station id.
pub fn vehicle_model(station_id: &str) -> &'static str {
    let digits: String = station_id
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let index = digits.parse::<usize>().unwrap_or(0);
    VEHICLE_MODELS[index % VEHICLE_MODELS.len()]
}

pub fn marker_color(status: StationStatus, progress: f64) -> &'static str {
    match status {
        StationStatus::Error => "#f44336",
        StationStatus::Idle => "#9E9E9E",
        StationStatus::Maintenance => "#FF9800",
        StationStatus::Running if progress < 30.0 => "#FF9800",
        StationStatus::Running if progress < 70.0 => "#2196F3",
        StationStatus::Running => "#4CAF50",
    }
}

/// Place one marker per mapped station. Stations without a slot on the
/// layout are skipped.
pub fn markers_for(stations: &[StationSnapshot], layout: &LayoutGeometry) -> Vec<Marker> {
    stations
        .iter()
        .filter_map(|station| {
            let Some((line_name, index)) = station_slot(&station.station_id) else {
                tracing::debug!("No layout slot for station {}", station.station_id);
                return None;
            };
            let line = layout.line(line_name)?;
            let process = line.processes.get(index)?;

            let ratio = station.progress.clamp(0.0, 100.0) / 100.0;
            let x = match line.direction {
                Direction::Forward => process.left() + process.width * ratio,
                Direction::Reverse => process.right() - process.width * ratio,
            };
            let label = vehicle_model(&station.station_id)
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase().to_string())
                .unwrap_or_default();

            Some(Marker {
                id: format!("product_{}", station.station_id),
                station_id: station.station_id.clone(),
                x,
                y: line.y,
                radius: MARKER_RADIUS,
                color: marker_color(station.status, station.progress),
                label,
                progress: station.progress,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn station(id: &str, status: StationStatus, progress: f64) -> StationSnapshot {
        StationSnapshot {
            station_id: id.to_string(),
            status,
            efficiency: 0.9,
            temperature: 0.0,
            alert_count: 0,
            metrics: BTreeMap::new(),
            last_update: Utc::now(),
            progress,
            operation: "대기".to_string(),
            cycle_time: 0.0,
            production_count: 0,
        }
    }

    #[test]
    fn test_vehicle_model() {
        assert_eq!(vehicle_model("A01_DOOR"), "SUV_B");
        assert_eq!(vehicle_model("C03_SEAT"), "SEDAN_A");
        assert_eq!(vehicle_model("D02_LAMP"), "TRUCK_C");
        assert_eq!(vehicle_model("UNKNOWN"), "SEDAN_A");
    }

    #[test]
    fn test_marker_color_table() {
        assert_eq!(marker_color(StationStatus::Error, 90.0), "#f44336");
        assert_eq!(marker_color(StationStatus::Idle, 90.0), "#9E9E9E");
        assert_eq!(marker_color(StationStatus::Running, 10.0), "#FF9800");
        assert_eq!(marker_color(StationStatus::Running, 50.0), "#2196F3");
        assert_eq!(marker_color(StationStatus::Running, 70.0), "#4CAF50");
    }

    #[test]
    fn test_position_follows_line_direction() {
        let layout = LayoutGeometry::factory();
        let markers = markers_for(
            &[
                station("A01_DOOR", StationStatus::Running, 25.0),
                station("B01_FUEL", StationStatus::Running, 25.0),
                station("Z99_NOWHERE", StationStatus::Running, 25.0),
            ],
            &layout,
        );

        assert_eq!(markers.len(), 2);
        // 도어탈거 spans 90..210 left to right
        assert_eq!(markers[0].x, 120.0);
        assert_eq!(markers[0].y, 150.0);
        assert_eq!(markers[0].label, "S");
        // 연료탱크 spans 800..900 right to left
        assert_eq!(markers[1].x, 875.0);
        assert_eq!(markers[1].y, 350.0);
        assert_eq!(markers[1].id, "product_B01_FUEL");
    }

    #[test]
    fn test_warning_station_stays_orange_at_any_progress() {
        let payload = serde_json::json!([
            {"stationId": "A01_DOOR", "status": "WARNING", "progress": 80},
            {"stationId": "A02_WIRE", "status": "RUNNING", "progress": 80},
        ]);
        let stations = StationSnapshot::list_from_json(payload, Utc::now()).unwrap();
        let markers = markers_for(&stations, &LayoutGeometry::factory());

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].color, "#FF9800");
        assert_eq!(markers[1].color, "#4CAF50");
    }
}
