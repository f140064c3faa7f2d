// View models - display-ready cards, tables and badges
use crate::application::interaction::Popover;
use crate::application::polling_service::Connectivity;
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::marker::vehicle_model;
use crate::domain::station::{StationSnapshot, StationStatus};
use crate::domain::stock::StockItem;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

/// OEE target shown on the KPI card.
pub const OEE_TARGET: f64 = 85.0;

/// A station counts as online if it reported within this many seconds.
pub const ONLINE_WINDOW_SECS: i64 = 30;

const KPI_COLOR: &str = "#206bc4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Blue,
    Yellow,
    Orange,
    Red,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub color: BadgeColor,
}

impl Badge {
    const fn new(label: &'static str, color: BadgeColor) -> Self {
        Self { label, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub label: &'static str,
    pub color: &'static str,
}

pub fn grade(value: f64) -> Grade {
    match value {
        v if v >= 85.0 => Grade { label: "우수", color: "#28a745" },
        v if v >= 70.0 => Grade { label: "양호", color: "#ffc107" },
        v if v >= 60.0 => Grade { label: "보통", color: "#fd7e14" },
        _ => Grade { label: "개선필요", color: "#dc3545" },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Donut {
    pub value: f64,
    pub remaining: f64,
    pub grade: Grade,
    pub color: &'static str,
}

impl Donut {
    fn new(value: f64, color: Option<&'static str>) -> Self {
        let value = value.clamp(0.0, 100.0);
        let grade = grade(value);
        Self { value, remaining: 100.0 - value, grade, color: color.unwrap_or(grade.color) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiCards {
    /// False while only placeholders are shown
    pub has_data: bool,
    pub current_production: u32,
    pub target_production: u32,
    pub achievement_rate: f64,
    pub hourly_rate: f64,
    pub cycle_time: f64,
    pub oee: Donut,
    pub oee_target: f64,
    pub otd: Donut,
    pub fty: Donut,
    /// Percent
    pub quality_score: f64,
}

impl KpiCards {
    pub fn from_snapshot(snapshot: Option<&DashboardSnapshot>) -> Self {
        let fallback = DashboardSnapshot::default();
        let s = snapshot.unwrap_or(&fallback);
        Self {
            has_data: snapshot.is_some(),
            current_production: s.production.current,
            target_production: s.production.target,
            achievement_rate: round1(s.achievement_rate()),
            hourly_rate: s.production.hourly_rate,
            cycle_time: s.production.cycle_time,
            oee: Donut::new(s.kpi.oee, None),
            oee_target: OEE_TARGET,
            otd: Donut::new(s.kpi.otd, Some(KPI_COLOR)),
            fty: Donut::new(s.kpi.fty, Some(KPI_COLOR)),
            quality_score: round1(s.quality.overall_score * 100.0),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn status_badge(status: StationStatus) -> Badge {
    match status {
        StationStatus::Running => Badge::new("가동중", BadgeColor::Blue),
        StationStatus::Idle => Badge::new("대기중", BadgeColor::Yellow),
        StationStatus::Maintenance => Badge::new("점검중", BadgeColor::Orange),
        StationStatus::Error => Badge::new("정지", BadgeColor::Red),
    }
}

pub fn alarm_badge(alert_count: u32) -> Badge {
    match alert_count {
        0 => Badge::new("정상", BadgeColor::Green),
        1..=2 => Badge::new("경고", BadgeColor::Orange),
        _ => Badge::new("심각", BadgeColor::Red),
    }
}

pub fn connection_badge(last_update: DateTime<Utc>, now: DateTime<Utc>) -> Badge {
    if (now - last_update).num_seconds() <= ONLINE_WINDOW_SECS {
        Badge::new("온라인", BadgeColor::Green)
    } else {
        Badge::new("오프라인", BadgeColor::Red)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRow {
    pub station_id: String,
    pub status: Badge,
    pub alarm: Badge,
    pub connection: Badge,
    /// Percent, one decimal
    pub efficiency: f64,
    pub temperature: f64,
    pub last_update: String,
}

pub fn station_rows(stations: &[StationSnapshot], now: DateTime<Utc>) -> Vec<StationRow> {
    stations
        .iter()
        .map(|s| StationRow {
            station_id: s.station_id.clone(),
            status: status_badge(s.status),
            alarm: alarm_badge(s.alert_count),
            connection: connection_badge(s.last_update, now),
            efficiency: round1(s.efficiency * 100.0),
            temperature: s.temperature,
            last_update: relative_time(s.last_update, now),
        })
        .collect()
}

pub fn stock_badge(current: u32, safety: u32) -> Badge {
    let current = current as f64;
    let safety = safety as f64;
    if current == 0.0 {
        Badge::new("품절", BadgeColor::Red)
    } else if current <= safety {
        Badge::new("부족", BadgeColor::Orange)
    } else if current <= safety * 1.5 {
        Badge::new("주의", BadgeColor::Yellow)
    } else {
        Badge::new("정상", BadgeColor::Green)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub code: String,
    pub name: String,
    pub current: u32,
    pub safety: u32,
    pub location: String,
    pub partner: String,
    pub inbound_date: String,
    pub status: Badge,
}

pub fn inventory_rows(items: &[StockItem]) -> Vec<InventoryRow> {
    items
        .iter()
        .map(|item| InventoryRow {
            code: item.stock_code.clone(),
            name: item.stock_name.clone(),
            current: item.current_stock,
            safety: item.safety_stock,
            location: item.stock_location.clone(),
            partner: item.partner_company.clone(),
            inbound_date: item.inbound_date.clone().unwrap_or_else(|| "-".to_string()),
            status: stock_badge(item.current_stock, item.safety_stock),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityBanner {
    pub state: Connectivity,
    pub label: &'static str,
    pub color: &'static str,
}

impl From<Connectivity> for ConnectivityBanner {
    fn from(state: Connectivity) -> Self {
        let (label, color) = match state {
            Connectivity::Connecting => ("연결 중", "#9E9E9E"),
            Connectivity::Connected => ("연결됨", "#4CAF50"),
            Connectivity::Error => ("연결 끊김", "#f44336"),
        };
        Self { state, label, color }
    }
}

/// "n초 전" under a minute, "n분 전" under an hour, else the local time of
/// day. Timestamps ahead of `now` read as "0초 전".
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds().max(0);
    match seconds {
        s if s < 60 => format!("{}초 전", s),
        s if s < 3600 => format!("{}분 전", s / 60),
        _ => timestamp.with_timezone(&Local).format("%H:%M:%S").to_string(),
    }
}

/// Detail panel of the product marker the user clicked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPanel {
    pub station_id: String,
    pub vehicle_model: &'static str,
    pub progress: String,
    pub status: StationStatus,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_count: Option<String>,
    pub updated: String,
}

impl ProductPanel {
    pub fn new(station: &StationSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            station_id: station.station_id.clone(),
            vehicle_model: vehicle_model(&station.station_id),
            progress: format!("{:.1}%", station.progress),
            status: station.status,
            operation: station.operation.clone(),
            cycle_time: (station.cycle_time > 0.0).then(|| format!("{:.1}s", station.cycle_time)),
            production_count: (station.production_count > 0).then(|| format!("{}대", station.production_count)),
            updated: relative_time(station.last_update, now),
        }
    }
}

/// One robot line of an open process popover.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotRow {
    pub id: u32,
    pub name: String,
    pub vendor: &'static str,
    pub status: &'static str,
    pub status_color: &'static str,
}

pub fn robot_rows(popover: &Popover) -> Vec<RobotRow> {
    let Popover::Open { robots, .. } = popover else {
        return Vec::new();
    };
    robots
        .iter()
        .map(|robot| RobotRow {
            id: robot.id,
            name: robot.name.clone(),
            vendor: robot.vendor,
            status: robot.status.label(),
            status_color: robot.status.color(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::{Kpi, Production, Quality};
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 18, 10, 0, 0).unwrap()
    }

    fn station(id: &str, status: StationStatus, alerts: u32, age_secs: i64) -> StationSnapshot {
        StationSnapshot {
            station_id: id.to_string(),
            status,
            efficiency: 0.877,
            temperature: 71.5,
            alert_count: alerts,
            metrics: BTreeMap::new(),
            last_update: now() - Duration::seconds(age_secs),
            progress: 42.3,
            operation: "시트_작업중".to_string(),
            cycle_time: 0.0,
            production_count: 12,
        }
    }

    #[test]
    fn test_four_stations_four_rows() {
        let stations = vec![
            station("ST001", StationStatus::Running, 0, 5),
            station("ST002", StationStatus::Idle, 2, 30),
            station("ST003", StationStatus::Maintenance, 3, 31),
            station("ST004", StationStatus::Error, 7, 600),
        ];
        let rows = station_rows(&stations, now());

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].status, Badge::new("가동중", BadgeColor::Blue));
        assert_eq!(rows[1].status, Badge::new("대기중", BadgeColor::Yellow));
        assert_eq!(rows[2].status, Badge::new("점검중", BadgeColor::Orange));
        assert_eq!(rows[3].status, Badge::new("정지", BadgeColor::Red));

        let alarms: Vec<&str> = rows.iter().map(|r| r.alarm.label).collect();
        assert_eq!(alarms, vec!["정상", "경고", "심각", "심각"]);
        let connections: Vec<BadgeColor> = rows.iter().map(|r| r.connection.color).collect();
        assert_eq!(connections, vec![BadgeColor::Green, BadgeColor::Green, BadgeColor::Red, BadgeColor::Red]);

        assert_eq!(rows[0].efficiency, 87.7);
        assert_eq!(rows[3].last_update, "10분 전");
    }

    #[test]
    fn test_grades() {
        assert_eq!(grade(85.0).label, "우수");
        assert_eq!(grade(84.9).label, "양호");
        assert_eq!(grade(60.0).label, "보통");
        assert_eq!(grade(59.9).label, "개선필요");
    }

    #[test]
    fn test_kpi_cards_placeholder_and_live() {
        let empty = KpiCards::from_snapshot(None);
        assert!(!empty.has_data);
        assert_eq!(empty.achievement_rate, 0.0);
        assert_eq!(empty.oee.grade.label, "개선필요");
        assert_eq!(empty.oee.remaining, 100.0);

        let snapshot = DashboardSnapshot {
            production: Production { current: 848, target: 1000, hourly_rate: 42.5, cycle_time: 85.7 },
            kpi: Kpi { oee: 84.2, otd: 92.5, fty: 95.3 },
            quality: Quality { overall_score: 0.9512 },
        };
        let cards = KpiCards::from_snapshot(Some(&snapshot));
        assert!(cards.has_data);
        assert_eq!(cards.achievement_rate, 84.8);
        assert_eq!(cards.oee.grade, Grade { label: "양호", color: "#ffc107" });
        assert_eq!(cards.oee.color, "#ffc107");
        assert_eq!(cards.otd.color, "#206bc4");
        assert_eq!(cards.quality_score, 95.1);
    }

    #[test]
    fn test_stock_badges() {
        assert_eq!(stock_badge(0, 10).label, "품절");
        assert_eq!(stock_badge(10, 10).label, "부족");
        assert_eq!(stock_badge(15, 10).label, "주의");
        assert_eq!(stock_badge(16, 10).label, "정상");
        assert_eq!(stock_badge(3, 0).label, "정상");
    }

    #[test]
    fn test_relative_time() {
        assert_eq!(relative_time(now() - Duration::seconds(59), now()), "59초 전");
        assert_eq!(relative_time(now() - Duration::seconds(60), now()), "1분 전");
        assert_eq!(relative_time(now() + Duration::seconds(5), now()), "0초 전");
        let old = now() - Duration::hours(2);
        assert_eq!(relative_time(old, now()), old.with_timezone(&Local).format("%H:%M:%S").to_string());
    }

    #[test]
    fn test_product_panel_hides_empty_fields() {
        let panel = ProductPanel::new(&station("C03_SEAT", StationStatus::Running, 0, 3), now());
        assert_eq!(panel.vehicle_model, "SEDAN_A");
        assert_eq!(panel.progress, "42.3%");
        assert_eq!(panel.cycle_time, None);
        assert_eq!(panel.production_count.as_deref(), Some("12대"));
        assert_eq!(panel.updated, "3초 전");
    }

    #[test]
    fn test_connectivity_banner() {
        assert_eq!(ConnectivityBanner::from(Connectivity::Error).label, "연결 끊김");
        assert_eq!(ConnectivityBanner::from(Connectivity::Connected).color, "#4CAF50");
    }

    #[test]
    fn test_robot_rows_follow_popover() {
        use crate::domain::robot::robots_for;
        use crate::domain::transform::Point;

        assert!(robot_rows(&Popover::Closed).is_empty());

        let popover = Popover::Open {
            process: "도어탈거".to_string(),
            position: Point::new(10.0, 20.0),
            robots: robots_for("도어탈거"),
        };
        let rows = robot_rows(&popover);
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].status, rows[0].status_color), ("운영중", "#4CAF50"));
        assert_eq!((rows[1].status, rows[1].status_color), ("정지", "#f44336"));
        assert_eq!(rows[2].status, "점검중");
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
