// Placeholder payloads sent to subscribers while the backend is unreachable
use crate::application::polling_service::{Feed, FeedData};
use crate::domain::dashboard::{DashboardSnapshot, Kpi, Production, Quality};
use crate::domain::station::StationSnapshot;
use crate::domain::stock::StockItem;
use chrono::Utc;
use serde_json::{json, Value};

pub fn payload(feed: Feed) -> FeedData {
    match feed {
        Feed::Dashboard => FeedData::Dashboard(dashboard()),
        Feed::Stations => FeedData::Stations(stations()),
        Feed::Twin => FeedData::Twin(twin()),
        Feed::Stocks => FeedData::Stocks(stocks()),
    }
}

fn dashboard() -> DashboardSnapshot {
    DashboardSnapshot {
        production: Production { current: 750, target: 1000, hourly_rate: 45.0, cycle_time: 55.0 },
        kpi: Kpi { oee: 87.0, otd: 92.0, fty: 90.0 },
        quality: Quality { overall_score: 0.895 },
    }
}

fn stations() -> Vec<StationSnapshot> {
    let entries: Vec<Value> = ["A", "B", "C", "D"]
        .iter()
        .enumerate()
        .map(|(index, line)| json!({
            "id": index + 1,
            "name": format!("Station {}", line),
            "stationId": format!("ST00{}", index + 1),
            "status": "running",
            "efficiency": 87,
            "temperature": 72,
            "vibration": 0.35,
            "oee": 85,
            "cycleTime": 60,
        }))
        .collect();
    ingest(Value::Array(entries))
}

fn twin() -> Vec<StationSnapshot> {
    let payload = json!([
        { "stationId": "A01_DOOR", "progress": 20.0, "currentOperation": "도어탈거_작업중", "status": "RUNNING",
          "efficiency": 92.5, "cycleTime": 195.0, "productionCount": 25 },
        { "stationId": "A02_WIRE", "progress": 45.0, "currentOperation": "와이어링_진행중", "status": "RUNNING",
          "efficiency": 90.0, "cycleTime": 220.0, "productionCount": 22 },
        { "stationId": "A03_HEAD", "progress": 70.0, "currentOperation": "헤드라이너_작업중", "status": "RUNNING",
          "efficiency": 87.5, "cycleTime": 170.0, "productionCount": 20 },
        { "stationId": "B01_FUEL", "progress": 35.0, "currentOperation": "연료탱크_조립중", "status": "RUNNING",
          "efficiency": 95.0, "cycleTime": 162.5, "productionCount": 27 },
        { "stationId": "C01_FEM", "progress": 85.0, "currentOperation": "FEM_장착중", "status": "RUNNING",
          "efficiency": 88.0, "cycleTime": 185.0, "productionCount": 24 },
    ]);
    ingest(payload)
}

fn ingest(payload: Value) -> Vec<StationSnapshot> {
    StationSnapshot::list_from_json(payload, Utc::now()).unwrap_or_default()
}

fn stocks() -> Vec<StockItem> {
    let item = |code: &str, name: &str, current: u32, safety: u32, location: &str, partner: &str| StockItem {
        stock_code: code.to_string(),
        stock_name: name.to_string(),
        current_stock: current,
        safety_stock: safety,
        stock_location: location.to_string(),
        partner_company: partner.to_string(),
        inbound_date: None,
    };
    vec![
        item("A1001", "도어 패널", 120, 50, "A-01", "현대모비스"),
        item("B2002", "연료 탱크", 40, 30, "B-03", "한온시스템"),
        item("C3003", "시트 어셈블리", 25, 30, "C-02", "현대트랜시스"),
        item("D4004", "헤드램프", 0, 20, "D-05", "에스엘"),
    ]
}
