// Robot roster shown when a process box is selected
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RobotStatus {
    #[serde(rename = "운영중")]
    Operating,
    #[serde(rename = "정지")]
    Stopped,
    #[serde(rename = "점검중")]
    Inspecting,
}

impl RobotStatus {
    pub fn label(self) -> &'static str {
        match self {
            RobotStatus::Operating => "운영중",
            RobotStatus::Stopped => "정지",
            RobotStatus::Inspecting => "점검중",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RobotStatus::Operating => "#4CAF50",
            RobotStatus::Stopped => "#f44336",
            RobotStatus::Inspecting => "#ff9800",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Robot {
    pub id: u32,
    pub name: String,
    pub status: RobotStatus,
    pub vendor: &'static str,
}

use RobotStatus::{Inspecting as I, Operating as O, Stopped as S};

const ROSTER: &[(&str, &[(RobotStatus, &str)])] = &[
    ("도어탈거", &[(O, "KUKA"), (S, "ABB"), (I, "Fanuc")]),
    ("와이어링", &[(O, "KUKA"), (O, "Universal"), (S, "ABB"), (O, "Fanuc")]),
    ("헤드라이너", &[(O, "ABB"), (I, "KUKA")]),
    ("크래쉬패드", &[(O, "Fanuc"), (O, "Universal"), (S, "KUKA"), (O, "ABB"), (I, "Fanuc")]),
    ("연료탱크", &[(O, "ABB"), (S, "KUKA")]),
    ("샤시메리지", &[(O, "Fanuc"), (O, "Universal"), (I, "ABB"), (O, "KUKA")]),
    ("머플러", &[(O, "Universal"), (S, "Fanuc")]),
    ("FEM", &[(O, "KUKA"), (O, "ABB"), (I, "Fanuc")]),
    ("범퍼", &[(O, "Universal"), (S, "KUKA")]),
    ("글라스", &[(O, "ABB"), (O, "Fanuc"), (I, "Universal")]),
    ("시트", &[(O, "KUKA"), (S, "ABB"), (O, "Fanuc")]),
    ("타이어", &[(O, "Universal"), (I, "KUKA")]),
    ("수밀검사", &[(O, "ABB"), (O, "Fanuc"), (S, "Universal"), (O, "KUKA")]),
    ("헤드램프", &[(O, "Fanuc"), (I, "ABB")]),
    ("휠 얼라이언트", &[(O, "KUKA"), (S, "Universal"), (O, "Fanuc")]),
];

/// Robots installed at a process. Ids are unique across the whole hall,
/// numbered in roster order; unknown processes have none.
pub fn robots_for(process: &str) -> Vec<Robot> {
    let mut next_id = 1;
    for (name, robots) in ROSTER {
        if *name == process {
            return robots
                .iter()
                .enumerate()
                .map(|(i, (status, vendor))| Robot {
                    id: next_id + i as u32,
                    name: format!("로봇{}", i + 1),
                    status: *status,
                    vendor,
                })
                .collect();
        }
        next_id += robots.len() as u32;
    }
    Vec::new()
}
