// Factory layout domain model - conveyor lines and process boxes
use super::transform::{Point, Rect, CONTENT_WIDTH};
use serde::Serialize;
use thiserror::Error;

pub const BELT_HEIGHT: f64 = 60.0;
pub const BOX_HEIGHT: f64 = 120.0;
/// Clickable strip at the top of each process box holding its name.
pub const LABEL_HEIGHT: f64 = 30.0;
/// Width of the vertical belt joining two lines.
pub const TURN_WIDTH: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Left to right
    Forward,
    /// Right to left
    Reverse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Process {
    pub name: String,
    /// Centre of the box on the x axis
    pub x: f64,
    pub width: f64,
    pub height: f64,
}

impl Process {
    pub fn new(name: &str, x: f64, width: f64) -> Self {
        Self { name: name.to_string(), x, width, height: BOX_HEIGHT }
    }

    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn bounds(&self, line_y: f64) -> Rect {
        Rect::new(self.left(), line_y - self.height / 2.0, self.width, self.height)
    }

    pub fn label_region(&self, line_y: f64) -> Rect {
        let bounds = self.bounds(line_y);
        Rect::new(bounds.x, bounds.y, bounds.width, LABEL_HEIGHT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub name: String,
    /// Belt centre line
    pub y: f64,
    pub direction: Direction,
    pub processes: Vec<Process>,
}

impl Line {
    pub fn belt(&self) -> Rect {
        Rect::new(0.0, self.y - BELT_HEIGHT / 2.0, CONTENT_WIDTH, BELT_HEIGHT)
    }

    /// Where the line letter is drawn.
    pub fn glyph_anchor(&self) -> Point {
        Point::new(80.0, self.y + 7.0)
    }

    /// Tip of the flow arrow at the line's entry end, and its angle.
    pub fn arrow(&self) -> (Point, f64) {
        match self.direction {
            Direction::Forward => (Point::new(30.0, self.y), 0.0),
            Direction::Reverse => (Point::new(CONTENT_WIDTH - 30.0, self.y), std::f64::consts::PI),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("processes {first} and {second} overlap on line {line}")]
    Overlap { line: String, first: String, second: String },
}

/// Static factory geometry. Fixed at build time; only replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutGeometry {
    lines: Vec<Line>,
}

impl LayoutGeometry {
    pub fn new(lines: Vec<Line>) -> Result<Self, LayoutError> {
        for line in &lines {
            let mut spans: Vec<&Process> = line.processes.iter().collect();
            spans.sort_by(|a, b| a.left().total_cmp(&b.left()));
            for pair in spans.windows(2) {
                if pair[0].right() > pair[1].left() {
                    return Err(LayoutError::Overlap {
                        line: line.name.clone(),
                        first: pair[0].name.clone(),
                        second: pair[1].name.clone(),
                    });
                }
            }
        }
        Ok(Self { lines })
    }

    #[cfg(test)]
    pub fn factory() -> Self {
        Self { lines: factory_lines() }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, name: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.name == name)
    }

    /// Vertical belts carrying product from the exit end of one line to
    /// the entry end of the next.
    pub fn turns(&self) -> Vec<Rect> {
        self.lines
            .windows(2)
            .map(|pair| {
                let top = pair[0].y + BELT_HEIGHT / 2.0;
                let height = pair[1].y - BELT_HEIGHT / 2.0 - top;
                let x = match pair[0].direction {
                    Direction::Forward => CONTENT_WIDTH - TURN_WIDTH,
                    Direction::Reverse => 0.0,
                };
                Rect::new(x, top, TURN_WIDTH, height)
            })
            .collect()
    }
}

/// The four-line assembly hall: trim (A), chassis (B), final (C) and
/// inspection (D), snaking top to bottom.
pub fn factory_lines() -> Vec<Line> {
    let line = |name: &str, y: f64, direction: Direction, processes: Vec<Process>| Line {
        name: name.to_string(),
        y,
        direction,
        processes,
    };

    vec![
        line("A", 150.0, Direction::Forward, vec![
            Process::new("도어탈거", 150.0, 120.0),
            Process::new("와이어링", 300.0, 120.0),
            Process::new("헤드라이너", 450.0, 120.0),
            Process::new("크래쉬패드", 750.0, 350.0),
        ]),
        line("B", 350.0, Direction::Reverse, vec![
            Process::new("연료탱크", 850.0, 100.0),
            Process::new("샤시메리지", 500.0, 500.0),
            Process::new("머플러", 150.0, 100.0),
        ]),
        line("C", 550.0, Direction::Forward, vec![
            Process::new("FEM", 150.0, 120.0),
            Process::new("글라스", 300.0, 120.0),
            Process::new("시트", 450.0, 120.0),
            Process::new("범퍼", 600.0, 120.0),
            Process::new("타이어", 750.0, 120.0),
        ]),
        line("D", 750.0, Direction::Reverse, vec![
            Process::new("수밀검사", 320.0, 450.0),
            Process::new("헤드램프", 650.0, 120.0),
            Process::new("휠 얼라이언트", 800.0, 120.0),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_layout_is_valid() {
        let factory = LayoutGeometry::new(factory_lines()).unwrap();
        assert_eq!(factory, LayoutGeometry::factory());
        assert_eq!(factory.lines().len(), 4);
        assert_eq!(factory.line("C").map(|l| l.processes.len()), Some(5));
    }

    #[test]
    fn test_overlap_rejected() {
        let line = Line {
            name: "X".to_string(),
            y: 100.0,
            direction: Direction::Forward,
            processes: vec![Process::new("left", 100.0, 120.0), Process::new("right", 200.0, 120.0)],
        };
        assert_eq!(
            LayoutGeometry::new(vec![line]),
            Err(LayoutError::Overlap {
                line: "X".to_string(),
                first: "left".to_string(),
                second: "right".to_string(),
            })
        );
    }

    #[test]
    fn test_turns_alternate_sides() {
        let turns = LayoutGeometry::factory().turns();
        assert_eq!(
            turns,
            vec![
                Rect::new(940.0, 180.0, 60.0, 140.0),
                Rect::new(0.0, 380.0, 60.0, 140.0),
                Rect::new(940.0, 580.0, 60.0, 140.0),
            ]
        );
    }

    #[test]
    fn test_label_region_is_top_strip() {
        let p = Process::new("FEM", 150.0, 120.0);
        assert_eq!(p.label_region(550.0), Rect::new(90.0, 490.0, 120.0, 30.0));
        assert_eq!(p.bounds(550.0).height, 120.0);
    }
}
