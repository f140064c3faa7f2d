// Pointer interaction - hit-testing and the process popover
use crate::domain::layout::LayoutGeometry;
use crate::domain::marker::Marker;
use crate::domain::robot::{robots_for, Robot};
use crate::domain::transform::{pointer_to_logical, Point, RenderTransform};
use serde::{Deserialize, Serialize};

/// Extra reach around a marker circle that still counts as a hit.
pub const HIT_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Marker { station_id: String },
    /// `anchor` is the top centre of the label strip in logical space.
    Process { name: String, anchor: Point },
}

/// Markers first, then process label strips. First match wins.
pub fn hit_test(point: Point, markers: &[Marker], layout: &LayoutGeometry) -> Option<Hit> {
    if let Some(marker) = markers
        .iter()
        .find(|m| point.distance_to(m.center()) <= m.radius + HIT_TOLERANCE)
    {
        return Some(Hit::Marker { station_id: marker.station_id.clone() });
    }

    layout.lines().iter().find_map(|line| {
        line.processes.iter().find_map(|process| {
            let label = process.label_region(line.y);
            label.contains(point).then(|| Hit::Process {
                name: process.name.clone(),
                anchor: Point::new(process.x, label.y),
            })
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    Pointer,
    Default,
}

pub fn cursor_at(point: Point, markers: &[Marker], layout: &LayoutGeometry) -> Cursor {
    match hit_test(point, markers, layout) {
        Some(_) => Cursor::Pointer,
        None => Cursor::Default,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Popover {
    Closed,
    #[serde(rename_all = "camelCase")]
    Open {
        process: String,
        /// Client coordinates of the popover's anchor
        position: Point,
        robots: Vec<Robot>,
    },
}

/// A robot picked from a popover, with the process it was listed under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotSelection {
    pub process: String,
    pub robot: Robot,
}

/// Where a click landed relative to the twin canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickTarget {
    Canvas,
    Elsewhere,
}

/// Click anywhere in the document, as seen by the global listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentClick {
    pub target: ClickTarget,
}

/// Popover plus the currently selected product marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    popover: Popover,
    selected: Option<String>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self { popover: Popover::Closed, selected: None }
    }
}

impl Interaction {
    pub fn popover(&self) -> &Popover {
        &self.popover
    }

    /// Station id of the selected product marker.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Handle a click on the canvas at `client` coordinates.
    ///
    /// A marker hit selects the product and leaves the popover as it is;
    /// a label hit (re)opens the popover; a miss closes the popover and
    /// clears the selection.
    pub fn click(
        &mut self,
        client: Point,
        canvas_origin: Point,
        transform: &RenderTransform,
        markers: &[Marker],
        layout: &LayoutGeometry,
    ) -> Option<Hit> {
        let logical = pointer_to_logical(client, canvas_origin, transform);
        let hit = hit_test(logical, markers, layout);
        match &hit {
            Some(Hit::Marker { station_id }) => {
                tracing::debug!("Selected product at {}", station_id);
                self.selected = Some(station_id.clone());
            }
            Some(Hit::Process { name, anchor }) => {
                let device = transform.to_device(*anchor);
                self.popover = Popover::Open {
                    process: name.clone(),
                    position: Point::new(canvas_origin.x + device.x, canvas_origin.y + device.y),
                    robots: robots_for(name),
                };
            }
            None => {
                self.popover = Popover::Closed;
                self.selected = None;
            }
        }
        hit
    }

    /// A document click. Only clicks outside the canvas close the popover.
    pub fn document_click(&mut self, click: DocumentClick) {
        if click.target == ClickTarget::Elsewhere {
            self.close();
        }
    }

    pub fn close(&mut self) {
        self.popover = Popover::Closed;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Pick one of the open popover's robots and close the popover. `None`
    /// when the popover is closed or the robot is not installed at that
    /// process; the popover is left as it was.
    pub fn select_robot(&mut self, robot_id: u32) -> Option<RobotSelection> {
        let Popover::Open { process, robots, .. } = &self.popover else {
            return None;
        };
        let robot = robots.iter().find(|r| r.id == robot_id)?.clone();
        let selection = RobotSelection { process: process.clone(), robot };
        self.close();
        Some(selection)
    }
}
