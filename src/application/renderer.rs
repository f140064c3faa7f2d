// Twin renderer - draws layout and markers onto a drawing surface
use crate::domain::layout::LayoutGeometry;
use crate::domain::marker::Marker;
use crate::domain::transform::{Point, Rect, RenderTransform, Size};

pub const BACKGROUND: &str = "#f8f9fa";
pub const BELT_COLOR: &str = "#444";
pub const BOX_FILL: &str = "rgba(255, 255, 255, 0.1)";
pub const BOX_STROKE: &str = "#1976d2";
pub const SELECTED_RING: &str = "#ff0000";

/// Arrow head half-height and depth in logical units.
const ARROW_SPREAD: f64 = 15.0;
const ARROW_DEPTH: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font size in device pixels
    pub size: f64,
    pub bold: bool,
    pub color: &'static str,
}

impl TextStyle {
    fn bold(size: f64, color: &'static str) -> Self {
        Self { size, bold: true, color }
    }
}

/// Drawing handle the renderer paints through. Coordinates are CSS pixels of
/// the display area; text is centred on its anchor.
pub trait Surface {
    /// Start a new frame. `backing` is `display` times the pixel ratio.
    fn begin_frame(&mut self, display: Size, backing: Size, device_pixel_ratio: f64);
    fn fill_background(&mut self, color: &str);
    fn fill_rect(&mut self, rect: Rect, color: &str);
    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64);
    fn fill_circle(&mut self, center: Point, radius: f64, color: &str);
    fn stroke_circle(&mut self, center: Point, radius: f64, color: &str, line_width: f64);
    fn fill_polygon(&mut self, points: &[Point], color: &str);
    fn text(&mut self, anchor: Point, content: &str, style: &TextStyle);
}

/// Immutable input of one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub container: Size,
    pub device_pixel_ratio: f64,
    pub layout: &'a LayoutGeometry,
    pub markers: &'a [Marker],
    /// Station id of the highlighted marker
    pub selected: Option<&'a str>,
}

/// Paint one frame and return the transform used, which the hit-tester
/// must invert. Nothing is drawn while the container has no area.
pub fn render<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) -> Option<RenderTransform> {
    let Some(transform) = RenderTransform::fit(scene.container) else {
        tracing::debug!("Skipping render, container is {:?}", scene.container);
        return None;
    };

    let dpr = if scene.device_pixel_ratio > 0.0 { scene.device_pixel_ratio } else { 1.0 };
    let backing = Size::new(scene.container.width * dpr, scene.container.height * dpr);
    surface.begin_frame(scene.container, backing, dpr);
    surface.fill_background(BACKGROUND);

    draw_conveyors(surface, scene.layout, &transform);
    draw_line_markings(surface, scene.layout, &transform);
    for marker in scene.markers {
        draw_marker(surface, marker, &transform);
    }
    draw_process_boxes(surface, scene.layout, &transform);
    if let Some(selected) = scene.selected {
        if let Some(marker) = scene.markers.iter().find(|m| m.station_id == selected) {
            let center = transform.to_device(marker.center());
            let radius = transform.length_to_device(marker.radius + 3.0);
            surface.stroke_circle(center, radius, SELECTED_RING, transform.length_to_device(3.0));
        }
    }

    Some(transform)
}

fn draw_conveyors<S: Surface + ?Sized>(surface: &mut S, layout: &LayoutGeometry, t: &RenderTransform) {
    for line in layout.lines() {
        surface.fill_rect(t.rect_to_device(line.belt()), BELT_COLOR);
    }
    for turn in layout.turns() {
        surface.fill_rect(t.rect_to_device(turn), BELT_COLOR);
    }
}

fn draw_line_markings<S: Surface + ?Sized>(surface: &mut S, layout: &LayoutGeometry, t: &RenderTransform) {
    let glyph = TextStyle::bold(t.length_to_device(20.0), "#ffffff");
    for line in layout.lines() {
        surface.text(t.to_device(line.glyph_anchor()), &line.name, &glyph);

        let (tip, angle) = line.arrow();
        let (sin, cos) = angle.sin_cos();
        let head: Vec<Point> = [(0.0, 0.0), (-ARROW_DEPTH, -ARROW_SPREAD), (-ARROW_DEPTH, ARROW_SPREAD)]
            .iter()
            .map(|(dx, dy)| t.to_device(Point::new(tip.x + dx * cos - dy * sin, tip.y + dx * sin + dy * cos)))
            .collect();
        surface.fill_polygon(&head, "#ffffff");
    }
}

fn draw_marker<S: Surface + ?Sized>(surface: &mut S, marker: &Marker, t: &RenderTransform) {
    let center = t.to_device(marker.center());
    let radius = t.length_to_device(marker.radius);

    surface.fill_circle(center, t.length_to_device(marker.radius + 2.0), marker.color);
    surface.fill_circle(center, radius, marker.color);
    surface.stroke_circle(center, radius, "#000000", t.length_to_device(3.0));
    surface.text(center, &marker.label, &TextStyle::bold(t.length_to_device(12.0), "white"));

    let above = t.to_device(Point::new(marker.x, marker.y - marker.radius - 8.0));
    let progress = format!("{:.0}%", marker.progress);
    surface.text(above, &progress, &TextStyle::bold(t.length_to_device(8.0), "#000000"));
}

fn draw_process_boxes<S: Surface + ?Sized>(surface: &mut S, layout: &LayoutGeometry, t: &RenderTransform) {
    let label = TextStyle::bold(t.length_to_device(16.0), "#333");
    for line in layout.lines() {
        for process in &line.processes {
            let bounds = process.bounds(line.y);
            let device = t.rect_to_device(bounds);
            surface.fill_rect(device, BOX_FILL);
            surface.stroke_rect(device, BOX_STROKE, t.length_to_device(2.0));
            let anchor = t.to_device(Point::new(process.x, bounds.y + 25.0));
            surface.text(anchor, &process.name, &label);
        }
    }
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BeginFrame { display: Size, backing: Size, device_pixel_ratio: f64 },
    Background(String),
    FillRect(Rect, String),
    StrokeRect(Rect, String),
    FillCircle { center: Point, radius: f64, color: String },
    StrokeCircle { center: Point, radius: f64, color: String },
    Polygon(Vec<Point>),
    Text { anchor: Point, content: String },
}

/// Surface that records what was drawn, for inspection.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct DisplayList {
    pub ops: Vec<DrawOp>,
}

#[cfg(test)]
impl DisplayList {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
impl Surface for DisplayList {
    fn begin_frame(&mut self, display: Size, backing: Size, device_pixel_ratio: f64) {
        self.ops.clear();
        self.ops.push(DrawOp::BeginFrame { display, backing, device_pixel_ratio });
    }

    fn fill_background(&mut self, color: &str) {
        self.ops.push(DrawOp::Background(color.to_string()));
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ops.push(DrawOp::FillRect(rect, color.to_string()));
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, _line_width: f64) {
        self.ops.push(DrawOp::StrokeRect(rect, color.to_string()));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: &str) {
        self.ops.push(DrawOp::FillCircle { center, radius, color: color.to_string() });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: &str, _line_width: f64) {
        self.ops.push(DrawOp::StrokeCircle { center, radius, color: color.to_string() });
    }

    fn fill_polygon(&mut self, points: &[Point], _color: &str) {
        self.ops.push(DrawOp::Polygon(points.to_vec()));
    }

    fn text(&mut self, anchor: Point, content: &str, _style: &TextStyle) {
        self.ops.push(DrawOp::Text { anchor, content: content.to_string() });
    }
}
