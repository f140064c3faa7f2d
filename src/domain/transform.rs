// Render transform - logical content space to device pixels and back
use serde::{Deserialize, Serialize};

/// Logical content space every layout coordinate is defined in.
pub const CONTENT_WIDTH: f64 = 1000.0;
pub const CONTENT_HEIGHT: f64 = 900.0;

/// Margin left around the scaled content.
pub const FIT_FACTOR: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges inclusive.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Uniform scale plus centring offset, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for RenderTransform {
    fn default() -> Self {
        Self { scale: 1.0, offset_x: 0.0, offset_y: 0.0 }
    }
}

impl RenderTransform {
    /// Fit the logical content into `container`, preserving aspect ratio.
    ///
    /// Returns `None` for an empty container since no positive scale exists.
    pub fn fit(container: Size) -> Option<Self> {
        if container.is_empty() {
            return None;
        }
        let scale = (container.width / CONTENT_WIDTH).min(container.height / CONTENT_HEIGHT) * FIT_FACTOR;
        Some(Self {
            scale,
            offset_x: (container.width - CONTENT_WIDTH * scale) / 2.0,
            offset_y: (container.height - CONTENT_HEIGHT * scale) / 2.0,
        })
    }

    pub fn to_device(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset_x, p.y * self.scale + self.offset_y)
    }

    pub fn to_logical(&self, p: Point) -> Point {
        Point::new((p.x - self.offset_x) / self.scale, (p.y - self.offset_y) / self.scale)
    }

    pub fn rect_to_device(&self, r: Rect) -> Rect {
        let origin = self.to_device(Point::new(r.x, r.y));
        Rect::new(origin.x, origin.y, r.width * self.scale, r.height * self.scale)
    }

    pub fn length_to_device(&self, len: f64) -> f64 {
        len * self.scale
    }
}

/// Map a pointer position in client coordinates into logical space.
///
/// `canvas_origin` is the canvas element's top-left corner in the same
/// client coordinate system.
pub fn pointer_to_logical(client: Point, canvas_origin: Point, transform: &RenderTransform) -> Point {
    transform.to_logical(Point::new(client.x - canvas_origin.x, client.y - canvas_origin.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_centres_content() {
        let t = RenderTransform::fit(Size::new(800.0, 600.0)).unwrap();
        let expected_scale = (600.0 / 900.0) * 0.95;
        assert!((t.scale - expected_scale).abs() < 1e-12);
        assert!((t.offset_x - (800.0 - 1000.0 * expected_scale) / 2.0).abs() < 1e-9);
        assert!((t.offset_y - (600.0 - 900.0 * expected_scale) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_empty_container() {
        assert!(RenderTransform::fit(Size::new(0.0, 600.0)).is_none());
        assert!(RenderTransform::fit(Size::new(f64::NAN, 600.0)).is_none());
    }

    #[test]
    fn test_doubling_container_doubles_scale() {
        let small = RenderTransform::fit(Size::new(800.0, 600.0)).unwrap();
        let large = RenderTransform::fit(Size::new(1600.0, 1200.0)).unwrap();
        assert_eq!(large.scale, small.scale * 2.0);
        assert_eq!(large.offset_x, small.offset_x * 2.0);
        assert_eq!(large.offset_y, small.offset_y * 2.0);
    }

    #[test]
    fn test_round_trip_over_sizes_and_points() {
        let sizes = [(320.0, 240.0), (800.0, 600.0), (1920.0, 1080.0), (333.0, 1777.0), (1000.0, 900.0)];
        for (w, h) in sizes {
            let t = RenderTransform::fit(Size::new(w, h)).unwrap();
            let origin = Point::new(17.5, 240.0);
            for ix in 0..=10 {
                for iy in 0..=10 {
                    let p = Point::new(ix as f64 * 100.0, iy as f64 * 90.0);
                    let device = t.to_device(p);
                    let client = Point::new(device.x + origin.x, device.y + origin.y);
                    let back = pointer_to_logical(client, origin, &t);
                    assert!((back.x - p.x).abs() < 1e-9, "{:?} -> {:?}", p, back);
                    assert!((back.y - p.y).abs() < 1e-9, "{:?} -> {:?}", p, back);
                }
            }
        }
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 30.0);
        assert!(r.contains(Point::new(10.0, 20.0)));
        assert!(r.contains(Point::new(110.0, 50.0)));
        assert!(!r.contains(Point::new(110.1, 50.0)));
        assert_eq!(r.center(), Point::new(60.0, 35.0));
    }
}
