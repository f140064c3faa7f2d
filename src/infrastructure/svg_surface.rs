// SVG drawing surface - serialises a rendered twin frame as an SVG document
use crate::application::renderer::{Surface, TextStyle};
use crate::domain::transform::{Point, Rect, Size};
use std::fmt::Write;

#[derive(Debug, Default, Clone)]
pub struct SvgSurface {
    display: Size,
    backing: Size,
    body: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last frame. Empty until something has been rendered.
    pub fn document(&self) -> String {
        if self.display.is_empty() {
            return String::new();
        }
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" data-backing=\"{bw}x{bh}\" font-family=\"Arial\">{body}</svg>",
            w = num(self.display.width),
            h = num(self.display.height),
            bw = num(self.backing.width),
            bh = num(self.backing.height),
            body = self.body,
        )
    }
}

fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 { format!("{}", rounded as i64) } else { format!("{}", rounded) }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

impl Surface for SvgSurface {
    fn begin_frame(&mut self, display: Size, backing: Size, _device_pixel_ratio: f64) {
        self.display = display;
        self.backing = backing;
        self.body.clear();
    }

    fn fill_background(&mut self, color: &str) {
        let _ = write!(self.body, "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>", color);
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            num(rect.x), num(rect.y), num(rect.width), num(rect.height), color
        );
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) {
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            num(rect.x), num(rect.y), num(rect.width), num(rect.height), color, num(line_width)
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: &str) {
        let _ = write!(
            self.body,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>",
            num(center.x), num(center.y), num(radius), color
        );
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: &str, line_width: f64) {
        let _ = write!(
            self.body,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            num(center.x), num(center.y), num(radius), color, num(line_width)
        );
    }

    fn fill_polygon(&mut self, points: &[Point], color: &str) {
        let points: Vec<String> = points.iter().map(|p| format!("{},{}", num(p.x), num(p.y))).collect();
        let _ = write!(self.body, "<polygon points=\"{}\" fill=\"{}\"/>", points.join(" "), color);
    }

    fn text(&mut self, anchor: Point, content: &str, style: &TextStyle) {
        let weight = if style.bold { " font-weight=\"bold\"" } else { "" };
        let _ = write!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\"{} fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
            num(anchor.x), num(anchor.y), num(style.size), weight, style.color, escape(content)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::renderer::{render, Scene};
    use crate::domain::layout::LayoutGeometry;

    #[test]
    fn test_empty_before_first_frame() {
        assert_eq!(SvgSurface::new().document(), "");
    }

    #[test]
    fn test_rendered_document() {
        let layout = LayoutGeometry::factory();
        let mut svg = SvgSurface::new();
        let scene = Scene {
            container: Size::new(800.0, 600.0),
            device_pixel_ratio: 2.0,
            layout: &layout,
            markers: &[],
            selected: None,
        };
        render(&mut svg, &scene).unwrap();
        let doc = svg.document();

        assert!(doc.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"800\" height=\"600\""));
        assert!(doc.contains("data-backing=\"1600x1200\""));
        assert!(doc.contains(">휠 얼라이언트</text>"));
        assert!(doc.ends_with("</svg>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut svg = SvgSurface::new();
        svg.begin_frame(Size::new(10.0, 10.0), Size::new(10.0, 10.0), 1.0);
        let style = TextStyle { size: 12.0, bold: false, color: "#333" };
        svg.text(Point::new(1.0, 2.5), "<A&B>", &style);
        assert!(svg.document().contains(">&lt;A&amp;B&gt;</text>"));
        assert!(svg.document().contains("x=\"1\" y=\"2.5\""));
    }
}
