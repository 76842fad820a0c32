//! SVG drawing surface

use crate::domain::Position;
use crate::infrastructure::traits::{Canvas, Stroke, TextStyle};

const FONT_FAMILY: &str = "Arial, sans-serif";

/// Canvas that accumulates SVG elements and renders them as one document.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    elements: Vec<String>,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// The complete SVG document.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" viewBox=\"0 0 {w:.0} {h:.0}\">\n",
            w = self.width,
            h = self.height,
        );
        for element in &self.elements {
            svg.push_str("  ");
            svg.push_str(element);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }
}

impl Canvas for SvgCanvas {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.elements.clear();
    }

    fn line(&mut self, from: Position, to: Position, stroke: &Stroke) {
        self.elements.push(format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"{}\" />",
            from.x,
            from.y,
            to.x,
            to.y,
            escape(&stroke.color),
            stroke.width
        ));
    }

    fn circle(&mut self, center: Position, radius: f64, fill: &str, stroke: &Stroke) {
        self.elements.push(format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" />",
            center.x,
            center.y,
            radius,
            escape(fill),
            escape(&stroke.color),
            stroke.width
        ));
    }

    fn text(&mut self, anchor: Position, content: &str, style: &TextStyle) {
        let weight = if style.bold { " font-weight=\"bold\"" } else { "" };
        self.elements.push(format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\" font-family=\"{}\" font-size=\"{}\"{} text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
            anchor.x,
            anchor.y,
            escape(&style.color),
            FONT_FAMILY,
            style.size,
            weight,
            escape(content)
        ));
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke() -> Stroke {
        Stroke {
            color: "#333".to_string(),
            width: 2.0,
        }
    }

    #[test]
    fn given_drawn_shapes_when_rendering_then_document_contains_elements() {
        let mut canvas = SvgCanvas::new(200.0, 100.0);
        canvas.line(Position::new(0.0, 0.0), Position::new(10.0, 20.0), &stroke());
        canvas.circle(Position::new(100.0, 50.0), 20.0, "#4CAF50", &stroke());

        let svg = canvas.to_svg();
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains("viewBox=\"0 0 200 100\""));
        assert!(svg.contains("<line x1=\"0.0\" y1=\"0.0\" x2=\"10.0\" y2=\"20.0\""));
        assert!(svg.contains("<circle cx=\"100.0\" cy=\"50.0\" r=\"20\" fill=\"#4CAF50\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn given_markup_in_text_when_rendering_then_escapes_it() {
        let mut canvas = SvgCanvas::new(10.0, 10.0);
        let style = TextStyle {
            color: "white".to_string(),
            size: 16.0,
            bold: true,
        };
        canvas.text(Position::new(5.0, 5.0), "<a & b>", &style);
        let svg = canvas.to_svg();
        assert!(svg.contains("&lt;a &amp; b&gt;"));
        assert!(svg.contains("font-weight=\"bold\""));
    }

    #[test]
    fn given_drawn_canvas_when_clearing_then_no_elements_remain() {
        let mut canvas = SvgCanvas::new(10.0, 10.0);
        canvas.circle(Position::new(1.0, 1.0), 1.0, "red", &stroke());
        canvas.clear();
        assert_eq!(canvas.element_count(), 0);
    }
}
