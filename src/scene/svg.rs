use std::fmt::{self, Write};

use eframe::egui::{Align, Align2, Color32, Pos2};

use super::{DrawCommand, Scene, Shape, Style};

/// Renders the scene, headings excluded, as a standalone SVG document.
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_svg(&mut out, scene);
    out
}

pub fn write_svg<W: Write>(out: &mut W, scene: &Scene) -> fmt::Result {
    let (width, height) = (scene.size.x, scene.size.y);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.2} {height:.2}" font-family="sans-serif">"#
    )?;
    if !scene.heading.title.is_empty() {
        writeln!(out, "  <title>{}</title>", escape_xml(&scene.heading.title))?;
    }
    for command in scene.ordered() {
        write_command(out, command)?;
    }
    writeln!(out, "</svg>")
}

fn write_command<W: Write>(out: &mut W, command: &DrawCommand) -> fmt::Result {
    let paint = paint_attributes(&command.style);
    let mark = command
        .mark
        .map(|mark| format!(r#" data-mark="{}""#, mark.0))
        .unwrap_or_default();

    match &command.shape {
        Shape::Rect(rect) => writeln!(
            out,
            r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"{paint}{mark}/>"#,
            rect.min.x,
            rect.min.y,
            rect.width(),
            rect.height()
        ),
        Shape::Circle { center, radius } => writeln!(
            out,
            r#"  <circle cx="{:.2}" cy="{:.2}" r="{radius:.2}"{paint}{mark}/>"#,
            center.x, center.y
        ),
        Shape::Path { points, closed } => {
            if points.len() < 2 {
                return Ok(());
            }
            let mut data = path_data(points);
            if *closed {
                data.push('Z');
            }
            writeln!(out, r#"  <path d="{data}"{paint}{mark}/>"#)
        }
        Shape::Polygon { rings } => {
            let data: String = rings
                .iter()
                .filter(|ring| ring.len() >= 3)
                .map(|ring| path_data(ring) + "Z")
                .collect();
            if data.is_empty() {
                return Ok(());
            }
            writeln!(
                out,
                r#"  <path d="{data}" fill-rule="evenodd"{paint}{mark}/>"#
            )
        }
        Shape::Text {
            pos,
            text,
            anchor,
            size,
            angle,
        } => {
            let (text_anchor, baseline) = text_alignment(*anchor);
            let rotate = if *angle != 0.0 {
                format!(
                    r#" transform="rotate({:.2} {:.2} {:.2})""#,
                    angle.to_degrees(),
                    pos.x,
                    pos.y
                )
            } else {
                String::new()
            };
            writeln!(
                out,
                r#"  <text x="{:.2}" y="{:.2}" font-size="{size:.0}" text-anchor="{text_anchor}" dominant-baseline="{baseline}"{rotate}{paint}>{}</text>"#,
                pos.x,
                pos.y,
                escape_xml(text)
            )
        }
    }
}

fn path_data(points: &[Pos2]) -> String {
    let mut data = String::with_capacity(points.len() * 14);
    for (index, point) in points.iter().enumerate() {
        let command = if index == 0 { 'M' } else { 'L' };
        let _ = write!(data, "{command}{:.2},{:.2}", point.x, point.y);
    }
    data
}

fn paint_attributes(style: &Style) -> String {
    let mut attributes = String::new();
    match style.fill {
        Some(color) => attributes.push_str(&color_attribute("fill", color)),
        None => attributes.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = style.stroke {
        attributes.push_str(&color_attribute("stroke", stroke.color));
        let _ = write!(attributes, r#" stroke-width="{:.2}""#, stroke.width);
    }
    attributes
}

fn color_attribute(name: &str, color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == u8::MAX {
        format!(r##" {name}="#{r:02x}{g:02x}{b:02x}""##)
    } else {
        format!(
            r##" {name}="#{r:02x}{g:02x}{b:02x}" {name}-opacity="{:.3}""##,
            f32::from(a) / 255.0
        )
    }
}

fn text_alignment(anchor: Align2) -> (&'static str, &'static str) {
    let horizontal = match anchor.x() {
        Align::Min => "start",
        Align::Center => "middle",
        Align::Max => "end",
    };
    let vertical = match anchor.y() {
        Align::Min => "hanging",
        Align::Center => "central",
        Align::Max => "auto",
    };
    (horizontal, vertical)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{HitShape, MarkId};
    use crate::scene::Layer;
    use eframe::egui::{Rect, pos2, vec2};

    #[test]
    fn marks_and_text_are_written() {
        let mut scene = Scene::new(100.0, 50.0).with_heading("Sales & <Returns>", None);
        let rect = Rect::from_min_size(pos2(10.0, 5.0), vec2(20.0, 30.0));
        scene.push_mark(
            MarkId(3),
            Shape::Rect(rect),
            Style::fill(Color32::from_rgb(0, 122, 255)),
            HitShape::Rect(rect),
        );
        scene.text(Layer::Labels, pos2(1.0, 2.0), "A < B", Align2::RIGHT_CENTER, 10.0, Color32::BLACK);

        let svg = to_svg(&scene);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<title>Sales &amp; &lt;Returns&gt;</title>"));
        assert!(svg.contains(
            r##"<rect x="10.00" y="5.00" width="20.00" height="30.00" fill="#007aff" data-mark="3"/>"##
        ));
        assert!(svg.contains(r#"text-anchor="end" dominant-baseline="central""#));
        assert!(svg.contains(">A &lt; B</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn polygons_use_even_odd_fill() {
        let mut scene = Scene::new(10.0, 10.0);
        scene.push(
            Layer::Marks,
            Shape::Polygon {
                rings: vec![vec![pos2(0.0, 0.0), pos2(4.0, 0.0), pos2(4.0, 4.0)]],
            },
            Style::stroke(1.0, Color32::WHITE),
        );
        let svg = to_svg(&scene);
        assert!(svg.contains(
            r##"<path d="M0.00,0.00L4.00,0.00L4.00,4.00Z" fill-rule="evenodd" fill="none" stroke="#ffffff" stroke-width="1.00"/>"##
        ));
    }
}
