//! Backend-neutral drawing output.
//!
//! Chart assemblers push [`DrawCommand`]s into a [`Scene`]; the egui painter
//! and the SVG writer both replay them in layer order.

pub mod axis;
pub mod legend;
mod svg;

pub use svg::{to_svg, write_svg};

use eframe::egui::{Align2, Color32, Pos2, Rect, Stroke, Vec2, vec2};

use crate::interaction::{HitRegion, HitShape, MarkId};

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Circle {
        center: Pos2,
        radius: f32,
    },
    /// Polyline, or a simple polygon when `closed`.
    Path {
        points: Vec<Pos2>,
        closed: bool,
    },
    /// Filled with the even-odd rule, so inner rings are holes.
    Polygon {
        rings: Vec<Vec<Pos2>>,
    },
    Text {
        pos: Pos2,
        text: String,
        anchor: Align2,
        size: f32,
        /// Clockwise rotation in radians around `pos`.
        angle: f32,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Style {
    pub fill: Option<Color32>,
    pub stroke: Option<Stroke>,
}

impl Style {
    pub fn fill(color: Color32) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
        }
    }

    pub fn stroke(width: f32, color: Color32) -> Self {
        Self {
            fill: None,
            stroke: Some(Stroke::new(width, color)),
        }
    }

    pub fn with_stroke(mut self, width: f32, color: Color32) -> Self {
        self.stroke = Some(Stroke::new(width, color));
        self
    }
}

/// Paint order, back to front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    Marks,
    Axes,
    Labels,
    Legend,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub shape: Shape,
    pub style: Style,
    pub layer: Layer,
    pub mark: Option<MarkId>,
}

/// Page text shown above the chart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Heading {
    pub title: String,
    pub subtitle: Option<String>,
    pub notes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub size: Vec2,
    pub heading: Heading,
    commands: Vec<DrawCommand>,
    hit_regions: Vec<HitRegion>,
}

impl Scene {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: vec2(width, height),
            heading: Heading::default(),
            commands: Vec::new(),
            hit_regions: Vec::new(),
        }
    }

    pub fn with_heading(mut self, title: impl Into<String>, subtitle: Option<String>) -> Self {
        self.heading.title = title.into();
        self.heading.subtitle = subtitle;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.size)
    }

    pub fn push(&mut self, layer: Layer, shape: Shape, style: Style) {
        self.commands.push(DrawCommand {
            shape,
            style,
            layer,
            mark: None,
        });
    }

    /// Pushes a data mark and registers its hit region.
    pub fn push_mark(&mut self, mark: MarkId, shape: Shape, style: Style, hit: HitShape) {
        self.commands.push(DrawCommand {
            shape,
            style,
            layer: Layer::Marks,
            mark: Some(mark),
        });
        self.hit_regions.push(HitRegion { shape: hit, mark });
    }

    pub fn text(
        &mut self,
        layer: Layer,
        pos: Pos2,
        text: impl Into<String>,
        anchor: Align2,
        size: f32,
        color: Color32,
    ) {
        self.push(
            layer,
            Shape::Text {
                pos,
                text: text.into(),
                anchor,
                size,
                angle: 0.0,
            },
            Style::fill(color),
        );
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn hit_regions(&self) -> &[HitRegion] {
        &self.hit_regions
    }

    /// Commands in paint order; insertion order is kept within a layer.
    pub fn ordered(&self) -> Vec<&DrawCommand> {
        let mut ordered: Vec<&DrawCommand> = self.commands.iter().collect();
        ordered.sort_by_key(|command| command.layer);
        ordered
    }

    /// Drops every mark command and hit region; used when a live chart
    /// redraws its marks from a new simulation snapshot.
    pub fn clear_marks(&mut self) {
        self.commands.retain(|command| command.layer != Layer::Marks);
        self.hit_regions.clear();
    }
}

/// Points along the circular arc from `from` to `to` with the given radius,
/// bending clockwise on screen (the SVG `A r r 0 0 1` arc).
///
/// Radii shorter than half the chord are widened to a half circle.
pub fn arc_points(from: Pos2, to: Pos2, radius: f32, segments: usize) -> Vec<Pos2> {
    let chord = to - from;
    let length = chord.length();
    if length <= f32::EPSILON || !radius.is_finite() || radius <= 0.0 {
        return vec![from, to];
    }

    let half = length * 0.5;
    let radius = radius.max(half);
    let rise = (radius * radius - half * half).max(0.0).sqrt();
    let normal = vec2(-chord.y, chord.x) / length;
    let center = from + chord * 0.5 + normal * rise;
    let sweep = 2.0 * (half / radius).clamp(-1.0, 1.0).asin();

    let start = from - center;
    let segments = segments.max(1);
    (0..=segments)
        .map(|step| {
            if step == segments {
                return to;
            }
            let angle = sweep * step as f32 / segments as f32;
            let (sin, cos) = angle.sin_cos();
            center + vec2(start.x * cos - start.y * sin, start.x * sin + start.y * cos)
        })
        .collect()
}

/// Point `distance` back from the end of a polyline and the travel direction
/// there, for placing arrow heads short of a node.
pub fn point_before_end(points: &[Pos2], distance: f32) -> Option<(Pos2, Vec2)> {
    let mut remaining = distance.max(0.0);
    for pair in points.windows(2).rev() {
        let (start, end) = (pair[0], pair[1]);
        let segment = end - start;
        let length = segment.length();
        if length <= f32::EPSILON {
            continue;
        }
        let direction = segment / length;
        if remaining <= length {
            return Some((end - direction * remaining, direction));
        }
        remaining -= length;
    }

    let first = *points.first()?;
    let second = points.iter().copied().find(|point| *point != first)?;
    Some((first, (second - first).normalized()))
}

/// Triangle with its tip at `tip`, pointing along `direction`.
pub fn arrow_head(tip: Pos2, direction: Vec2, length: f32, half_width: f32) -> Vec<Pos2> {
    let direction = direction.normalized();
    let side = vec2(-direction.y, direction.x) * half_width;
    let base = tip - direction * length;
    vec![base + side, tip, base - side]
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn arc_with_chord_radius_spans_sixty_degrees() {
        let from = pos2(0.0, 0.0);
        let to = pos2(10.0, 0.0);
        let points = arc_points(from, to, 10.0, 12);
        assert_eq!(points.first(), Some(&from));
        assert_eq!(points.last(), Some(&to));

        // Centre sits below the chord on screen, so the arc bulges upward.
        let center = pos2(5.0, 75.0_f32.sqrt());
        for point in &points {
            assert!((point.distance(center) - 10.0).abs() < 1e-3);
            assert!(point.y <= 1e-3);
        }
    }

    #[test]
    fn degenerate_arc_is_a_segment() {
        let point = pos2(3.0, 3.0);
        assert_eq!(arc_points(point, point, 5.0, 8), vec![point, point]);
    }

    #[test]
    fn arrow_backs_off_along_the_path() {
        let points = [pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(20.0, 0.0)];
        let (tip, direction) = point_before_end(&points, 4.5).unwrap();
        assert_eq!(tip, pos2(15.5, 0.0));
        assert_eq!(direction, vec2(1.0, 0.0));

        let head = arrow_head(tip, direction, 9.0, 4.5);
        assert_eq!(head, vec![pos2(6.5, 4.5), tip, pos2(6.5, -4.5)]);
    }

    #[test]
    fn ordered_commands_follow_layers() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.text(Layer::Legend, pos2(0.0, 0.0), "legend", Align2::LEFT_TOP, 10.0, Color32::BLACK);
        scene.push_mark(
            MarkId(0),
            Shape::Rect(Rect::from_min_size(pos2(1.0, 1.0), vec2(5.0, 5.0))),
            Style::fill(Color32::RED),
            HitShape::Rect(Rect::from_min_size(pos2(1.0, 1.0), vec2(5.0, 5.0))),
        );
        scene.push(Layer::Background, Shape::Rect(scene.bounds()), Style::fill(Color32::WHITE));

        let layers: Vec<Layer> = scene.ordered().iter().map(|command| command.layer).collect();
        assert_eq!(layers, vec![Layer::Background, Layer::Marks, Layer::Legend]);
        assert_eq!(scene.hit_regions().len(), 1);

        scene.clear_marks();
        assert_eq!(scene.commands().len(), 2);
        assert!(scene.hit_regions().is_empty());
    }
}
