use std::collections::HashMap;

use chartwork::scene::{DrawCommand, Scene, Shape, Style};
use eframe::egui::emath::Rot2;
use eframe::egui::epaint::{Mesh, TextShape};
use eframe::egui::{self, Color32, FontId, Painter, Pos2, Stroke, StrokeKind, Vec2, vec2};

use super::tessellate::fill_rings;

/// Directions used to fake a text halo with offset copies.
const HALO_OFFSETS: [Vec2; 8] = [
    vec2(1.0, 0.0),
    vec2(-1.0, 0.0),
    vec2(0.0, 1.0),
    vec2(0.0, -1.0),
    vec2(0.7, 0.7),
    vec2(-0.7, 0.7),
    vec2(0.7, -0.7),
    vec2(-0.7, -0.7),
];

/// Replays a [`Scene`] onto an egui painter, keeping polygon meshes until
/// the chart's revision or the canvas position changes.
#[derive(Default)]
pub(super) struct ScenePainter {
    fills: Option<FillCache>,
}

struct FillCache {
    revision: u64,
    origin: Vec2,
    /// Keyed by position in paint order.
    meshes: HashMap<usize, Mesh>,
}

impl ScenePainter {
    pub(super) fn paint(&mut self, painter: &Painter, origin: Vec2, scene: &Scene, revision: u64) {
        let ordered = scene.ordered();
        let stale = self
            .fills
            .as_ref()
            .is_none_or(|cache| cache.revision != revision || cache.origin != origin);
        if stale {
            self.fills = Some(FillCache::build(&ordered, origin, revision));
        }

        for (index, command) in ordered.iter().enumerate() {
            let mesh = self
                .fills
                .as_ref()
                .and_then(|cache| cache.meshes.get(&index));
            paint_command(painter, origin, command, mesh);
        }
    }
}

impl FillCache {
    fn build(ordered: &[&DrawCommand], origin: Vec2, revision: u64) -> Self {
        let meshes: HashMap<usize, Mesh> = ordered
            .iter()
            .enumerate()
            .filter_map(|(index, command)| {
                let (Shape::Polygon { rings }, Some(fill)) = (&command.shape, command.style.fill)
                else {
                    return None;
                };
                let rings: Vec<Vec<Pos2>> = rings
                    .iter()
                    .map(|ring| ring.iter().map(|point| *point + origin).collect())
                    .collect();
                let mut mesh = Mesh::default();
                fill_rings(&mut mesh, &rings, fill);
                Some((index, mesh))
            })
            .collect();
        log::debug!("tessellated {} polygons at revision {revision}", meshes.len());
        Self {
            revision,
            origin,
            meshes,
        }
    }
}

fn paint_command(painter: &Painter, origin: Vec2, command: &DrawCommand, mesh: Option<&Mesh>) {
    let Style { fill, stroke } = command.style;
    let stroke = stroke.unwrap_or(Stroke::NONE);
    match &command.shape {
        Shape::Rect(rect) => {
            let rect = rect.translate(origin);
            if let Some(fill) = fill {
                painter.rect_filled(rect, 0.0, fill);
            }
            if stroke != Stroke::NONE {
                painter.rect_stroke(rect, 0.0, stroke, StrokeKind::Middle);
            }
        }
        Shape::Circle { center, radius } => {
            painter.circle(
                *center + origin,
                *radius,
                fill.unwrap_or(Color32::TRANSPARENT),
                stroke,
            );
        }
        Shape::Path { points, closed } => {
            let points: Vec<Pos2> = points.iter().map(|point| *point + origin).collect();
            match (closed, fill) {
                (true, Some(fill)) => {
                    painter.add(egui::Shape::convex_polygon(points, fill, stroke));
                }
                (true, None) => {
                    painter.add(egui::Shape::closed_line(points, stroke));
                }
                (false, _) => {
                    painter.add(egui::Shape::line(points, stroke));
                }
            }
        }
        Shape::Polygon { rings } => {
            if let Some(mesh) = mesh {
                painter.add(egui::Shape::mesh(mesh.clone()));
            }
            if stroke != Stroke::NONE {
                for ring in rings {
                    let points: Vec<Pos2> = ring.iter().map(|point| *point + origin).collect();
                    painter.add(egui::Shape::closed_line(points, stroke));
                }
            }
        }
        Shape::Text {
            pos,
            text,
            anchor,
            size,
            angle,
        } => {
            let pos = *pos + origin;
            let font = FontId::proportional(*size);
            if stroke != Stroke::NONE {
                let reach = stroke.width * 0.5;
                for offset in HALO_OFFSETS {
                    paint_text(painter, pos + offset * reach, text, *anchor, &font, stroke.color, *angle);
                }
            }
            if let Some(fill) = fill {
                paint_text(painter, pos, text, *anchor, &font, fill, *angle);
            }
        }
    }
}

fn paint_text(
    painter: &Painter,
    pos: Pos2,
    text: &str,
    anchor: egui::Align2,
    font: &FontId,
    color: Color32,
    angle: f32,
) {
    if angle == 0.0 {
        painter.text(pos, anchor, text, font.clone(), color);
        return;
    }
    // TextShape rotates around its top-left corner, so rotate the anchor
    // offset to keep `pos` fixed.
    let galley = painter.layout_no_wrap(text.to_owned(), font.clone(), color);
    let offset = anchor.anchor_size(pos, galley.size()).min - pos;
    let corner = pos + Rot2::from_angle(angle) * offset;
    painter.add(TextShape::new(corner, galley, color).with_angle(angle));
}
