//! The patent-suit graph: a live force layout drawn as arcs between
//! labelled nodes.

use std::collections::HashMap;

use eframe::egui::{Align2, Color32, Pos2, Vec2, vec2};

use super::ChartView;
use crate::config::ChartConfig;
use crate::data::SuitLink;
use crate::error::Result;
use crate::interaction::{DragMachine, HitShape, MarkId, TooltipContent};
use crate::palette::CATEGORY10;
use crate::physics::{LinkShape, Simulation, SimulationLink, TickSnapshot};
use crate::scale::Ordinal;
use crate::scene::legend::{LegendEntry, SwatchLegend};
use crate::scene::{Layer, Scene, Shape, Style, arc_points, arrow_head, point_before_end};

const TITLE: &str =
    "A view of patent-related lawsuits in the mobile communications industry, circa 2011.";
const NODE_RADIUS: f32 = 4.0;
const HIT_RADIUS: f32 = 6.0;
const LINK_WIDTH: f32 = 1.5;
const ARC_SEGMENTS: usize = 24;
const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.5;
const ARROW_BACKOFF: f32 = 4.5;
const LABEL_SIZE: f32 = 12.0;
const LABEL_OFFSET: f32 = 8.0;
const HALO_WIDTH: f32 = 3.0;
/// Upper bound for headless layouts.
pub const MAX_SETTLE_TICKS: usize = 5_000;

pub struct NetworkChart {
    simulation: Simulation,
    ids: Vec<String>,
    links: Vec<SuitLink>,
    endpoints: Vec<(usize, usize)>,
    colors: Ordinal<String, Color32>,
    scene: Scene,
    drag: DragMachine,
    /// Screen position of the simulation origin.
    origin: Vec2,
    revision: u64,
}

impl NetworkChart {
    /// Nodes are the companies in order of first appearance; link types
    /// take palette colors in the same way.
    pub fn new(links: &[SuitLink], config: &ChartConfig) -> Result<Self> {
        let mut ids: Vec<String> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let endpoints: Vec<(usize, usize)> = links
            .iter()
            .map(|link| {
                let source = intern(&link.source, &mut index, &mut ids);
                let target = intern(&link.target, &mut index, &mut ids);
                (source, target)
            })
            .collect();

        let simulation_links: Vec<SimulationLink> = endpoints
            .iter()
            .map(|&(source, target)| SimulationLink {
                source,
                target,
                rest_length: None,
            })
            .collect();
        let simulation = Simulation::new(ids.clone(), &simulation_links, config.simulation)?;

        let palette = config
            .color_palette
            .clone()
            .unwrap_or_else(|| CATEGORY10.to_vec());
        let colors = Ordinal::new(
            links.iter().map(|link| link.kind.clone()),
            palette,
            Color32::GRAY,
        )?;

        let width = config.width();
        let plot = config.inner(width);
        let mut scene = Scene::new(width, config.height).with_heading(TITLE, None);
        let entries: Vec<LegendEntry> = colors
            .entries()
            .map(|(kind, color)| LegendEntry::new(kind.clone(), *color))
            .collect();
        SwatchLegend::column(plot.min + vec2(30.0, 30.0), 15.0, 20.0, 10.0)
            .draw(&mut scene, &entries);

        log::info!(
            "network chart with {} companies and {} suits",
            ids.len(),
            links.len()
        );

        let mut chart = Self {
            simulation,
            ids,
            links: links.to_vec(),
            endpoints,
            colors,
            scene,
            drag: DragMachine::new(),
            origin: plot.center().to_vec2(),
            revision: 0,
        };
        let snapshot = chart.simulation.snapshot();
        chart.redraw(&snapshot);
        Ok(chart)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Runs the layout until it settles, for one-shot rendering.
    pub fn settle(&mut self, max_ticks: usize) {
        if let Some(snapshot) = self.simulation.run_to_completion(max_ticks) {
            self.redraw(&snapshot);
        }
    }

    fn to_screen(&self, point: Pos2) -> Pos2 {
        point + self.origin
    }

    fn redraw(&mut self, snapshot: &TickSnapshot) {
        self.scene.clear_marks();

        for (geometry, link) in snapshot.links.iter().zip(&self.links) {
            let color = *self.colors.scale(&link.kind);
            let from = self.to_screen(geometry.source);
            let to = self.to_screen(geometry.target);
            let points = match geometry.shape {
                LinkShape::Arc { radius } => arc_points(from, to, radius, ARC_SEGMENTS),
                LinkShape::Straight => vec![from, to],
            };
            let head = point_before_end(&points, ARROW_BACKOFF)
                .map(|(tip, direction)| arrow_head(tip, direction, ARROW_LENGTH, ARROW_HALF_WIDTH));

            self.scene.push(
                Layer::Marks,
                Shape::Path {
                    points,
                    closed: false,
                },
                Style::stroke(LINK_WIDTH, color),
            );
            if let Some(head) = head {
                self.scene.push(
                    Layer::Marks,
                    Shape::Path {
                        points: head,
                        closed: true,
                    },
                    Style::fill(color),
                );
            }
        }

        for (index, (position, id)) in snapshot.positions.iter().zip(&self.ids).enumerate() {
            let center = self.to_screen(*position);
            self.scene.push_mark(
                MarkId(index),
                Shape::Circle {
                    center,
                    radius: NODE_RADIUS,
                },
                Style::fill(Color32::BLACK).with_stroke(LINK_WIDTH, Color32::WHITE),
                HitShape::Circle {
                    center,
                    radius: HIT_RADIUS,
                },
            );

            let label = Shape::Text {
                pos: center + Vec2::new(LABEL_OFFSET, 0.0),
                text: id.clone(),
                anchor: Align2::LEFT_CENTER,
                size: LABEL_SIZE,
                angle: 0.0,
            };
            self.scene.push(
                Layer::Marks,
                label.clone(),
                Style::stroke(HALO_WIDTH, Color32::WHITE),
            );
            self.scene.push(Layer::Marks, label, Style::fill(Color32::BLACK));
        }

        self.revision += 1;
    }

    /// `company (type)` for every suit where `side` picks a partner.
    fn partners<F>(&self, side: F) -> String
    where
        F: Fn(usize, usize) -> Option<usize>,
    {
        let partners: Vec<String> = self
            .endpoints
            .iter()
            .zip(&self.links)
            .filter_map(|(&(source, target), link)| {
                side(source, target).map(|other| format!("{} ({})", self.ids[other], link.kind))
            })
            .collect();
        if partners.is_empty() {
            "none".to_owned()
        } else {
            partners.join(", ")
        }
    }
}

fn intern<'a>(id: &'a str, index: &mut HashMap<&'a str, usize>, ids: &mut Vec<String>) -> usize {
    *index.entry(id).or_insert_with(|| {
        ids.push(id.to_owned());
        ids.len() - 1
    })
}

impl ChartView for NetworkChart {
    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn tooltip(&self, mark: MarkId) -> Option<TooltipContent> {
        let node = mark.0;
        let id = self.ids.get(node)?;
        let targets = self.partners(|source, target| (source == node).then_some(target));
        let sources = self.partners(|source, target| (target == node).then_some(source));
        Some(TooltipContent::new([
            id.clone(),
            format!("Targets: {targets}"),
            format!("Sources: {sources}"),
        ]))
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn tick(&mut self) -> bool {
        match self.simulation.tick() {
            Some(snapshot) => {
                self.redraw(&snapshot);
                true
            }
            None => false,
        }
    }

    fn is_animating(&self) -> bool {
        !self.simulation.is_stopped()
    }

    fn drag_start(&mut self, mark: MarkId, pointer: Pos2) -> bool {
        // A cancelled simulation has released its nodes.
        if mark.0 >= self.simulation.nodes().len() {
            return false;
        }
        let at = pointer - self.origin;
        self.drag.press(mark.0, at.to_vec2(), &mut self.simulation);
        true
    }

    fn drag_move(&mut self, pointer: Pos2) {
        let at = pointer - self.origin;
        self.drag.drag(at.to_vec2(), &mut self.simulation);
    }

    fn drag_end(&mut self) {
        self.drag.release(&mut self.simulation);
    }

    fn dragged(&self) -> Option<MarkId> {
        self.drag.dragged().map(MarkId)
    }

    fn stop(&mut self) {
        self.drag.release(&mut self.simulation);
        self.simulation.stop();
    }

    fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        Some(&mut self.simulation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;
    use crate::data::builtin_suits;
    use crate::physics::Phase;
    use eframe::egui::pos2;

    fn suit(source: &str, target: &str, kind: &str) -> SuitLink {
        SuitLink {
            source: source.to_owned(),
            target: target.to_owned(),
            kind: kind.to_owned(),
        }
    }

    fn small() -> NetworkChart {
        let links = vec![
            suit("Apple", "HTC", "suit"),
            suit("Microsoft", "HTC", "licensing"),
            suit("Apple", "Samsung", "suit"),
        ];
        NetworkChart::new(&links, &ChartConfig::defaults(ChartKind::Network)).unwrap()
    }

    #[test]
    fn nodes_follow_first_appearance() {
        let chart = small();
        assert_eq!(chart.ids, vec!["Apple", "HTC", "Microsoft", "Samsung"]);
        assert_eq!(chart.scene().hit_regions().len(), 4);
    }

    #[test]
    fn tooltip_lists_targets_and_sources() {
        let chart = small();
        let apple = chart.tooltip(MarkId(0)).unwrap();
        assert_eq!(
            apple.lines,
            vec![
                "Apple",
                "Targets: HTC (suit), Samsung (suit)",
                "Sources: none"
            ]
        );
        let htc = chart.tooltip(MarkId(1)).unwrap();
        assert_eq!(htc.lines[1], "Targets: none");
        assert_eq!(htc.lines[2], "Sources: Apple (suit), Microsoft (licensing)");
        assert!(chart.tooltip(MarkId(9)).is_none());
    }

    #[test]
    fn legend_survives_redraws() {
        let mut chart = small();
        let legend = |chart: &NetworkChart| {
            chart
                .scene()
                .commands()
                .iter()
                .filter(|command| command.layer == Layer::Legend)
                .count()
        };
        let before = legend(&chart);
        assert_eq!(before, 4);
        let revision = chart.revision();
        assert!(chart.tick());
        assert_eq!(legend(&chart), before);
        assert!(chart.revision() > revision);
    }

    #[test]
    fn dragged_node_follows_the_pointer() {
        let mut chart = small();
        let pointer = pos2(600.0, 200.0);
        assert!(chart.drag_start(MarkId(2), pointer));
        assert_eq!(chart.dragged(), Some(MarkId(2)));
        chart.drag_move(pos2(610.0, 210.0));
        chart.tick();

        let center = chart
            .scene()
            .hit_regions()
            .iter()
            .find_map(|region| match region.shape {
                HitShape::Circle { center, .. } if region.mark == MarkId(2) => Some(center),
                _ => None,
            })
            .unwrap();
        assert!((center - pos2(610.0, 210.0)).length() < 1e-3);

        chart.drag_end();
        assert_eq!(chart.dragged(), None);
    }

    fn node_centers(chart: &NetworkChart) -> Vec<Pos2> {
        chart
            .scene()
            .hit_regions()
            .iter()
            .filter_map(|region| match region.shape {
                HitShape::Circle { center, .. } => Some(center),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn margins_move_the_layout_origin() {
        let links = vec![suit("Apple", "HTC", "suit"), suit("Nokia", "Apple", "suit")];
        let plain = NetworkChart::new(&links, &ChartConfig::defaults(ChartKind::Network)).unwrap();

        let mut config = ChartConfig::defaults(ChartKind::Network);
        config.margins = crate::config::Margins::new(100.0, 0.0, 0.0, 200.0);
        let inset = NetworkChart::new(&links, &config).unwrap();

        for (a, b) in node_centers(&plain).into_iter().zip(node_centers(&inset)) {
            assert!((b - a - vec2(100.0, 50.0)).length() < 1e-3, "{a:?} -> {b:?}");
        }
    }

    #[test]
    fn stopping_freezes_the_scene() {
        let mut chart = small();
        chart.tick();
        let scene = chart.scene().clone();
        chart.stop();
        chart.stop();
        assert!(!chart.is_animating());
        assert!(!chart.tick());
        assert_eq!(chart.scene(), &scene);
        assert!(!chart.drag_start(MarkId(0), pos2(0.0, 0.0)));
    }

    #[test]
    fn builtin_graph_settles() {
        let mut chart =
            NetworkChart::new(&builtin_suits(), &ChartConfig::defaults(ChartKind::Network)).unwrap();
        chart.settle(MAX_SETTLE_TICKS);
        assert!(matches!(chart.simulation().phase(), Phase::Stopped(_)));
        for region in chart.scene().hit_regions() {
            let HitShape::Circle { center, .. } = region.shape else {
                panic!("nodes hit as circles");
            };
            assert!(center.x.is_finite() && center.y.is_finite());
        }
    }
}
