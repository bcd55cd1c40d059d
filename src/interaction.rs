//! Pointer interaction: hit testing, the hover/tooltip state machine and
//! the drag-to-pin state machine used by the network chart.
//!
//! The host only forwards raw pointer positions; charts supply the hit
//! regions of their marks and a pure function from mark to tooltip text.

use eframe::egui::{Pos2, Rect, Vec2, vec2};

use crate::physics::Simulation;

/// Offset of the tooltip box from the pointer.
pub const TOOLTIP_OFFSET: Vec2 = vec2(10.0, -28.0);

/// Identifies one data mark within a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub enum HitShape {
    Rect(Rect),
    Circle {
        center: Pos2,
        radius: f32,
    },
    /// Even-odd filled rings, so holes are excluded.
    Polygon {
        bounds: Rect,
        rings: Vec<Vec<Pos2>>,
    },
}

impl HitShape {
    pub fn polygon(rings: Vec<Vec<Pos2>>) -> Self {
        let bounds = Rect::from_points(&rings.iter().flatten().copied().collect::<Vec<_>>());
        Self::Polygon { bounds, rings }
    }

    pub fn contains(&self, point: Pos2) -> bool {
        match self {
            Self::Rect(rect) => rect.contains(point),
            Self::Circle { center, radius } => center.distance_sq(point) <= radius * radius,
            Self::Polygon { bounds, rings } => {
                bounds.contains(point)
                    && rings.iter().filter(|ring| ring_contains(ring, point)).count() % 2 == 1
            }
        }
    }
}

/// Crossing-number test; the ring may or may not repeat its first point.
fn ring_contains(ring: &[Pos2], point: Pos2) -> bool {
    let mut inside = false;
    let Some(mut previous) = ring.last().copied() else {
        return false;
    };
    for &current in ring {
        if (current.y > point.y) != (previous.y > point.y) {
            let t = (point.y - current.y) / (previous.y - current.y);
            let crossing = current.x + t * (previous.x - current.x);
            if point.x < crossing {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

#[derive(Clone, Debug, PartialEq)]
pub struct HitRegion {
    pub shape: HitShape,
    pub mark: MarkId,
}

/// The mark under `point`; later regions are drawn on top and win.
pub fn hit_test(regions: &[HitRegion], point: Pos2) -> Option<MarkId> {
    regions
        .iter()
        .rev()
        .find(|region| region.shape.contains(point))
        .map(|region| region.mark)
}

/// Text lines of one tooltip, first line as the heading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TooltipContent {
    pub lines: Vec<String>,
}

impl TooltipContent {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum HoverState {
    #[default]
    Idle,
    Showing {
        mark: MarkId,
        content: TooltipContent,
        anchor: Pos2,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverEvent {
    Enter(MarkId),
    /// Pointer moved within the same mark.
    Move(MarkId),
    Leave(MarkId),
}

/// At most one tooltip per chart: entering a new mark replaces the content
/// in place, with no idle frame in between.
#[derive(Clone, Debug, Default)]
pub struct HoverMachine {
    state: HoverState,
}

impl HoverMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    pub fn hovered(&self) -> Option<MarkId> {
        match self.state {
            HoverState::Showing { mark, .. } => Some(mark),
            HoverState::Idle => None,
        }
    }

    pub fn enter(&mut self, mark: MarkId, content: TooltipContent, pointer: Pos2) {
        self.state = HoverState::Showing {
            mark,
            content,
            anchor: pointer + TOOLTIP_OFFSET,
        };
    }

    /// Moves the anchor; content is untouched and an idle machine stays idle.
    pub fn move_to(&mut self, pointer: Pos2) {
        if let HoverState::Showing { anchor, .. } = &mut self.state {
            *anchor = pointer + TOOLTIP_OFFSET;
        }
    }

    pub fn leave(&mut self) {
        self.state = HoverState::Idle;
    }

    /// Turns a raw pointer position into the matching transition.
    ///
    /// `suppressed` is a mark whose tooltip must not show, such as the node
    /// currently being dragged. Marks for which `content` returns `None`
    /// are treated as empty space.
    pub fn update<F>(
        &mut self,
        pointer: Option<Pos2>,
        regions: &[HitRegion],
        suppressed: Option<MarkId>,
        content: F,
    ) -> Option<HoverEvent>
    where
        F: FnOnce(MarkId) -> Option<TooltipContent>,
    {
        let hit = pointer
            .and_then(|point| hit_test(regions, point))
            .filter(|mark| Some(*mark) != suppressed);

        match (hit, pointer, self.hovered()) {
            (Some(mark), Some(point), Some(current)) if mark == current => {
                self.move_to(point);
                Some(HoverEvent::Move(mark))
            }
            (Some(mark), Some(point), previous) => match content(mark) {
                Some(text) => {
                    self.enter(mark, text, point);
                    Some(HoverEvent::Enter(mark))
                }
                None => {
                    self.leave();
                    previous.map(HoverEvent::Leave)
                }
            },
            (_, _, Some(previous)) => {
                self.leave();
                Some(HoverEvent::Leave(previous))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        node: usize,
    },
}

/// Drag-to-pin for simulation nodes; every transition is forwarded to the
/// simulation's drag protocol.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragMachine {
    state: DragState,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn dragged(&self) -> Option<usize> {
        match self.state {
            DragState::Dragging { node } => Some(node),
            DragState::Idle => None,
        }
    }

    pub fn press(&mut self, node: usize, at: Vec2, simulation: &mut Simulation) {
        if let DragState::Dragging { node: previous } = self.state {
            simulation.drag_end(previous);
        }
        simulation.drag_start(node, at);
        self.state = DragState::Dragging { node };
    }

    pub fn drag(&mut self, at: Vec2, simulation: &mut Simulation) {
        if let DragState::Dragging { node } = self.state {
            simulation.drag_move(node, at);
        }
    }

    pub fn release(&mut self, simulation: &mut Simulation) {
        if let DragState::Dragging { node } = self.state {
            simulation.drag_end(node);
        }
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{SimulationLink, SimulationSettings};
    use eframe::egui::pos2;

    fn regions() -> Vec<HitRegion> {
        vec![
            HitRegion {
                shape: HitShape::Rect(Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0))),
                mark: MarkId(0),
            },
            HitRegion {
                shape: HitShape::Circle {
                    center: pos2(50.0, 50.0),
                    radius: 10.0,
                },
                mark: MarkId(1),
            },
        ]
    }

    fn text(mark: MarkId) -> Option<TooltipContent> {
        Some(TooltipContent::new([format!("mark {}", mark.0)]))
    }

    #[test]
    fn topmost_region_wins() {
        assert_eq!(hit_test(&regions(), pos2(52.0, 50.0)), Some(MarkId(1)));
        assert_eq!(hit_test(&regions(), pos2(5.0, 5.0)), Some(MarkId(0)));
        assert_eq!(hit_test(&regions(), pos2(150.0, 5.0)), None);
    }

    #[test]
    fn polygon_holes_are_not_hits() {
        let outer = vec![pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(10.0, 10.0), pos2(0.0, 10.0)];
        let hole = vec![pos2(4.0, 4.0), pos2(6.0, 4.0), pos2(6.0, 6.0), pos2(4.0, 6.0)];
        let shape = HitShape::polygon(vec![outer, hole]);
        assert!(shape.contains(pos2(2.0, 2.0)));
        assert!(!shape.contains(pos2(5.0, 5.0)));
        assert!(!shape.contains(pos2(12.0, 5.0)));
    }

    #[test]
    fn hover_enter_move_leave() {
        let regions = regions();
        let mut hover = HoverMachine::new();

        let event = hover.update(Some(pos2(5.0, 5.0)), &regions, None, text);
        assert_eq!(event, Some(HoverEvent::Enter(MarkId(0))));
        let HoverState::Showing { anchor, content, .. } = hover.state().clone() else {
            panic!("tooltip should be visible");
        };
        assert_eq!(anchor, pos2(15.0, -23.0));
        assert_eq!(content.lines, vec!["mark 0"]);

        let event = hover.update(Some(pos2(8.0, 9.0)), &regions, None, |_| {
            panic!("content is not recomputed on move")
        });
        assert_eq!(event, Some(HoverEvent::Move(MarkId(0))));

        let event = hover.update(None, &regions, None, text);
        assert_eq!(event, Some(HoverEvent::Leave(MarkId(0))));
        assert_eq!(hover.state(), &HoverState::Idle);
        assert_eq!(hover.update(None, &regions, None, text), None);
    }

    #[test]
    fn entering_another_mark_replaces_content_directly() {
        let regions = regions();
        let mut hover = HoverMachine::new();
        hover.update(Some(pos2(5.0, 5.0)), &regions, None, text);
        let event = hover.update(Some(pos2(50.0, 50.0)), &regions, None, text);
        assert_eq!(event, Some(HoverEvent::Enter(MarkId(1))));
        assert_eq!(hover.hovered(), Some(MarkId(1)));
    }

    #[test]
    fn suppressed_mark_shows_no_tooltip() {
        let regions = regions();
        let mut hover = HoverMachine::new();
        let event = hover.update(Some(pos2(50.0, 50.0)), &regions, Some(MarkId(1)), text);
        // The rect beneath is not reached through a suppressed mark.
        assert_eq!(event, None);
        assert_eq!(hover.hovered(), None);
    }

    #[test]
    fn drag_pins_and_releases_node() {
        let mut simulation = Simulation::new(
            vec!["a".to_owned(), "b".to_owned()],
            &[SimulationLink {
                source: 0,
                target: 1,
                rest_length: None,
            }],
            SimulationSettings::default(),
        )
        .unwrap();
        let mut drag = DragMachine::new();

        drag.press(1, vec2(40.0, 0.0), &mut simulation);
        assert_eq!(drag.dragged(), Some(1));
        drag.drag(vec2(45.0, 5.0), &mut simulation);
        assert_eq!(simulation.nodes()[1].pinned, Some(vec2(45.0, 5.0)));

        drag.release(&mut simulation);
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(simulation.nodes()[1].pinned, None);
    }
}
