//! Steppable force-directed layout.
//!
//! A [`Simulation`] owns its nodes and links and advances one tick per call
//! to [`Simulation::tick`]; the host drives it from its frame callback. The
//! temperature `alpha` moves toward `alpha_target` each tick and the
//! simulation settles once it drops below `alpha_min`.

mod forces;
mod quadtree;

use eframe::egui::{Pos2, Vec2, vec2};

use crate::error::{Error, Result};
use forces::{
    CollisionParams, LinkState, accumulate_charge_for_node, accumulate_collision_pairs,
    apply_centering, apply_links,
};
use quadtree::QuadNode;

/// Alpha above which an undisturbed simulation still counts as running.
const SETTLING_ALPHA: f32 = 0.1;
const INITIAL_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationSettings {
    /// Many-body strength; negative values repel.
    pub charge_strength: f32,
    pub link_distance: f32,
    /// Fraction of the gap to `alpha_target` closed each tick.
    pub alpha_decay: f32,
    /// Fraction of velocity lost each tick.
    pub velocity_decay: f32,
    pub centering_strength: f32,
    /// Node radius for collision separation; `None` disables it.
    pub collision_radius: Option<f32>,
    pub reheat_target: f32,
    pub alpha_min: f32,
    /// Barnes–Hut opening angle.
    pub theta: f32,
    pub link_shape: LinkStyle,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            charge_strength: -30.0,
            link_distance: 30.0,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            centering_strength: 0.1,
            collision_radius: None,
            reheat_target: 0.3,
            alpha_min: 0.001,
            theta: 0.9,
            link_shape: LinkStyle::Straight,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<()> {
        let unit = |option: &'static str, value: f32| {
            if value > 0.0 && value < 1.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig {
                    option,
                    reason: format!("{value} is outside (0, 1)"),
                })
            }
        };
        unit("simulation.decayRate", self.alpha_decay)?;
        unit("simulation.velocityDecay", self.velocity_decay)?;
        unit("simulation.alphaMin", self.alpha_min)?;
        unit("simulation.reheatTarget", self.reheat_target)?;

        let finite = [
            ("simulation.chargeStrength", self.charge_strength),
            ("simulation.linkDistance", self.link_distance),
            ("simulation.centeringStrength", self.centering_strength),
        ];
        for (option, value) in finite {
            if !value.is_finite() {
                return Err(Error::InvalidConfig {
                    option,
                    reason: "must be a finite number".to_owned(),
                });
            }
        }
        if self.link_distance < 0.0 {
            return Err(Error::InvalidConfig {
                option: "simulation.linkDistance",
                reason: format!("{} is negative", self.link_distance),
            });
        }
        if let Some(radius) = self.collision_radius
            && !(radius.is_finite() && radius > 0.0)
        {
            return Err(Error::InvalidConfig {
                option: "simulation.collisionRadius",
                reason: format!("{radius} is not a positive radius"),
            });
        }
        Ok(())
    }
}

/// How link geometry is reported in snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkStyle {
    #[default]
    Straight,
    /// Circular arc whose radius is the endpoint distance.
    Arc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Settled,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Freshly started, reheated or held warm by a drag.
    Running,
    /// Cooling toward `alpha_min` with no target.
    Settling,
    Stopped(StopReason),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationNode {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: Option<Vec2>,
}

/// Directed link between two node indices with its own rest length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationLink {
    pub source: usize,
    pub target: usize,
    pub rest_length: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LinkShape {
    Straight,
    Arc { radius: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkGeometry {
    pub source: Pos2,
    pub target: Pos2,
    pub shape: LinkShape,
}

/// Node positions and link geometry after one tick, in simulation
/// coordinates centred on the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct TickSnapshot {
    pub alpha: f32,
    pub phase: Phase,
    pub positions: Vec<Pos2>,
    pub links: Vec<LinkGeometry>,
}

pub struct Simulation {
    nodes: Vec<SimulationNode>,
    links: Vec<LinkState>,
    settings: SimulationSettings,
    alpha: f32,
    alpha_target: f32,
    phase: Phase,
    ticks: u64,
}

/// Sunflower placement used for new nodes and for resetting broken ones.
fn initial_position(index: usize) -> Vec2 {
    let angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let turn = index as f32 * angle;
    vec2(radius * turn.cos(), radius * turn.sin())
}

impl Simulation {
    /// Nodes are placed on a sunflower spiral around the origin. Links whose
    /// endpoints are out of range are rejected.
    pub fn new(
        ids: Vec<String>,
        links: &[SimulationLink],
        settings: SimulationSettings,
    ) -> Result<Self> {
        settings.validate()?;

        let nodes: Vec<SimulationNode> = ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| SimulationNode {
                id,
                position: initial_position(index),
                velocity: Vec2::ZERO,
                pinned: None,
            })
            .collect();

        let mut degrees = vec![0usize; nodes.len()];
        for link in links {
            if link.source >= nodes.len() || link.target >= nodes.len() {
                return Err(Error::InvalidConfig {
                    option: "links",
                    reason: format!(
                        "link {} → {} references a node outside 0..{}",
                        link.source,
                        link.target,
                        nodes.len()
                    ),
                });
            }
            degrees[link.source] += 1;
            degrees[link.target] += 1;
        }

        let links = links
            .iter()
            .map(|link| {
                LinkState::with_degrees(
                    link.source,
                    link.target,
                    link.rest_length.unwrap_or(settings.link_distance),
                    &degrees,
                )
            })
            .collect::<Vec<_>>();

        log::debug!(
            "simulation started with {} nodes and {} links",
            nodes.len(),
            links.len()
        );

        Ok(Self {
            nodes,
            links,
            settings,
            alpha: 1.0,
            alpha_target: 0.0,
            phase: Phase::Running,
            ticks: 0,
        })
    }

    pub fn nodes(&self) -> &[SimulationNode] {
        &self.nodes
    }

    pub fn settings(&self) -> SimulationSettings {
        self.settings
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.phase, Phase::Stopped(_))
    }

    /// Replaces the tunable settings of a live simulation. Link rest lengths
    /// that followed the old default follow the new one.
    pub fn update_settings(&mut self, settings: SimulationSettings) -> Result<()> {
        settings.validate()?;
        let old_distance = self.settings.link_distance;
        for link in &mut self.links {
            if link.rest_length == old_distance {
                link.rest_length = settings.link_distance;
            }
        }
        self.settings = settings;
        Ok(())
    }

    /// Sets alpha and wakes a settled simulation. Cancelled simulations stay
    /// cancelled.
    pub fn reheat(&mut self, alpha: f32) {
        if self.phase == Phase::Stopped(StopReason::Cancelled) {
            return;
        }
        self.alpha = alpha.clamp(0.0, 1.0);
        self.restart();
    }

    fn restart(&mut self) {
        if self.phase != Phase::Stopped(StopReason::Cancelled) {
            self.phase = Phase::Running;
        }
    }

    /// Cancels the simulation and releases its nodes. Calling it again has
    /// no effect.
    pub fn stop(&mut self) {
        if self.phase == Phase::Stopped(StopReason::Cancelled) {
            return;
        }
        log::debug!("simulation cancelled after {} ticks", self.ticks);
        self.phase = Phase::Stopped(StopReason::Cancelled);
        self.nodes.clear();
        self.links.clear();
    }

    pub fn drag_start(&mut self, index: usize, pointer: Vec2) {
        if self.phase == Phase::Stopped(StopReason::Cancelled) {
            return;
        }
        let Some(node) = self.nodes.get_mut(index) else {
            return;
        };
        node.pinned = Some(pointer);
        self.alpha_target = self.settings.reheat_target;
        self.restart();
    }

    pub fn drag_move(&mut self, index: usize, pointer: Vec2) {
        if let Some(node) = self.nodes.get_mut(index)
            && node.pinned.is_some()
        {
            node.pinned = Some(pointer);
        }
    }

    /// Releases the pin and lets the simulation cool. Alpha is left as is,
    /// so a stopped simulation is not reheated.
    pub fn drag_end(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = None;
        }
        self.alpha_target = 0.0;
    }

    /// Advances one tick. Returns `None` once the simulation has stopped;
    /// the tick that settles it still yields its snapshot.
    pub fn tick(&mut self) -> Option<TickSnapshot> {
        if self.is_stopped() {
            return None;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.settings.alpha_decay;
        self.reset_non_finite();
        self.apply_forces();
        self.integrate();
        self.reset_non_finite();
        self.ticks += 1;

        self.phase = if self.alpha < self.settings.alpha_min {
            log::debug!("simulation settled after {} ticks", self.ticks);
            Phase::Stopped(StopReason::Settled)
        } else if self.alpha_target > 0.0 || self.alpha >= SETTLING_ALPHA {
            Phase::Running
        } else {
            Phase::Settling
        };

        Some(self.snapshot())
    }

    /// Ticks until the simulation stops, up to `max_ticks`.
    pub fn run_to_completion(&mut self, max_ticks: usize) -> Option<TickSnapshot> {
        let mut last = None;
        for _ in 0..max_ticks {
            match self.tick() {
                Some(snapshot) => last = Some(snapshot),
                None => break,
            }
        }
        last
    }

    fn apply_forces(&mut self) {
        let positions: Vec<Vec2> = self.nodes.iter().map(|node| self.anchor(node)).collect();
        let mut velocities: Vec<Vec2> = self.nodes.iter().map(|node| node.velocity).collect();

        apply_links(&self.links, &positions, &mut velocities);

        if let Some(tree) = QuadNode::build(&positions) {
            if self.settings.charge_strength != 0.0 {
                for (index, velocity) in velocities.iter_mut().enumerate() {
                    accumulate_charge_for_node(
                        &tree,
                        index,
                        &positions,
                        self.settings.charge_strength,
                        self.settings.theta,
                        velocity,
                    );
                }
            }

            if let Some(radius) = self.settings.collision_radius {
                let params = CollisionParams {
                    radius,
                    strength: 1.0,
                };
                accumulate_collision_pairs(&tree, &tree, true, &positions, params, &mut velocities);
            }
        }

        apply_centering(&positions, &mut velocities, self.settings.centering_strength);

        for (node, velocity) in self.nodes.iter_mut().zip(velocities) {
            node.velocity = velocity;
        }
    }

    /// Where a node exerts force: its pin if pinned.
    fn anchor(&self, node: &SimulationNode) -> Vec2 {
        node.pinned.unwrap_or(node.position)
    }

    fn integrate(&mut self) {
        let keep = 1.0 - self.settings.velocity_decay;
        for node in &mut self.nodes {
            match node.pinned {
                Some(pin) => {
                    node.position = pin;
                    node.velocity = Vec2::ZERO;
                }
                None => {
                    node.velocity *= keep;
                    node.position += node.velocity * self.alpha;
                }
            }
        }
    }

    fn reset_non_finite(&mut self) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let pin_broken = node.pinned.is_some_and(|pin| !pin.is_finite());
            if node.position.is_finite() && node.velocity.is_finite() && !pin_broken {
                continue;
            }
            log::warn!(
                "node `{}` reached a non-finite state; resetting it",
                node.id
            );
            node.position = initial_position(index);
            node.velocity = Vec2::ZERO;
            if pin_broken {
                node.pinned = None;
            }
        }
    }

    pub fn snapshot(&self) -> TickSnapshot {
        let positions: Vec<Pos2> = self
            .nodes
            .iter()
            .map(|node| node.position.to_pos2())
            .collect();
        let links = self
            .links
            .iter()
            .map(|link| {
                let source = positions[link.source];
                let target = positions[link.target];
                let shape = match self.settings.link_shape {
                    LinkStyle::Straight => LinkShape::Straight,
                    LinkStyle::Arc => LinkShape::Arc {
                        radius: source.distance(target),
                    },
                };
                LinkGeometry {
                    source,
                    target,
                    shape,
                }
            })
            .collect();

        TickSnapshot {
            alpha: self.alpha,
            phase: self.phase,
            positions,
            links,
        }
    }
}
