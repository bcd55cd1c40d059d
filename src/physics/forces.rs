use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

/// Squared distances are floored here so coincident nodes cannot produce
/// unbounded forces.
const MIN_DISTANCE_SQ: f32 = 1.0;

/// Unit direction for a pair of nodes that sit on top of each other.
fn jitter_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Many-body force on a node at `point` from a charge at `other`.
///
/// Falls off as `delta / |delta|²`; negative strengths push apart.
fn charge_between(point: Vec2, other: Vec2, strength: f32, mass: f32, jitter: Vec2) -> Vec2 {
    let mut delta = other - point;
    if delta.length_sq() == 0.0 {
        delta = jitter;
    }
    let distance_sq = delta.length_sq().max(MIN_DISTANCE_SQ);
    delta * (strength * mass / distance_sq)
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *force += charge_between(
                point,
                positions[other_index],
                strength,
                1.0,
                jitter_direction(index, other_index),
            );
        }
        return;
    }

    let distance = (node.center_of_mass - point).length().max(MIN_DISTANCE_SQ.sqrt());
    let can_approximate =
        !node.bounds.contains(point) && (node.bounds.side_length() / distance) < theta;

    if can_approximate {
        *force += charge_between(
            point,
            node.center_of_mass,
            strength,
            node.mass,
            Vec2::X,
        );
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge_for_node(child, index, positions, strength, theta, force);
    }
}

/// Spring toward the rest length for every link.
///
/// Reads position plus current velocity so springs act on where the nodes
/// are heading. A link's stiffness is `1 / min(degree)` and the correction
/// is split by the endpoints' degrees, so hubs move less than leaves.
pub(super) fn apply_links(
    links: &[LinkState],
    positions: &[Vec2],
    velocities: &mut [Vec2],
) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target {
            continue;
        }

        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta.length_sq() == 0.0 {
            delta = jitter_direction(source, target) * 1e-3;
        }
        let length = delta.length();
        let correction = delta * ((length - link.rest_length) / length * link.strength);

        velocities[target] -= correction * link.bias;
        velocities[source] += correction * (1.0 - link.bias);
    }
}

/// Per-link constants derived from node degrees once per simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct LinkState {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) rest_length: f32,
    pub(super) strength: f32,
    pub(super) bias: f32,
}

impl LinkState {
    pub(super) fn with_degrees(
        source: usize,
        target: usize,
        rest_length: f32,
        degrees: &[usize],
    ) -> Self {
        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        Self {
            source,
            target,
            rest_length,
            strength: 1.0 / source_degree.min(target_degree),
            bias: source_degree / (source_degree + target_degree),
        }
    }
}

/// Pulls each node toward the origin along both axes.
pub(super) fn apply_centering(positions: &[Vec2], velocities: &mut [Vec2], strength: f32) {
    if strength == 0.0 {
        return;
    }
    for (position, velocity) in positions.iter().zip(velocities.iter_mut()) {
        *velocity -= *position * strength;
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct CollisionParams {
    pub(super) radius: f32,
    pub(super) strength: f32,
}

/// Pushes apart every pair of nodes closer than two radii, walking the
/// quadtree so that distant cells are skipped wholesale.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    let min_distance = params.radius * 2.0;
    if node_a.bounds.distance_sq_to(node_b.bounds) > min_distance * min_distance {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        let mut separate = |from: usize, to: usize| {
            let delta = positions[from] - positions[to];
            let distance = delta.length();
            if distance >= min_distance {
                return;
            }
            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                jitter_direction(from, to)
            };
            let push = direction * ((min_distance - distance) * 0.5 * params.strength);
            forces[from] += push;
            forces[to] -= push;
        };

        if same_node {
            for (i, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[i + 1..] {
                    separate(from, to);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    separate(from, to);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, params, forces);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_collision_pairs(child_a, child_b, false, positions, params, forces);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, params, forces);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, params, forces);
        }
    }
}
