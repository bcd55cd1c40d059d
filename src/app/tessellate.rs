//! Ear-clipping triangulation for filled polygons with holes.
//!
//! egui only fills convex paths, so county outlines are cut into triangles
//! once and kept as a mesh until the scene changes.

use eframe::egui::epaint::{Mesh, Vertex, WHITE_UV};
use eframe::egui::{Color32, Pos2};

const EPSILON: f32 = 1e-6;

/// Appends the even-odd interior of `rings` to `mesh`.
pub(super) fn fill_rings(mesh: &mut Mesh, rings: &[Vec<Pos2>], color: Color32) {
    let rings: Vec<Vec<Pos2>> = rings.iter().filter_map(|ring| clean_ring(ring)).collect();

    let depths: Vec<usize> = rings
        .iter()
        .enumerate()
        .map(|(index, ring)| {
            rings
                .iter()
                .enumerate()
                .filter(|(other, outer)| *other != index && ring_contains(outer, ring[0]))
                .count()
        })
        .collect();

    for (index, outer) in rings.iter().enumerate() {
        if depths[index] % 2 == 1 {
            continue;
        }
        let holes: Vec<&Vec<Pos2>> = rings
            .iter()
            .enumerate()
            .filter(|(hole, ring)| {
                depths[*hole] == depths[index] + 1 && ring_contains(outer, ring[0])
            })
            .map(|(_, ring)| ring)
            .collect();

        let outline = bridge_holes(outer, &holes);
        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend(outline.iter().map(|&pos| Vertex {
            pos,
            uv: WHITE_UV,
            color,
        }));
        for [a, b, c] in ear_clip(&outline) {
            mesh.indices
                .extend_from_slice(&[base + a as u32, base + b as u32, base + c as u32]);
        }
    }
}

/// Drops the repeated closing point and consecutive duplicates.
fn clean_ring(ring: &[Pos2]) -> Option<Vec<Pos2>> {
    let mut points: Vec<Pos2> = Vec::with_capacity(ring.len());
    for &point in ring {
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    (points.len() >= 3 && signed_area(&points).abs() > EPSILON).then_some(points)
}

fn signed_area(points: &[Pos2]) -> f32 {
    let mut twice = 0.0;
    for (index, a) in points.iter().enumerate() {
        let b = points[(index + 1) % points.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice * 0.5
}

fn cross(a: Pos2, b: Pos2, c: Pos2) -> f32 {
    (b - a).x * (c - b).y - (b - a).y * (c - b).x
}

fn ring_contains(ring: &[Pos2], point: Pos2) -> bool {
    let mut inside = false;
    let mut previous = ring[ring.len() - 1];
    for &current in ring {
        if (current.y > point.y) != (previous.y > point.y) {
            let t = (point.y - current.y) / (previous.y - current.y);
            if point.x < current.x + t * (previous.x - current.x) {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// Segments `a-b` and `c-d` cross at a point interior to both.
fn segments_cross(a: Pos2, b: Pos2, c: Pos2, d: Pos2) -> bool {
    let side = |p: Pos2, q: Pos2, r: Pos2| (q - p).x * (r - p).y - (q - p).y * (r - p).x;
    let (d1, d2) = (side(a, b, c), side(a, b, d));
    let (d3, d4) = (side(c, d, a), side(c, d, b));
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

fn edges(ring: &[Pos2]) -> impl Iterator<Item = (Pos2, Pos2)> + '_ {
    ring.iter()
        .enumerate()
        .map(|(index, &a)| (a, ring[(index + 1) % ring.len()]))
}

/// Splices each hole into the outer ring through a visible bridge, giving
/// one counter-clockwise outline.
fn bridge_holes(outer: &[Pos2], holes: &[&Vec<Pos2>]) -> Vec<Pos2> {
    let mut outline = outer.to_vec();
    if signed_area(&outline) < 0.0 {
        outline.reverse();
    }

    let mut holes: Vec<Vec<Pos2>> = holes
        .iter()
        .map(|hole| {
            let mut hole = hole.to_vec();
            if signed_area(&hole) > 0.0 {
                hole.reverse();
            }
            hole
        })
        .collect();
    // Rightmost holes first, so later bridges cannot cut through them.
    holes.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));

    for (index, hole) in holes.iter().enumerate() {
        let Some(start) = (0..hole.len()).max_by(|&a, &b| hole[a].x.total_cmp(&hole[b].x)) else {
            continue;
        };
        let from = hole[start];

        let visible = |to: Pos2| {
            edges(&outline)
                .chain(holes[index..].iter().flat_map(|ring| edges(ring)))
                .all(|(a, b)| !segments_cross(from, to, a, b))
        };
        let mut candidates: Vec<usize> = (0..outline.len()).collect();
        candidates.sort_by(|&a, &b| {
            from.distance_sq(outline[a])
                .total_cmp(&from.distance_sq(outline[b]))
        });
        let Some(&target) = candidates
            .iter()
            .find(|&&candidate| visible(outline[candidate]))
            .or(candidates.first())
        else {
            continue;
        };

        let mut spliced = Vec::with_capacity(outline.len() + hole.len() + 2);
        spliced.extend_from_slice(&outline[..=target]);
        spliced.extend_from_slice(&hole[start..]);
        spliced.extend_from_slice(&hole[..=start]);
        spliced.extend_from_slice(&outline[target..]);
        outline = spliced;
    }
    outline
}

fn max_x(ring: &[Pos2]) -> f32 {
    ring.iter().map(|point| point.x).fold(f32::NEG_INFINITY, f32::max)
}

/// Triangles as indices into `points`, which must wind counter-clockwise
/// in the sense of [`signed_area`].
fn ear_clip(points: &[Pos2]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len().saturating_sub(2));
    let corners = |remaining: &[usize], at: usize| {
        let count = remaining.len();
        [
            remaining[(at + count - 1) % count],
            remaining[at],
            remaining[(at + 1) % count],
        ]
    };
    let is_ear = |remaining: &[usize], at: usize| {
        let [a, b, c] = corners(remaining, at);
        let (pa, pb, pc) = (points[a], points[b], points[c]);
        cross(pa, pb, pc) > EPSILON
            && remaining
                .iter()
                .filter(|&&other| other != a && other != b && other != c)
                .all(|&other| !inside_triangle(pa, pb, pc, points[other]))
    };

    let mut cursor = 0;
    while remaining.len() > 3 {
        let count = remaining.len();
        cursor %= count;
        let ear = (cursor..count)
            .chain(0..cursor)
            .find(|&at| is_ear(&remaining, at));
        match ear {
            Some(at) => {
                triangles.push(corners(&remaining, at));
                remaining.remove(at);
                cursor = at;
            }
            None => {
                // Stuck on degenerate input: drop a flat vertex, else force
                // the next triangle.
                let flat = (0..count).find(|&at| {
                    let [a, b, c] = corners(&remaining, at);
                    cross(points[a], points[b], points[c]).abs() <= EPSILON
                });
                match flat {
                    Some(at) => {
                        remaining.remove(at);
                    }
                    None => {
                        triangles.push(corners(&remaining, cursor));
                        remaining.remove(cursor);
                    }
                }
            }
        }
    }

    if let [a, b, c] = remaining[..]
        && cross(points[a], points[b], points[c]) > EPSILON
    {
        triangles.push([a, b, c]);
    }
    triangles
}

fn inside_triangle(a: Pos2, b: Pos2, c: Pos2, point: Pos2) -> bool {
    cross(a, b, point) > 0.0 && cross(b, c, point) > 0.0 && cross(c, a, point) > 0.0
}
