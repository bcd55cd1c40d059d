use std::collections::BTreeMap;

use super::topology::{FeatureId, RegionGeometry, Topology};
use super::{Point, Ring};
use crate::error::{Error, Result, TopologyFault};

/// A closed area: one or more polygons, each an exterior ring followed by
/// its holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub id: Option<FeatureId>,
    pub polygons: Vec<Vec<Ring>>,
}

/// Identity of a region as seen by a mesh predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionRef<'a> {
    /// Position of the region within its object.
    pub index: usize,
    pub id: Option<&'a FeatureId>,
}

/// Topology with its arcs decoded once, ready for any number of region and
/// mesh extractions.
#[derive(Clone, Debug)]
pub struct DecodedTopology {
    topology: Topology,
    arcs: Vec<Vec<Point>>,
}

impl DecodedTopology {
    pub fn new(topology: Topology) -> Result<Self> {
        let arcs = topology.decode_arcs()?;
        log::debug!("decoded {} topology arcs", arcs.len());
        Ok(Self { topology, arcs })
    }

    pub fn arcs(&self) -> &[Vec<Point>] {
        &self.arcs
    }

    /// Rebuilds every area geometry of `object_key` as closed rings.
    ///
    /// Arcs are concatenated in listed order; a negative index `i` stands for
    /// arc `!i` traversed backwards, and the junction point shared by
    /// consecutive arcs is kept once.
    pub fn extract_regions(&self, object_key: &str) -> Result<Vec<Region>> {
        let geometries = self.topology.region_geometries(object_key)?;
        geometries
            .iter()
            .enumerate()
            .map(|(index, geometry)| self.build_region(object_key, index, geometry))
            .collect()
    }

    fn build_region(
        &self,
        object_key: &str,
        index: usize,
        geometry: &RegionGeometry<'_>,
    ) -> Result<Region> {
        let polygons = geometry
            .polygons
            .iter()
            .map(|rings| {
                rings
                    .iter()
                    .map(|ring| self.build_ring(ring))
                    .collect::<Result<Vec<Ring>, TopologyFault>>()
            })
            .collect::<Result<Vec<_>, TopologyFault>>()
            .map_err(|reason| Error::MalformedTopology {
                object: object_key.to_owned(),
                region: Some(region_label(index, geometry.id)),
                reason,
            })?;

        Ok(Region {
            id: geometry.id.cloned(),
            polygons,
        })
    }

    fn build_ring(&self, arc_indices: &[i64]) -> Result<Ring, TopologyFault> {
        let mut ring: Ring = Vec::new();
        for &signed in arc_indices {
            let arc = self.arc(signed)?;
            ring.pop();
            if signed < 0 {
                ring.extend(arc.iter().rev());
            } else {
                ring.extend(arc.iter());
            }
        }
        Ok(ring)
    }

    fn arc(&self, signed: i64) -> Result<&[Point], TopologyFault> {
        let index = if signed < 0 { !signed } else { signed };
        let arc = usize::try_from(index)
            .ok()
            .and_then(|index| self.arcs.get(index))
            .ok_or(TopologyFault::MissingArc {
                arc: index,
                available: self.arcs.len(),
            })?;
        if arc.is_empty() {
            return Err(TopologyFault::EmptyArc {
                arc: index as usize,
            });
        }
        Ok(arc)
    }

    /// Border lines of `object_key` selected by `predicate`.
    ///
    /// An arc shared by regions `a` and `b` is kept when `predicate(a, b)`
    /// holds; an arc on the boundary of a single region `a` is kept when
    /// `predicate(a, a)` holds. Each arc appears at most once, in ascending
    /// arc order. Arcs shared by more than two regions are not borders of a
    /// planar partition and are skipped.
    pub fn extract_mesh<F>(&self, object_key: &str, mut predicate: F) -> Result<Vec<Vec<Point>>>
    where
        F: FnMut(RegionRef<'_>, RegionRef<'_>) -> bool,
    {
        let geometries = self.topology.region_geometries(object_key)?;

        let mut owners: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (region, geometry) in geometries.iter().enumerate() {
            for &signed in geometry.polygons.iter().flat_map(|rings| rings.iter()).flatten() {
                let arc = if signed < 0 { !signed } else { signed };
                let arc = usize::try_from(arc)
                    .ok()
                    .filter(|&arc| arc < self.arcs.len())
                    .ok_or_else(|| Error::MalformedTopology {
                        object: object_key.to_owned(),
                        region: Some(region_label(region, geometry.id)),
                        reason: TopologyFault::MissingArc {
                            arc,
                            available: self.arcs.len(),
                        },
                    })?;
                let list = owners.entry(arc).or_default();
                if !list.contains(&region) {
                    list.push(region);
                }
            }
        }

        let reference = |index: usize| RegionRef {
            index,
            id: geometries[index].id,
        };

        let mut lines = Vec::new();
        let mut skipped = 0usize;
        for (arc, regions) in owners {
            let keep = match regions.as_slice() {
                [only] => predicate(reference(*only), reference(*only)),
                [a, b] => predicate(reference(*a), reference(*b)),
                _ => {
                    skipped += 1;
                    false
                }
            };
            if keep && !self.arcs[arc].is_empty() {
                lines.push(self.arcs[arc].clone());
            }
        }

        if skipped > 0 {
            log::debug!("mesh of `{object_key}` skipped {skipped} arcs with more than two owners");
        }
        Ok(lines)
    }
}

fn region_label(index: usize, id: Option<&FeatureId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => format!("#{index}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two unit squares side by side sharing arc 1 (the vertical edge x = 1).
    //
    //   arc 0: (1,0) → (0,0) → (0,1) → (1,1)   left square outline
    //   arc 1: (1,1) → (1,0)                   shared edge
    //   arc 2: (1,1) → (2,1) → (2,0) → (1,0)   right square outline
    const SQUARES: &str = r#"{
        "type": "Topology",
        "objects": {
            "cells": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": "left", "arcs": [[0, 1]]},
                {"type": "Polygon", "id": "right", "arcs": [[2, -2]]}
            ]}
        },
        "arcs": [
            [[1, 0], [0, 0], [0, 1], [1, 1]],
            [[1, 1], [1, 0]],
            [[1, 1], [2, 1], [2, 0], [1, 0]]
        ]
    }"#;

    fn squares() -> DecodedTopology {
        DecodedTopology::new(Topology::from_json(SQUARES).unwrap()).unwrap()
    }

    #[test]
    fn rings_drop_junction_points_and_close() {
        let regions = squares().extract_regions("cells").unwrap();
        assert_eq!(regions.len(), 2);

        let left = &regions[0].polygons[0][0];
        assert_eq!(
            left,
            &vec![[1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]
        );

        let right = &regions[1].polygons[0][0];
        assert_eq!(
            right,
            &vec![[1.0, 1.0], [2.0, 1.0], [2.0, 0.0], [1.0, 0.0], [1.0, 1.0]]
        );
    }

    #[test]
    fn interior_mesh_contains_only_shared_arc() {
        let mesh = squares().extract_mesh("cells", |a, b| a.index != b.index).unwrap();
        assert_eq!(mesh, vec![vec![[1.0, 1.0], [1.0, 0.0]]]);
    }

    #[test]
    fn exterior_mesh_contains_single_owner_arcs() {
        let mesh = squares().extract_mesh("cells", |a, b| a == b).unwrap();
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh[0][0], [1.0, 0.0]);
        assert_eq!(mesh[1][1], [2.0, 1.0]);
    }

    #[test]
    fn predicate_sees_region_ids() {
        let mut seen = Vec::new();
        squares()
            .extract_mesh("cells", |a, b| {
                seen.push((a.id.cloned(), b.id.cloned()));
                true
            })
            .unwrap();
        assert!(seen.contains(&(
            Some(FeatureId::Text("left".to_owned())),
            Some(FeatureId::Text("right".to_owned()))
        )));
    }

    #[test]
    fn missing_arc_names_object_region_and_arc() {
        let text = SQUARES.replace("[[2, -2]]", "[[2, -9]]");
        let topology = DecodedTopology::new(Topology::from_json(&text).unwrap()).unwrap();
        let error = topology.extract_regions("cells").unwrap_err();
        assert_eq!(
            error,
            Error::MalformedTopology {
                object: "cells".to_owned(),
                region: Some("right".to_owned()),
                reason: TopologyFault::MissingArc {
                    arc: 8,
                    available: 3
                },
            }
        );
    }

    #[test]
    fn empty_arc_is_malformed() {
        let text = SQUARES.replace("[[1, 1], [1, 0]],", "[],");
        let topology = DecodedTopology::new(Topology::from_json(&text).unwrap()).unwrap();
        let error = topology.extract_regions("cells").unwrap_err();
        assert!(matches!(
            error,
            Error::MalformedTopology {
                reason: TopologyFault::EmptyArc { arc: 1 },
                ..
            }
        ));
    }
}
