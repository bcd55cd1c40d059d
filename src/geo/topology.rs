use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::Point;
use crate::error::{Error, Result, TopologyFault};

/// A shared-arc topology as stored on disk.
///
/// Arcs are point sequences; geometries reference them by signed index so
/// that neighbouring regions share a single copy of their common border.
/// When `transform` is present the arcs are quantized and delta-encoded.
#[derive(Clone, Debug, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub objects: BTreeMap<String, Geometry>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        #[serde(default)]
        id: Option<FeatureId>,
        arcs: Vec<Vec<i64>>,
    },
    MultiPolygon {
        #[serde(default)]
        id: Option<FeatureId>,
        arcs: Vec<Vec<Vec<i64>>>,
    },
    GeometryCollection {
        #[serde(default)]
        geometries: Vec<Geometry>,
    },
    /// Points, lines and null geometries carry no area and are skipped.
    #[serde(other)]
    Unsupported,
}

/// Region identifier; county files use numeric FIPS codes, other files
/// strings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum FeatureId {
    Int(i64),
    Text(String),
}

impl FeatureId {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One polygon with an arc-index ring list, as referenced by a region.
pub(super) type ArcRings<'a> = &'a [Vec<i64>];

/// An area geometry flattened out of an object, before its arcs are
/// dereferenced.
pub(super) struct RegionGeometry<'a> {
    pub id: Option<&'a FeatureId>,
    pub polygons: Vec<ArcRings<'a>>,
}

impl Topology {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Decodes every arc exactly once into absolute coordinates.
    pub fn decode_arcs(&self) -> Result<Vec<Vec<Point>>> {
        match self.transform {
            Some(transform) => {
                if transform.scale[0] == 0.0 || transform.scale[1] == 0.0 {
                    return Err(Error::MalformedTopology {
                        object: "transform".to_owned(),
                        region: None,
                        reason: TopologyFault::DegenerateTransform,
                    });
                }
                self.arcs
                    .iter()
                    .enumerate()
                    .map(|(index, arc)| decode_quantized(index, arc, transform))
                    .collect()
            }
            None => self
                .arcs
                .iter()
                .enumerate()
                .map(|(index, arc)| {
                    arc.iter()
                        .enumerate()
                        .map(|(point, position)| coordinate(index, point, position))
                        .collect::<Result<Vec<Point>>>()
                })
                .collect(),
        }
    }

    /// Area geometries of `object_key` in document order.
    pub(super) fn region_geometries(&self, object_key: &str) -> Result<Vec<RegionGeometry<'_>>> {
        let object = self
            .objects
            .get(object_key)
            .ok_or_else(|| Error::MalformedTopology {
                object: object_key.to_owned(),
                region: None,
                reason: TopologyFault::UnknownObject,
            })?;

        let mut regions = Vec::new();
        flatten(object, &mut regions);
        Ok(regions)
    }
}

fn flatten<'a>(geometry: &'a Geometry, out: &mut Vec<RegionGeometry<'a>>) {
    match geometry {
        Geometry::Polygon { id, arcs } => out.push(RegionGeometry {
            id: id.as_ref(),
            polygons: vec![arcs.as_slice()],
        }),
        Geometry::MultiPolygon { id, arcs } => out.push(RegionGeometry {
            id: id.as_ref(),
            polygons: arcs.iter().map(Vec::as_slice).collect(),
        }),
        Geometry::GeometryCollection { geometries } => {
            for child in geometries {
                flatten(child, out);
            }
        }
        Geometry::Unsupported => {}
    }
}

fn coordinate(arc: usize, point: usize, position: &[f64]) -> Result<Point> {
    match position {
        [x, y, ..] => Ok([*x, *y]),
        _ => Err(Error::MalformedTopology {
            object: "arcs".to_owned(),
            region: None,
            reason: TopologyFault::MalformedPoint { arc, point },
        }),
    }
}

fn decode_quantized(index: usize, arc: &[Vec<f64>], transform: Transform) -> Result<Vec<Point>> {
    let mut x = 0.0;
    let mut y = 0.0;
    arc.iter()
        .enumerate()
        .map(|(point, position)| {
            let [dx, dy] = coordinate(index, point, position)?;
            x += dx;
            y += dy;
            Ok([
                x * transform.scale[0] + transform.translate[0],
                y * transform.scale[1] + transform.translate[1],
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUANTIZED: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [2, 0.5], "translate": [100, 10]},
        "objects": {
            "shapes": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": 7, "arcs": [[0]]},
                {"type": "Point", "coordinates": [0, 0]},
                {"type": "MultiPolygon", "id": "north", "arcs": [[[0]], [[-1]]]}
            ]}
        },
        "arcs": [[[0, 0], [3, 0], [0, 4], [-3, -4]]]
    }"#;

    #[test]
    fn quantized_arcs_are_delta_decoded() {
        let topology = Topology::from_json(QUANTIZED).unwrap();
        let arcs = topology.decode_arcs().unwrap();
        assert_eq!(
            arcs[0],
            vec![[100.0, 10.0], [106.0, 10.0], [106.0, 12.0], [100.0, 10.0]]
        );
    }

    #[test]
    fn collections_flatten_and_skip_points() {
        let topology = Topology::from_json(QUANTIZED).unwrap();
        let regions = topology.region_geometries("shapes").unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id, Some(&FeatureId::Int(7)));
        assert_eq!(regions[1].id, Some(&FeatureId::Text("north".to_owned())));
        assert_eq!(regions[1].polygons.len(), 2);
    }

    #[test]
    fn unknown_object_is_malformed() {
        let topology = Topology::from_json(QUANTIZED).unwrap();
        let error = topology.region_geometries("states").err().unwrap();
        assert!(matches!(
            error,
            Error::MalformedTopology {
                reason: TopologyFault::UnknownObject,
                ..
            }
        ));
    }

    #[test]
    fn zero_scale_transform_is_rejected() {
        let text = r#"{"transform": {"scale": [0, 1], "translate": [0, 0]}, "arcs": []}"#;
        let topology = Topology::from_json(text).unwrap();
        assert!(topology.decode_arcs().is_err());
    }

    #[test]
    fn short_positions_name_the_arc_and_point() {
        let plain = r#"{"arcs": [[[0, 0], [1, 1]], [[0, 0], [3]]]}"#;
        let quantized = r#"{
            "transform": {"scale": [1, 1], "translate": [0, 0]},
            "arcs": [[[0, 0], [3], [1, 1]]]
        }"#;
        for (text, arc) in [(plain, 1), (quantized, 0)] {
            let topology = Topology::from_json(text).unwrap();
            let error = topology.decode_arcs().err().unwrap();
            assert!(
                matches!(
                    error,
                    Error::MalformedTopology {
                        reason: TopologyFault::MalformedPoint { arc: a, point: 1 },
                        ..
                    } if a == arc
                ),
                "{error}"
            );
        }
    }

    #[test]
    fn text_ids_parse_as_numbers_when_possible() {
        assert_eq!(FeatureId::Text("01001".to_owned()).as_i64(), Some(1001));
        assert_eq!(FeatureId::Int(6037).to_string(), "6037");
    }
}
