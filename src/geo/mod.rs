//! Shared-arc topology decoding and projection for map charts.

mod extract;
mod projection;
mod topology;

pub use extract::{DecodedTopology, Region, RegionRef};
pub use projection::{Equirectangular, Identity, Projection};
pub use topology::{FeatureId, Geometry, Topology, Transform};

/// `[x, y]` in topology coordinates (projected pixels or lon/lat degrees).
pub type Point = [f64; 2];

/// Closed point sequence whose last point repeats the first.
pub type Ring = Vec<Point>;
