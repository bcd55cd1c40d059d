//! Chart engine: scales, topology decoding, force layout, treemap
//! partitioning and pointer interaction, producing backend-neutral scenes.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod interaction;
pub mod palette;
pub mod physics;
pub mod scale;
pub mod scene;
pub mod treemap;
pub mod util;

pub use error::{Error, Result};
