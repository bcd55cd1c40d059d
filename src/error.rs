use thiserror::Error;

/// Failures surfaced by the rendering engine.
///
/// The desktop host wraps these in `anyhow` with load context; the engine
/// itself never produces a partial scene when one of these is returned.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A scale was asked to cover an empty dataset.
    #[error("{scale} scale has an empty domain")]
    EmptyDomain { scale: &'static str },

    /// A continuous domain collapsed to a single value.
    #[error("{scale} scale domain collapsed to the single value {value}")]
    DivisionByZero { scale: &'static str, value: f64 },

    /// The topology references something that does not exist.
    #[error("malformed topology in object `{object}`{}: {reason}", region_suffix(.region))]
    MalformedTopology {
        object: String,
        region: Option<String>,
        reason: TopologyFault,
    },

    /// A configuration option is missing or out of range.
    #[error("invalid configuration `{option}`: {reason}")]
    InvalidConfig {
        option: &'static str,
        reason: String,
    },

    /// A chart was handed a dataset of the wrong shape.
    #[error("the {chart} chart cannot be built from a {dataset} dataset")]
    DatasetMismatch {
        chart: &'static str,
        dataset: &'static str,
    },
}

/// The specific defect behind [`Error::MalformedTopology`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TopologyFault {
    #[error("object is not present in the topology")]
    UnknownObject,
    #[error("arc {arc} does not exist ({available} arcs decoded)")]
    MissingArc { arc: i64, available: usize },
    #[error("arc {arc} has no points")]
    EmptyArc { arc: usize },
    #[error("point {point} of arc {arc} has fewer than two coordinates")]
    MalformedPoint { arc: usize, point: usize },
    #[error("quantization transform has a zero scale factor")]
    DegenerateTransform,
}

fn region_suffix(region: &Option<String>) -> String {
    region
        .as_ref()
        .map(|id| format!(" (region {id})"))
        .unwrap_or_default()
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
