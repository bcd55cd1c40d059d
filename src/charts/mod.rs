//! Chart assemblers: each turns one dataset plus a [`ChartConfig`] into a
//! [`Scene`] and answers tooltip queries for its marks.

pub mod bar;
pub mod choropleth;
pub mod heatmap;
pub mod network;
pub mod scatter;
pub mod treemap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use eframe::egui::Pos2;

use crate::config::ChartConfig;
use crate::data::{Dataset, DatasetFile};
use crate::error::{Error, Result};
use crate::interaction::{MarkId, TooltipContent};
use crate::physics::Simulation;
use crate::scale::{Extent, Linear, MIN_SPAN};
use crate::scene::Scene;

pub use network::NetworkChart;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreemapDataset {
    Kickstarter,
    Movies,
    VideoGames,
}

impl TreemapDataset {
    pub const ALL: [Self; 3] = [Self::Kickstarter, Self::Movies, Self::VideoGames];

    pub fn label(self) -> &'static str {
        match self {
            Self::Kickstarter => "Kickstarter Data Set",
            Self::Movies => "Movies Data Set",
            Self::VideoGames => "Video Games Data Set",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Bar,
    Scatter,
    Heatmap,
    Choropleth,
    Treemap(TreemapDataset),
    Network,
}

impl ChartKind {
    pub const ALL: [Self; 8] = [
        Self::Bar,
        Self::Scatter,
        Self::Heatmap,
        Self::Choropleth,
        Self::Treemap(TreemapDataset::Kickstarter),
        Self::Treemap(TreemapDataset::Movies),
        Self::Treemap(TreemapDataset::VideoGames),
        Self::Network,
    ];

    /// Navigation label; the three treemaps share one tab.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bar => "Bar Chart",
            Self::Scatter => "Scatter Plot",
            Self::Heatmap => "Heatmap",
            Self::Choropleth => "Choropleth Map",
            Self::Treemap(_) => "Treemap Diagram",
            Self::Network => "Force-Directed Graph",
        }
    }

    pub fn dataset_file(self) -> DatasetFile {
        match self {
            Self::Bar => DatasetFile::Gdp,
            Self::Scatter => DatasetFile::Cyclists,
            Self::Heatmap => DatasetFile::Temperature,
            Self::Choropleth => DatasetFile::Education,
            Self::Treemap(TreemapDataset::Kickstarter) => DatasetFile::Kickstarter,
            Self::Treemap(TreemapDataset::Movies) => DatasetFile::Movies,
            Self::Treemap(TreemapDataset::VideoGames) => DatasetFile::VideoGames,
            Self::Network => DatasetFile::Suits,
        }
    }
}

/// A chart the host can draw and interact with.
///
/// Static charts only implement [`ChartView::scene`] and
/// [`ChartView::tooltip`]; the network chart also runs a simulation and
/// accepts node drags.
pub trait ChartView {
    fn scene(&self) -> &Scene;

    /// Tooltip for `mark`, or `None` when the mark has nothing to show.
    fn tooltip(&self, mark: MarkId) -> Option<TooltipContent>;

    /// Bumped whenever the scene changes, so painters can drop cached
    /// tessellation.
    fn revision(&self) -> u64 {
        0
    }

    /// Advances live layout by one frame; returns whether the scene changed.
    fn tick(&mut self) -> bool {
        false
    }

    fn is_animating(&self) -> bool {
        false
    }

    /// Starts dragging `mark` if it is draggable.
    fn drag_start(&mut self, _mark: MarkId, _pointer: Pos2) -> bool {
        false
    }

    fn drag_move(&mut self, _pointer: Pos2) {}

    fn drag_end(&mut self) {}

    /// The mark being dragged, whose tooltip is suppressed.
    fn dragged(&self) -> Option<MarkId> {
        None
    }

    /// Cancels any live layout; idempotent.
    fn stop(&mut self) {}

    fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        None
    }
}

/// A chart whose scene is fixed after assembly. `marks[i]` is the datum
/// behind `MarkId(i)`.
pub struct StaticChart<T> {
    scene: Scene,
    marks: Vec<T>,
    describe: fn(&T) -> Option<TooltipContent>,
}

impl<T> StaticChart<T> {
    pub fn new(scene: Scene, marks: Vec<T>, describe: fn(&T) -> Option<TooltipContent>) -> Self {
        Self {
            scene,
            marks,
            describe,
        }
    }

    pub fn marks(&self) -> &[T] {
        &self.marks
    }
}

impl<T> ChartView for StaticChart<T> {
    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn tooltip(&self, mark: MarkId) -> Option<TooltipContent> {
        self.marks.get(mark.0).and_then(self.describe)
    }
}

/// Builds the chart for `kind` from a loaded dataset.
pub fn assemble(kind: ChartKind, dataset: &Dataset, config: &ChartConfig) -> Result<Box<dyn ChartView>> {
    config.validate()?;
    let chart: Box<dyn ChartView> = match (kind, dataset) {
        (ChartKind::Bar, Dataset::Gdp(series)) => Box::new(bar::build(series, config)?),
        (ChartKind::Scatter, Dataset::Cyclists(records)) => {
            Box::new(scatter::build(records, config)?)
        }
        (ChartKind::Heatmap, Dataset::Temperature(data)) => Box::new(heatmap::build(data, config)?),
        (ChartKind::Choropleth, Dataset::Education { topology, records }) => {
            Box::new(choropleth::build(topology, records, config)?)
        }
        (ChartKind::Treemap(which), Dataset::Hierarchy(root)) => {
            Box::new(treemap::build(which, root, config)?)
        }
        (ChartKind::Network, Dataset::Suits(links)) => Box::new(NetworkChart::new(links, config)?),
        (kind, dataset) => {
            return Err(Error::DatasetMismatch {
                chart: kind.label(),
                dataset: dataset_name(dataset),
            });
        }
    };
    log::debug!(
        "assembled {} with {} draw commands",
        kind.label(),
        chart.scene().commands().len()
    );
    Ok(chart)
}

/// Value extent from the data, unless the configuration overrides it.
pub(crate) fn value_extent<I>(config: &ChartConfig, values: I, scale: &'static str) -> Result<Extent>
where
    I: IntoIterator<Item = f64>,
{
    match config.domain_override {
        Some([low, high]) => Ok(Extent::new(low, high)),
        None => Extent::from_values(values, scale),
    }
}

/// Linear scale over `domain`, widened to [`MIN_SPAN`] when it collapses.
pub(crate) fn padded_linear(domain: [f64; 2], range: [f64; 2]) -> Result<Linear> {
    match Linear::new(domain, range) {
        Err(Error::DivisionByZero { value, .. }) => {
            Linear::from_extent(Extent::new(value, value).padded(MIN_SPAN), range)
        }
        other => other,
    }
}

/// Midnight-to-midnight domain for a time axis; a single day is widened to
/// one day so the scale stays invertible.
pub(crate) fn day_domain(start: NaiveDate, end: NaiveDate) -> [NaiveDateTime; 2] {
    let start = start.and_time(NaiveTime::MIN);
    let mut end = end.and_time(NaiveTime::MIN);
    if start == end {
        log::warn!("time axis covers a single day; widening it");
        end += TimeDelta::days(1);
    }
    [start, end]
}

fn dataset_name(dataset: &Dataset) -> &'static str {
    match dataset {
        Dataset::Gdp(_) => "GDP",
        Dataset::Cyclists(_) => "cyclist",
        Dataset::Temperature(_) => "temperature",
        Dataset::Education { .. } => "education",
        Dataset::Hierarchy(_) => "hierarchy",
        Dataset::Suits(_) => "patent-suit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_suits;

    #[test]
    fn every_chart_has_a_dataset_file() {
        let mut files: Vec<_> = ChartKind::ALL.iter().map(|kind| kind.dataset_file()).collect();
        files.dedup();
        assert_eq!(files.len(), ChartKind::ALL.len());
    }

    #[test]
    fn mismatched_dataset_is_rejected() {
        let dataset = Dataset::Suits(builtin_suits());
        let error = assemble(ChartKind::Bar, &dataset, &ChartConfig::defaults(ChartKind::Bar))
            .err()
            .unwrap();
        assert_eq!(
            error,
            Error::DatasetMismatch {
                chart: "Bar Chart",
                dataset: "patent-suit"
            }
        );
    }
}
