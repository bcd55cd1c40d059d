mod app;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chartwork::charts::network::MAX_SETTLE_TICKS;
use chartwork::charts::{ChartKind, ChartView, NetworkChart, TreemapDataset, assemble};
use chartwork::config::ConfigFile;
use chartwork::data::{Dataset, load_dataset};
use chartwork::scene::to_svg;
use clap::{Parser, ValueEnum};
use env_logger::Env;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the JSON datasets.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Chart shown first, or rendered with `--export-svg`.
    #[arg(long, value_enum, default_value_t = ChartArg::Bar)]
    chart: ChartArg,

    /// JSON file with per-chart overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render the chart to this SVG file instead of opening a window.
    #[arg(long)]
    export_svg: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ChartArg {
    Bar,
    Scatter,
    Heatmap,
    Choropleth,
    Kickstarter,
    Movies,
    VideoGames,
    Network,
}

impl ChartArg {
    fn kind(self) -> ChartKind {
        match self {
            Self::Bar => ChartKind::Bar,
            Self::Scatter => ChartKind::Scatter,
            Self::Heatmap => ChartKind::Heatmap,
            Self::Choropleth => ChartKind::Choropleth,
            Self::Kickstarter => ChartKind::Treemap(TreemapDataset::Kickstarter),
            Self::Movies => ChartKind::Treemap(TreemapDataset::Movies),
            Self::VideoGames => ChartKind::Treemap(TreemapDataset::VideoGames),
            Self::Network => ChartKind::Network,
        }
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<ConfigFile> {
    let Some(path) = path else {
        return Ok(ConfigFile::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    ConfigFile::from_json(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

/// Builds `kind` without a window and writes it as SVG. The network layout
/// is run until it settles first.
fn export_svg(data_dir: &Path, kind: ChartKind, config: &ConfigFile, path: &Path) -> anyhow::Result<()> {
    let dataset = load_dataset(data_dir, kind.dataset_file())?;
    let chart_config = config
        .resolve(kind)
        .with_context(|| format!("invalid configuration for {}", kind.label()))?;

    let scene = match &dataset {
        Dataset::Suits(links) if kind == ChartKind::Network => {
            chart_config.validate()?;
            let mut chart = NetworkChart::new(links, &chart_config)?;
            chart.settle(MAX_SETTLE_TICKS);
            chart.scene().clone()
        }
        _ => assemble(kind, &dataset, &chart_config)
            .with_context(|| format!("failed to build {}", kind.label()))?
            .scene()
            .clone(),
    };

    fs::write(path, to_svg(&scene))
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote {} to {}", kind.label(), path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = read_config(args.config.as_deref())?;
    let kind = args.chart.kind();

    if let Some(path) = &args.export_svg {
        return export_svg(&args.data_dir, kind, &config, path);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "chartwork",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ChartworkApp::new(
                cc,
                args.data_dir.clone(),
                config.clone(),
                kind,
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to open the window: {error}"))
}
