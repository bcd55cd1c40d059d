use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;

use super::{
    CyclistRecord, EducationRecord, GdpSeries, Hierarchy, SuitLink, TemperatureData, builtin_suits,
};
use crate::geo::Topology;

/// The data files a chart can be built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatasetFile {
    Gdp,
    Cyclists,
    Temperature,
    Education,
    Kickstarter,
    Movies,
    VideoGames,
    Suits,
}

impl DatasetFile {
    fn file_name(self) -> &'static str {
        match self {
            Self::Gdp => "GDP-data.json",
            Self::Cyclists => "cyclist-data.json",
            Self::Temperature => "global-temperature.json",
            Self::Education => "for_user_education.json",
            Self::Kickstarter => "kickstarter-funding-data.json",
            Self::Movies => "movie-data.json",
            Self::VideoGames => "video-game-sales-data.json",
            Self::Suits => "patent-suits.json",
        }
    }
}

const COUNTIES_FILE: &str = "counties.json";

#[derive(Clone, Debug)]
pub enum Dataset {
    Gdp(GdpSeries),
    Cyclists(Vec<CyclistRecord>),
    Temperature(TemperatureData),
    Education {
        topology: Topology,
        records: Vec<EducationRecord>,
    },
    Hierarchy(Hierarchy),
    Suits(Vec<SuitLink>),
}

/// Reads and parses one dataset from `data_dir`.
///
/// The patent-suit file is optional; the bundled graph stands in when it is
/// missing. Every other file must exist.
pub fn load_dataset(data_dir: &Path, file: DatasetFile) -> Result<Dataset> {
    let path = data_dir.join(file.file_name());
    let dataset = match file {
        DatasetFile::Gdp => Dataset::Gdp(read_json(&path)?),
        DatasetFile::Cyclists => Dataset::Cyclists(read_json(&path)?),
        DatasetFile::Temperature => Dataset::Temperature(read_json(&path)?),
        DatasetFile::Education => {
            let topology_path = data_dir.join(COUNTIES_FILE);
            let raw = read_text(&topology_path)?;
            let topology = Topology::from_json(&raw).with_context(|| {
                format!("failed to parse topology {}", topology_path.display())
            })?;
            Dataset::Education {
                topology,
                records: read_json(&path)?,
            }
        }
        DatasetFile::Kickstarter | DatasetFile::Movies | DatasetFile::VideoGames => {
            Dataset::Hierarchy(read_json(&path)?)
        }
        DatasetFile::Suits => {
            if path.exists() {
                let links: Vec<SuitLink> = read_json(&path)?;
                if links.is_empty() {
                    return Err(anyhow!("{} contains no links", path.display()));
                }
                Dataset::Suits(links)
            } else {
                log::info!(
                    "{} not found; using the bundled patent-suit graph",
                    path.display()
                );
                Dataset::Suits(builtin_suits())
            }
        }
    };

    log::info!("loaded {}", describe(&path, &dataset));
    Ok(dataset)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn describe(path: &Path, dataset: &Dataset) -> String {
    let size = match dataset {
        Dataset::Gdp(series) => format!("{} quarters", series.data.len()),
        Dataset::Cyclists(records) => format!("{} riders", records.len()),
        Dataset::Temperature(data) => format!("{} months", data.monthly_variance.len()),
        Dataset::Education { records, topology } => format!(
            "{} counties, {} arcs",
            records.len(),
            topology.arcs.len()
        ),
        Dataset::Hierarchy(root) => format!("{} categories", root.children.len()),
        Dataset::Suits(links) => format!("{} links", links.len()),
    };
    format!("{} ({size})", path.display())
}
