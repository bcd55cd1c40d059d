use eframe::egui::{Color32, Rect, pos2, vec2};

use super::{StaticChart, value_extent};
use crate::config::ChartConfig;
use crate::data::TemperatureData;
use crate::error::{Error, Result};
use crate::interaction::{HitShape, MarkId, TooltipContent};
use crate::palette::Gradient;
use crate::scale::{Band, Extent, MIN_SPAN, Sequential};
use crate::scene::axis::{self, Orientation};
use crate::scene::legend::{BinLegend, LegendEntry};
use crate::scene::{Scene, Shape, Style};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const LEGEND_BIN: f32 = 40.0;
const LEGEND_HEIGHT: f32 = 20.0;
const LEGEND_TEXT: Color32 = Color32::from_gray(0xaa);

/// One month of one year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub year: i32,
    /// 0-based.
    pub month: u32,
    /// Absolute temperature, rounded to hundredths.
    pub temperature: f64,
    pub variance: f64,
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Monthly temperatures as a year × month grid.
pub fn build(data: &TemperatureData, config: &ChartConfig) -> Result<StaticChart<Cell>> {
    let cells: Vec<Cell> = data
        .monthly_variance
        .iter()
        .filter_map(|entry| {
            if !(1..=12).contains(&entry.month) {
                log::warn!("skipping {} with month {}", entry.year, entry.month);
                return None;
            }
            Some(Cell {
                year: entry.year,
                month: entry.month - 1,
                temperature: round_hundredths(data.base_temperature + entry.variance),
                variance: entry.variance,
            })
        })
        .collect();
    if cells.is_empty() {
        return Err(Error::EmptyDomain { scale: "band" });
    }

    let mut years: Vec<i32> = cells.iter().map(|cell| cell.year).collect();
    years.sort_unstable();
    years.dedup();
    let mut months: Vec<u32> = cells.iter().map(|cell| cell.month).collect();
    months.sort_unstable_by(|a, b| b.cmp(a));
    months.dedup();

    let width = config
        .width
        .unwrap_or(cells.len() as f32 / 2.0 * 1.05);
    if width <= config.margins.left + config.margins.right {
        return Err(Error::InvalidConfig {
            option: "width",
            reason: format!("{width} leaves no room between the margins"),
        });
    }
    let height = config.height;
    let inner = config.inner(width);
    let x_range = [f64::from(inner.left()), f64::from(inner.right())];
    let y_range = [f64::from(inner.bottom()), f64::from(inner.top())];

    let padding = config.padding_fraction;
    let x = Band::new(years.iter().copied(), x_range, padding)?;
    let y = Band::new(months.iter().copied(), y_range, padding)?;

    let extent = value_extent(config, cells.iter().map(|cell| cell.temperature), "sequential")?
        .padded(MIN_SPAN);
    let gradient = match &config.color_palette {
        Some(palette) => Gradient::new(palette.clone())?,
        None => Gradient::red_yellow_blue(),
    };
    // Hot values take the red end.
    let colors = Sequential::new(extent.reversed(), gradient)?;

    let (first, last) = (years[0], years[years.len() - 1]);
    let mut scene = Scene::new(width, height).with_heading(
        "Monthly Global Land-Surface Temperature",
        Some(format!(
            "{first} - {last}: base temperature {}°C",
            data.base_temperature
        )),
    );

    axis::draw_axis(
        &mut scene,
        Orientation::Bottom,
        inner.bottom(),
        x_range,
        &axis::band_ticks(
            &x,
            years.iter().copied().filter(|year| year % 10 == 0),
            |year| year.to_string(),
        ),
    );
    axis::draw_axis(
        &mut scene,
        Orientation::Left,
        inner.left(),
        y_range,
        &axis::band_ticks(&y, months.iter().copied(), |month| {
            MONTHS[*month as usize].to_owned()
        }),
    );

    let size = vec2(x.bandwidth() as f32, y.bandwidth() as f32);
    for (index, cell) in cells.iter().enumerate() {
        let (Some(left), Some(top)) = (x.scale(&cell.year), y.scale(&cell.month)) else {
            continue;
        };
        let rect = Rect::from_min_size(pos2(left as f32, top as f32), size);
        scene.push_mark(
            MarkId(index),
            Shape::Rect(rect),
            Style::fill(colors.scale(cell.temperature)),
            HitShape::Rect(rect),
        );
    }

    draw_legend(&mut scene, config, &colors, extent, height);

    log::debug!(
        "heatmap: {} cells over {} years",
        cells.len(),
        years.len()
    );
    Ok(StaticChart::new(scene, cells, describe))
}

/// Evenly spaced temperatures from coldest to hottest, each labelled with
/// its lower bound.
fn draw_legend(
    scene: &mut Scene,
    config: &ChartConfig,
    colors: &Sequential,
    extent: Extent,
    height: f32,
) {
    let count = config.legend_bucket_count;
    let entries: Vec<LegendEntry> = (0..count)
        .map(|index| {
            let fraction = if count > 1 {
                index as f64 / (count - 1) as f64
            } else {
                0.0
            };
            let value = round_hundredths(extent.min + extent.span() * fraction);
            LegendEntry::new(format!("≥ {value}"), colors.scale(value))
        })
        .collect();

    let legend = BinLegend {
        origin: pos2(config.margins.left, height - 2.0 * LEGEND_HEIGHT),
        bin: vec2(LEGEND_BIN, LEGEND_HEIGHT),
        label_offset: vec2(0.0, LEGEND_HEIGHT * 1.5),
        font_size: 9.0,
        label_color: LEGEND_TEXT,
    };
    legend.draw(scene, &entries);
}

fn describe(cell: &Cell) -> Option<TooltipContent> {
    let month = MONTHS.get(cell.month as usize)?;
    let sign = if cell.variance > 0.0 { "+" } else { "" };
    Some(TooltipContent::new([
        format!("{} {}", month.to_uppercase(), cell.year),
        format!("{} °C", cell.temperature),
        format!("{sign}{} °C", round_hundredths(cell.variance)),
    ]))
}
