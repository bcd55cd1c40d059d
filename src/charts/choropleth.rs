use std::collections::HashMap;

use eframe::egui::{Color32, vec2};

use super::{StaticChart, value_extent};
use crate::config::ChartConfig;
use crate::data::EducationRecord;
use crate::error::Result;
use crate::geo::{DecodedTopology, Identity, Projection, Topology};
use crate::interaction::{HitShape, MarkId, TooltipContent};
use crate::palette::Gradient;
use crate::scale::{MIN_SPAN, Quantize};
use crate::scene::legend::{BinLegend, LegendEntry};
use crate::scene::{Layer, Scene, Shape, Style};
use crate::util::format_percent;

const COUNTIES: &str = "counties";
const STATES: &str = "states";
const MISSING: Color32 = Color32::from_gray(0xcc);
const LEGEND_ORIGIN: [f32; 2] = [400.0, 10.0];

/// A county and its education record, if one matched its FIPS code.
#[derive(Clone, Debug, PartialEq)]
pub struct County {
    pub fips: Option<i64>,
    pub record: Option<EducationRecord>,
}

/// Counties filled by the share of adults holding a degree, with state
/// borders drawn on top.
pub fn build(
    topology: &Topology,
    records: &[EducationRecord],
    config: &ChartConfig,
) -> Result<StaticChart<County>> {
    let decoded = DecodedTopology::new(topology.clone())?;
    let regions = decoded.extract_regions(COUNTIES)?;
    let borders = decoded.extract_mesh(STATES, |a, b| a != b)?;

    let by_fips: HashMap<i64, &EducationRecord> =
        records.iter().map(|record| (record.fips, record)).collect();

    let extent = value_extent(
        config,
        records.iter().map(|record| record.bachelors_or_higher),
        "quantize",
    )?
    .padded(MIN_SPAN);
    let gradient = match &config.color_palette {
        Some(palette) => Gradient::new(palette.clone())?,
        None => Gradient::greens(),
    };
    let colors = Quantize::new(
        extent.as_array(),
        gradient.scheme(config.legend_bucket_count),
    )?;

    let width = config.width();
    let mut scene = Scene::new(width, config.height).with_heading(
        "United States Educational Attainment",
        Some(
            "Percentage of adults age 25 and older with a bachelor's degree or higher (2010-2014)"
                .to_owned(),
        ),
    );

    let plot = config.inner(width);
    let projection = Identity {
        offset: plot.min.to_vec2(),
    };
    let mut counties = Vec::with_capacity(regions.len());
    let mut unmatched = 0usize;
    for (index, region) in regions.iter().enumerate() {
        let fips = region.id.as_ref().and_then(|id| id.as_i64());
        let record = fips.and_then(|fips| by_fips.get(&fips).copied());
        let fill = match record {
            Some(record) => colors.scale(record.bachelors_or_higher),
            None => {
                unmatched += 1;
                MISSING
            }
        };

        let rings: Vec<_> = projection.project_region(region).into_iter().flatten().collect();
        scene.push_mark(
            MarkId(index),
            Shape::Polygon {
                rings: rings.clone(),
            },
            Style::fill(fill),
            HitShape::polygon(rings),
        );
        counties.push(County {
            fips,
            record: record.cloned(),
        });
    }
    if unmatched > 0 {
        log::warn!("{unmatched} counties have no education record");
    }

    for line in &borders {
        scene.push(
            Layer::Axes,
            Shape::Path {
                points: projection.project_ring(line),
                closed: false,
            },
            Style::stroke(1.0, Color32::WHITE),
        );
    }

    let entries: Vec<LegendEntry> = colors
        .colors()
        .iter()
        .enumerate()
        .map(|(index, color)| {
            let (lo, hi) = colors.bucket_extent(index);
            LegendEntry::new(
                format!(
                    "{} - {}",
                    format_percent(lo / 100.0, 0),
                    format_percent(hi / 100.0, 0)
                ),
                *color,
            )
        })
        .collect();
    BinLegend {
        origin: plot.min + vec2(LEGEND_ORIGIN[0], LEGEND_ORIGIN[1]),
        bin: vec2(70.0, 15.0),
        label_offset: vec2(14.0, 25.0),
        font_size: 10.0,
        label_color: Color32::BLACK,
    }
    .draw(&mut scene, &entries);

    log::debug!(
        "choropleth: {} counties, {} border lines",
        counties.len(),
        borders.len()
    );
    Ok(StaticChart::new(scene, counties, describe))
}

fn describe(county: &County) -> Option<TooltipContent> {
    let record = county.record.as_ref()?;
    Some(TooltipContent::new([format!(
        "{}, {}: {}%",
        record.area_name, record.state, record.bachelors_or_higher
    )]))
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;
    use crate::charts::{ChartKind, ChartView};

    // Three unit-100 squares in a row: counties 1001, 1003 and 1005. The
    // first two form state 1, the third state 2, so only the edge at x = 200
    // is a state border.
    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "objects": {
            "counties": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": 1001, "arcs": [[1, 0]]},
                {"type": "Polygon", "id": 1003, "arcs": [[-1, 3, 2, 4]]},
                {"type": "Polygon", "id": 1005, "arcs": [[5, -3]]}
            ]},
            "states": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": "01", "arcs": [[1, 3, 2, 4]]},
                {"type": "Polygon", "id": "02", "arcs": [[5, -3]]}
            ]}
        },
        "arcs": [
            [[100, 100], [100, 0]],
            [[100, 0], [0, 0], [0, 100], [100, 100]],
            [[200, 100], [200, 0]],
            [[100, 100], [200, 100]],
            [[200, 0], [100, 0]],
            [[200, 100], [300, 100], [300, 0], [200, 0]]
        ]
    }"#;

    fn record(fips: i64, area_name: &str, value: f64) -> EducationRecord {
        EducationRecord {
            fips,
            state: "AL".to_owned(),
            area_name: area_name.to_owned(),
            bachelors_or_higher: value,
        }
    }

    fn chart() -> StaticChart<County> {
        let topology = Topology::from_json(TOPOLOGY).unwrap();
        let records = vec![
            record(1001, "Autauga County", 21.0),
            record(1003, "Baldwin County", 70.0),
        ];
        build(&topology, &records, &ChartConfig::defaults(ChartKind::Choropleth)).unwrap()
    }

    fn fill(chart: &StaticChart<County>, index: usize) -> Option<Color32> {
        chart
            .scene()
            .commands()
            .iter()
            .find(|command| command.mark == Some(MarkId(index)))
            .and_then(|command| command.style.fill)
    }

    #[test]
    fn counties_are_filled_by_bucket_and_missing_ones_are_grey() {
        let chart = chart();
        let greens = Gradient::greens().scheme(7);
        assert_eq!(fill(&chart, 0), Some(greens[0]));
        assert_eq!(fill(&chart, 1), Some(greens[6]));
        assert_eq!(fill(&chart, 2), Some(MISSING));
    }

    #[test]
    fn only_borders_between_states_are_stroked() {
        let chart = chart();
        let borders: Vec<&Vec<eframe::egui::Pos2>> = chart
            .scene()
            .commands()
            .iter()
            .filter_map(|command| match &command.shape {
                Shape::Path { points, .. } if command.layer == Layer::Axes => Some(points),
                _ => None,
            })
            .collect();
        assert_eq!(borders, vec![&vec![pos2(200.0, 100.0), pos2(200.0, 0.0)]]);
    }

    #[test]
    fn legend_labels_bucket_ranges_as_percentages() {
        let chart = chart();
        let labels: Vec<&str> = chart
            .scene()
            .commands()
            .iter()
            .filter_map(|command| match &command.shape {
                Shape::Text { text, .. } if command.layer == Layer::Legend => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels.len(), 7);
        assert_eq!(labels[0], "21% - 28%");
        assert_eq!(labels[6], "63% - 70%");
    }

    #[test]
    fn margins_shift_counties_and_legend() {
        let topology = Topology::from_json(TOPOLOGY).unwrap();
        let records = vec![
            record(1001, "Autauga County", 21.0),
            record(1003, "Baldwin County", 70.0),
        ];
        let mut config = ChartConfig::defaults(ChartKind::Choropleth);
        config.margins = crate::config::Margins::new(30.0, 0.0, 0.0, 50.0);
        let chart = build(&topology, &records, &config).unwrap();

        let outside_shifted = pos2(20.0, 50.0);
        let inside_shifted = pos2(70.0, 80.0);
        let regions = chart.scene().hit_regions();
        assert_eq!(crate::interaction::hit_test(regions, outside_shifted), None);
        assert_eq!(
            crate::interaction::hit_test(regions, inside_shifted),
            Some(MarkId(0))
        );

        let first_bin = chart
            .scene()
            .commands()
            .iter()
            .find_map(|command| match &command.shape {
                Shape::Rect(rect) if command.layer == Layer::Legend => Some(rect.min),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_bin, pos2(450.0, 40.0));
    }

    #[test]
    fn hovering_a_county_reports_its_share() {
        let chart = chart();
        let inside = pos2(150.0, 50.0);
        let mark = crate::interaction::hit_test(chart.scene().hit_regions(), inside).unwrap();
        assert_eq!(mark, MarkId(1));
        assert_eq!(
            chart.tooltip(mark).unwrap().lines,
            vec!["Baldwin County, AL: 70%"]
        );
        assert!(chart.tooltip(MarkId(2)).is_none());
    }
}
