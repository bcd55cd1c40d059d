use chrono::NaiveDate;
use eframe::egui::{Align2, Color32, pos2, vec2};

use super::{StaticChart, day_domain, padded_linear, value_extent};
use crate::config::ChartConfig;
use crate::data::CyclistRecord;
use crate::error::{Error, Result};
use crate::interaction::{HitShape, MarkId, TooltipContent};
use crate::scale::TimeScale;
use crate::scene::axis::{self, Orientation};
use crate::scene::legend::{LegendEntry, SwatchLegend};
use crate::scene::{Scene, Shape, Style};
use crate::util::format_clock;

const CLEAN: Color32 = Color32::from_rgb(0x00, 0x80, 0x00);
const ALLEGED: Color32 = Color32::from_rgb(0xff, 0x00, 0x00);
const DOT_RADIUS: f32 = 5.0;

/// Climb times by year, colored by doping allegations.
pub fn build(records: &[CyclistRecord], config: &ChartConfig) -> Result<StaticChart<CyclistRecord>> {
    let (first, last) = match (
        records.iter().map(|record| record.year).min(),
        records.iter().map(|record| record.year).max(),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(Error::EmptyDomain { scale: "time" }),
    };
    let new_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, 1, 1).ok_or(Error::EmptyDomain { scale: "time" })
    };

    let width = config.width();
    let height = config.height;
    let inner = config.inner(width);
    let x_range = [f64::from(inner.left()), f64::from(inner.right())];
    let y_range = [f64::from(inner.bottom()), f64::from(inner.top())];

    let x = TimeScale::new(day_domain(new_year(first)?, new_year(last)?), x_range)?;
    let seconds = value_extent(config, records.iter().map(|record| record.seconds), "linear")?;
    // Slowest at the bottom.
    let y = padded_linear(seconds.reversed(), y_range)?;

    let mut scene = Scene::new(width, height).with_heading(
        "Doping in Professional Bicycle Racing",
        Some("35 Fastest times up Alpe d'Huez".to_owned()),
    );

    axis::draw_axis(
        &mut scene,
        Orientation::Bottom,
        inner.bottom(),
        x_range,
        &axis::time_ticks(&x, 10),
    );
    axis::draw_axis(
        &mut scene,
        Orientation::Left,
        inner.left(),
        y_range,
        &axis::linear_ticks(&y, 10, format_clock),
    );
    axis::vertical_title(&mut scene, pos2(25.0, height / 2.0), "Time in minutes", 12.0);

    let palette = config.color_palette.as_deref().unwrap_or(&[]);
    let clean = palette.first().copied().unwrap_or(CLEAN);
    let alleged = palette.get(1).copied().unwrap_or(ALLEGED);

    for (index, record) in records.iter().enumerate() {
        let color = if record.has_allegations() { alleged } else { clean };
        let center = pos2(
            x.scale(new_year(record.year)?.and_time(chrono::NaiveTime::MIN)) as f32,
            y.scale(record.seconds) as f32,
        );
        scene.push_mark(
            MarkId(index),
            Shape::Circle {
                center,
                radius: DOT_RADIUS,
            },
            Style::fill(color).with_stroke(1.0, color),
            HitShape::Circle {
                center,
                radius: DOT_RADIUS,
            },
        );
    }

    let legend = SwatchLegend {
        origin: pos2(width - config.margins.right, config.margins.top),
        swatch: 20.0,
        columns: 1,
        cell: vec2(0.0, 25.0),
        label_offset: vec2(-5.0, 13.0),
        label_anchor: Align2::RIGHT_BOTTOM,
        font_size: 13.0,
        swatch_alpha: 0.5,
    };
    legend.draw(
        &mut scene,
        &[
            LegendEntry::new("No doping allegations", clean),
            LegendEntry::new("Doping allegations", alleged),
        ],
    );

    Ok(StaticChart::new(scene, records.to_vec(), describe))
}

fn describe(record: &CyclistRecord) -> Option<TooltipContent> {
    let doping = if record.has_allegations() {
        format!("Doping allegations: {}", record.doping)
    } else {
        "No doping allegations".to_owned()
    };
    Some(TooltipContent::new([
        format!("{} ({})", record.name.to_uppercase(), record.nationality),
        format!("Year: {}", record.year),
        format!("Time: {}", record.time),
        doping,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, ChartView};

    fn rider(name: &str, year: i32, seconds: f64, doping: &str) -> CyclistRecord {
        CyclistRecord {
            time: format_clock(seconds),
            place: 1,
            seconds,
            name: name.to_owned(),
            year,
            nationality: "ITA".to_owned(),
            doping: doping.to_owned(),
            url: String::new(),
        }
    }

    fn chart() -> StaticChart<CyclistRecord> {
        let records = vec![
            rider("Marco Pantani", 1995, 2210.0, "Alleged drug use during 1995 due to high hematocrit"),
            rider("Nairo Quintana", 2015, 2363.0, ""),
            rider("Jan Ullrich", 1997, 2240.0, "Confessed later"),
        ];
        build(&records, &ChartConfig::defaults(ChartKind::Scatter)).unwrap()
    }

    fn dot(chart: &StaticChart<CyclistRecord>, index: usize) -> (eframe::egui::Pos2, Option<Color32>) {
        chart
            .scene()
            .commands()
            .iter()
            .find_map(|command| match (&command.shape, command.mark) {
                (Shape::Circle { center, .. }, Some(MarkId(mark))) if mark == index => {
                    Some((*center, command.style.fill))
                }
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn fastest_time_is_on_top_and_years_span_the_axis() {
        let chart = chart();
        let (fastest, fill) = dot(&chart, 0);
        let (slowest, clean_fill) = dot(&chart, 1);
        assert!((fastest.x - 70.0).abs() < 1e-3);
        assert!((fastest.y - 40.0).abs() < 1e-3);
        assert!((slowest.x - 835.0).abs() < 1e-3);
        assert!((slowest.y - 410.0).abs() < 1e-3);
        assert_eq!(fill, Some(ALLEGED));
        assert_eq!(clean_fill, Some(CLEAN));
    }

    #[test]
    fn tooltip_reports_allegations() {
        let chart = chart();
        let alleged = chart.tooltip(MarkId(0)).unwrap();
        assert_eq!(alleged.lines[0], "MARCO PANTANI (ITA)");
        assert_eq!(alleged.lines[2], "Time: 36:50");
        assert!(alleged.lines[3].starts_with("Doping allegations: "));

        let clean = chart.tooltip(MarkId(1)).unwrap();
        assert_eq!(clean.lines[3], "No doping allegations");
    }

    #[test]
    fn time_axis_labels_are_clock_times() {
        let chart = chart();
        let labels: Vec<&str> = chart
            .scene()
            .commands()
            .iter()
            .filter_map(|command| match &command.shape {
                Shape::Text { text, .. } if text.contains(':') => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(labels.contains(&"37:00"));
        assert!(labels.contains(&"39:00"));
    }

    #[test]
    fn empty_records_produce_no_scene() {
        assert!(build(&[], &ChartConfig::defaults(ChartKind::Scatter)).is_err());
    }
}
