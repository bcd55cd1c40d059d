use chrono::{Datelike, NaiveDate, NaiveTime};
use eframe::egui::{Color32, Rect, pos2};

use super::{StaticChart, day_domain, padded_linear, value_extent};
use crate::config::ChartConfig;
use crate::data::GdpSeries;
use crate::error::{Error, Result};
use crate::interaction::{HitShape, MarkId, TooltipContent};
use crate::scale::TimeScale;
use crate::scene::axis::{self, Orientation};
use crate::scene::{Scene, Shape, Style};
use crate::util::format_currency;

const BAR_COLOR: Color32 = Color32::from_rgb(0, 122, 255);

/// One quarter of the series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quarter {
    pub date: NaiveDate,
    pub billions: f64,
}

/// Quarterly GDP as bars on a time axis.
pub fn build(series: &GdpSeries, config: &ChartConfig) -> Result<StaticChart<Quarter>> {
    if series.data.is_empty() {
        return Err(Error::EmptyDomain { scale: "bar" });
    }

    let width = config.width();
    let height = config.height;
    let inner = config.inner(width);
    let x_range = [f64::from(inner.left()), f64::from(inner.right())];
    let y_range = [f64::from(inner.bottom()), f64::from(inner.top())];

    let x = TimeScale::new(day_domain(series.from_date, series.to_date), x_range)?;
    let extent = value_extent(config, series.data.iter().map(|(_, value)| *value), "linear")?;
    let y_domain = match config.domain_override {
        Some(_) => extent.as_array(),
        None => [0.0, extent.max],
    };
    let y = padded_linear(y_domain, y_range)?;

    let mut scene = Scene::new(width, height).with_heading("United States GDP", None);
    scene.heading.notes = vec![
        format!(
            "From {} to {}",
            series.from_date.format("%B %Y"),
            series.to_date.format("%B %Y")
        ),
        series.description.clone(),
    ];

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
        &axis::default_linear_ticks(&y, 10),
    );
    axis::vertical_title(
        &mut scene,
        pos2(inner.left() + 20.0, height - config.margins.bottom * 2.5),
        series.name.clone(),
        12.0,
    );

    let color = config
        .color_palette
        .as_ref()
        .and_then(|palette| palette.first().copied())
        .unwrap_or(BAR_COLOR);
    let bar_width = inner.width() / series.data.len() as f32;
    let baseline = y.scale(0.0) as f32;

    let mut marks = Vec::with_capacity(series.data.len());
    for (index, &(date, billions)) in series.data.iter().enumerate() {
        let center = x.scale(date.and_time(NaiveTime::MIN)) as f32;
        let top = y.scale(billions) as f32;
        let rect = Rect::from_min_max(
            pos2(center - bar_width / 2.0, top.min(baseline)),
            pos2(center + bar_width / 2.0, top.max(baseline)),
        );
        scene.push_mark(
            MarkId(index),
            Shape::Rect(rect),
            Style::fill(color),
            HitShape::Rect(rect),
        );
        marks.push(Quarter { date, billions });
    }

    log::debug!("bar chart: {} bars of width {bar_width:.2}", marks.len());
    Ok(StaticChart::new(scene, marks, describe))
}

fn describe(quarter: &Quarter) -> Option<TooltipContent> {
    let number = quarter.date.month0() / 3 + 1;
    Some(TooltipContent::new([
        format!("{} Q{number}", quarter.date.year()),
        format!("{} Billion", format_currency(quarter.billions)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, ChartView};

    fn series() -> GdpSeries {
        let date = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        GdpSeries {
            name: "Gross Domestic Product".to_owned(),
            description: "Units: Billions of Dollars".to_owned(),
            from_date: date(1947, 1),
            to_date: date(1947, 10),
            data: vec![
                (date(1947, 1), 243.1),
                (date(1947, 4), 18_064.7),
                (date(1947, 7), 250.0),
                (date(1947, 10), 0.0),
            ],
        }
    }

    #[test]
    fn bars_share_the_inner_width_and_start_at_zero() {
        let config = ChartConfig::defaults(ChartKind::Bar);
        let chart = build(&series(), &config).unwrap();
        let rects: Vec<Rect> = chart
            .scene()
            .hit_regions()
            .iter()
            .map(|region| match region.shape {
                HitShape::Rect(rect) => rect,
                _ => panic!("bars hit as rectangles"),
            })
            .collect();

        assert_eq!(rects.len(), 4);
        let expected_width = (875.0 - 70.0 - 40.0) / 4.0;
        assert!((rects[0].width() - expected_width).abs() < 1e-3);
        assert!((rects[0].center().x - 70.0).abs() < 1e-3);
        // Every bar rests on the x axis; the empty quarter has no height.
        for rect in &rects {
            assert!((rect.bottom() - 410.0).abs() < 1e-3);
        }
        assert!((rects[1].top() - 40.0).abs() < 1e-3);
        assert!(rects[3].height().abs() < 1e-3);
    }

    #[test]
    fn tooltip_names_quarter_and_amount() {
        let chart = build(&series(), &ChartConfig::defaults(ChartKind::Bar)).unwrap();
        let tooltip = chart.tooltip(MarkId(1)).unwrap();
        assert_eq!(tooltip.lines, vec!["1947 Q2", "$18,064.70 Billion"]);
        assert!(chart.tooltip(MarkId(9)).is_none());
    }

    #[test]
    fn description_spans_the_series() {
        let chart = build(&series(), &ChartConfig::defaults(ChartKind::Bar)).unwrap();
        assert_eq!(chart.scene().heading.notes[0], "From January 1947 to October 1947");
    }

    #[test]
    fn empty_series_produces_no_scene() {
        let mut empty = series();
        empty.data.clear();
        assert!(matches!(
            build(&empty, &ChartConfig::defaults(ChartKind::Bar)),
            Err(Error::EmptyDomain { .. })
        ));
    }
}
