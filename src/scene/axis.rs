use std::hash::Hash;

use eframe::egui::{Align2, Color32, Pos2, Stroke, pos2};

use super::{Layer, Scene, Shape, Style};
use crate::scale::{Band, Linear, TimeScale};

pub const TICK_SIZE: f32 = 6.0;
pub const TICK_PADDING: f32 = 3.0;
pub const FONT_SIZE: f32 = 10.0;
const AXIS_COLOR: Color32 = Color32::BLACK;

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Bottom,
    Left,
}

pub fn linear_ticks<F>(scale: &Linear, count: usize, format: F) -> Vec<Tick>
where
    F: Fn(f64) -> String,
{
    scale
        .ticks(count)
        .map(|value| Tick {
            position: scale.scale(value),
            label: format(value),
        })
        .collect()
}

/// Linear ticks with the default precision-aware labels.
pub fn default_linear_ticks(scale: &Linear, count: usize) -> Vec<Tick> {
    let ticks = scale.ticks(count);
    let labels = ticks.clone();
    ticks
        .map(|value| Tick {
            position: scale.scale(value),
            label: labels.label(value),
        })
        .collect()
}

pub fn time_ticks(scale: &TimeScale, count: usize) -> Vec<Tick> {
    let ticks = scale.ticks(count);
    let interval = ticks.interval();
    ticks
        .map(|date| Tick {
            position: scale.scale(date.and_time(chrono::NaiveTime::MIN)),
            label: interval.label(date),
        })
        .collect()
}

/// Ticks at band centres for the chosen subset of the domain.
pub fn band_ticks<K, I, F>(band: &Band<K>, values: I, format: F) -> Vec<Tick>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = K>,
    F: Fn(&K) -> String,
{
    values
        .into_iter()
        .filter_map(|value| {
            band.center(&value).map(|position| Tick {
                position,
                label: format(&value),
            })
        })
        .collect()
}

/// Draws a d3-style axis: the domain line with outer ticks spanning `range`,
/// one inner tick and label per entry.
///
/// `offset` is the y of a bottom axis or the x of a left axis.
pub fn draw_axis(
    scene: &mut Scene,
    orientation: Orientation,
    offset: f32,
    range: [f64; 2],
    ticks: &[Tick],
) {
    let stroke = Style {
        fill: None,
        stroke: Some(Stroke::new(1.0, AXIS_COLOR)),
    };
    let (start, end) = (range[0] as f32, range[1] as f32);

    let domain = match orientation {
        Orientation::Bottom => vec![
            pos2(start, offset + TICK_SIZE),
            pos2(start, offset),
            pos2(end, offset),
            pos2(end, offset + TICK_SIZE),
        ],
        Orientation::Left => vec![
            pos2(offset - TICK_SIZE, start),
            pos2(offset, start),
            pos2(offset, end),
            pos2(offset - TICK_SIZE, end),
        ],
    };
    scene.push(
        Layer::Axes,
        Shape::Path {
            points: domain,
            closed: false,
        },
        stroke,
    );

    for tick in ticks {
        let at = tick.position as f32;
        let (line, label_pos, anchor) = match orientation {
            Orientation::Bottom => (
                [pos2(at, offset), pos2(at, offset + TICK_SIZE)],
                pos2(at, offset + TICK_SIZE + TICK_PADDING),
                Align2::CENTER_TOP,
            ),
            Orientation::Left => (
                [pos2(offset, at), pos2(offset - TICK_SIZE, at)],
                pos2(offset - TICK_SIZE - TICK_PADDING, at),
                Align2::RIGHT_CENTER,
            ),
        };
        scene.push(
            Layer::Axes,
            Shape::Path {
                points: line.to_vec(),
                closed: false,
            },
            stroke,
        );
        scene.text(Layer::Axes, label_pos, tick.label.clone(), anchor, FONT_SIZE, AXIS_COLOR);
    }
}

/// Axis title rotated to read bottom-up, anchored at its start.
pub fn vertical_title(scene: &mut Scene, pos: Pos2, text: impl Into<String>, size: f32) {
    scene.push(
        Layer::Axes,
        Shape::Text {
            pos,
            text: text.into(),
            anchor: Align2::LEFT_BOTTOM,
            size,
            angle: -std::f32::consts::FRAC_PI_2,
        },
        Style::fill(AXIS_COLOR),
    );
}
