use eframe::egui::{Align2, Color32, pos2, vec2};

use super::{StaticChart, TreemapDataset};
use crate::config::ChartConfig;
use crate::data::Hierarchy;
use crate::error::Result;
use crate::interaction::{HitShape, MarkId, TooltipContent};
use crate::palette::CATEGORY20;
use crate::scale::Ordinal;
use crate::scene::legend::{LegendEntry, SwatchLegend};
use crate::scene::{Layer, Scene, Shape, Style};
use crate::treemap;
use crate::util::split_camel_words;

const LABEL_SIZE: f32 = 10.0;
const LABEL_INSET: f32 = 3.0;
const LEGEND_GAP: f32 = 20.0;
const LEGEND_COLUMNS: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub name: String,
    pub category: String,
    pub value: f64,
}

fn heading(which: TreemapDataset) -> (&'static str, &'static str) {
    match which {
        TreemapDataset::Kickstarter => (
            "Kickstarter Pledges",
            "Top 100 Most Pledged Kickstarter Campaigns Grouped By Category",
        ),
        TreemapDataset::Movies => (
            "Movie Sales",
            "Top 100 Highest Grossing Movies Grouped By Genre",
        ),
        TreemapDataset::VideoGames => (
            "Video Game Sales",
            "Top 100 Most Sold Video Games Grouped by Platform",
        ),
    }
}

/// Leaves of `root` as squarified tiles colored by category, with the
/// category legend under the tiles.
pub fn build(which: TreemapDataset, root: &Hierarchy, config: &ChartConfig) -> Result<StaticChart<Tile>> {
    let width = config.width();
    let height = config.height;
    let plot = config.inner(width);
    let laid_out = treemap::layout(
        root.to_tree(),
        f64::from(plot.width()),
        f64::from(plot.height()),
    );

    let tiles: Vec<(Tile, treemap::TileRect)> = laid_out
        .leaves()
        .filter_map(|leaf| {
            let rect = leaf.rect()?;
            Some((
                Tile {
                    name: leaf.name().to_owned(),
                    category: leaf.category().unwrap_or_default().to_owned(),
                    value: leaf.value(),
                },
                rect,
            ))
        })
        .collect();

    let palette = config
        .color_palette
        .clone()
        .unwrap_or_else(|| CATEGORY20.to_vec());
    let colors = Ordinal::new(
        tiles.iter().map(|(tile, _)| tile.category.clone()),
        palette,
        Color32::GRAY,
    )?;

    let legend = SwatchLegend {
        origin: pos2(plot.left(), height + LEGEND_GAP),
        swatch: 20.0,
        columns: LEGEND_COLUMNS,
        cell: vec2(160.0, 40.0),
        label_offset: vec2(25.0, 15.0),
        label_anchor: Align2::LEFT_BOTTOM,
        font_size: 14.0,
        swatch_alpha: 1.0,
    };
    let categories = colors.domain().len();
    let total_height = height + LEGEND_GAP + legend.height(categories);

    let (title, subtitle) = heading(which);
    let mut scene =
        Scene::new(width, total_height).with_heading(title, Some(subtitle.to_owned()));

    for (index, (tile, rect)) in tiles.iter().enumerate() {
        let bounds = rect.to_rect().translate(plot.min.to_vec2());
        scene.push_mark(
            MarkId(index),
            Shape::Rect(bounds),
            Style::fill(*colors.scale(&tile.category)).with_stroke(1.0, Color32::WHITE),
            HitShape::Rect(bounds),
        );
        push_label(&mut scene, bounds.min, tile);
    }

    let entries: Vec<LegendEntry> = colors
        .entries()
        .map(|(category, color)| LegendEntry::new(category.clone(), *color))
        .collect();
    legend.draw(&mut scene, &entries);

    log::debug!(
        "{}: {} tiles in {categories} categories",
        which.label(),
        tiles.len()
    );
    Ok(StaticChart::new(
        scene,
        tiles.into_iter().map(|(tile, _)| tile).collect(),
        describe,
    ))
}

/// One line per word of the name, then the value set slightly apart.
fn push_label(scene: &mut Scene, corner: eframe::egui::Pos2, tile: &Tile) {
    let value = tile.value.to_string();
    let mut lines = split_camel_words(&tile.name);
    lines.push(&value);

    let last = lines.len() - 1;
    for (index, line) in lines.into_iter().enumerate() {
        let gap = if index == last { 0.3 } else { 0.0 };
        let ems = 1.1 + index as f32 * 0.9 + gap;
        scene.text(
            Layer::Labels,
            corner + vec2(LABEL_INSET, ems * LABEL_SIZE),
            line,
            Align2::LEFT_BOTTOM,
            LABEL_SIZE,
            Color32::BLACK,
        );
    }
}

fn describe(tile: &Tile) -> Option<TooltipContent> {
    Some(TooltipContent::new([
        format!("Name: {}", tile.name),
        format!("Category: {}", tile.category),
        format!("Value: {}", tile.value),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, ChartView};
    use crate::data::HierarchyValue;
    use eframe::egui::Rect;

    fn leaf(name: &str, category: &str, value: f64) -> Hierarchy {
        Hierarchy {
            name: name.to_owned(),
            category: Some(category.to_owned()),
            value: Some(HierarchyValue::Text(value.to_string())),
            children: Vec::new(),
        }
    }

    fn root() -> Hierarchy {
        Hierarchy {
            name: "Movies".to_owned(),
            category: None,
            value: None,
            children: vec![
                Hierarchy {
                    name: "Drama".to_owned(),
                    category: None,
                    value: None,
                    children: vec![leaf("TheGodfather", "Drama", 40.0)],
                },
                Hierarchy {
                    name: "Action".to_owned(),
                    category: None,
                    value: None,
                    children: vec![leaf("Avatar", "Action", 60.0)],
                },
            ],
        }
    }

    fn chart() -> StaticChart<Tile> {
        let config = ChartConfig::defaults(ChartKind::Treemap(TreemapDataset::Movies));
        build(TreemapDataset::Movies, &root(), &config).unwrap()
    }

    fn tile_rects(chart: &StaticChart<Tile>) -> Vec<Rect> {
        chart
            .scene()
            .hit_regions()
            .iter()
            .map(|region| match region.shape {
                HitShape::Rect(rect) => rect,
                _ => panic!("tiles hit as rectangles"),
            })
            .collect()
    }

    #[test]
    fn largest_tile_comes_first_and_tiles_split_the_area() {
        let chart = chart();
        assert_eq!(chart.marks()[0].name, "Avatar");
        let rects = tile_rects(&chart);
        assert_eq!(rects[0], Rect::from_min_max(pos2(0.0, 0.0), pos2(585.0, 610.0)));
        assert_eq!(rects[1], Rect::from_min_max(pos2(585.0, 0.0), pos2(975.0, 610.0)));
    }

    #[test]
    fn categories_take_palette_colors_in_leaf_order() {
        let chart = chart();
        let fills: Vec<Option<Color32>> = chart
            .scene()
            .commands()
            .iter()
            .filter(|command| command.mark.is_some())
            .map(|command| command.style.fill)
            .collect();
        assert_eq!(fills, vec![Some(CATEGORY20[0]), Some(CATEGORY20[1])]);
    }

    #[test]
    fn labels_wrap_on_capitals_and_end_with_the_value() {
        let chart = chart();
        let labels: Vec<(&str, f32)> = chart
            .scene()
            .commands()
            .iter()
            .filter(|command| command.layer == Layer::Labels)
            .filter_map(|command| match &command.shape {
                Shape::Text { text, pos, .. } => Some((text.as_str(), pos.y)),
                _ => None,
            })
            .collect();
        let godfather: Vec<&str> = labels[2..].iter().map(|(text, _)| *text).collect();
        assert_eq!(godfather, vec!["The", "Godfather", "40"]);
        assert!((labels[4].1 - 32.0).abs() < 1e-3);
    }

    #[test]
    fn margins_inset_the_tiles_and_legend() {
        let mut config = ChartConfig::defaults(ChartKind::Treemap(TreemapDataset::Movies));
        config.margins = crate::config::Margins::new(10.0, 25.0, 40.0, 50.0);
        let chart = build(TreemapDataset::Movies, &root(), &config).unwrap();

        let rects = tile_rects(&chart);
        assert_eq!(rects[0].min, pos2(50.0, 10.0));
        assert_eq!(rects[1].max, pos2(950.0, 570.0));
        let union = rects[0].union(rects[1]);
        assert_eq!(union, config.inner(975.0));

        let first_swatch = chart
            .scene()
            .commands()
            .iter()
            .find_map(|command| match &command.shape {
                Shape::Rect(rect) if command.layer == Layer::Legend => Some(rect.min),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_swatch, pos2(50.0, 630.0));
    }

    #[test]
    fn legend_extends_the_scene_below_the_tiles() {
        let chart = chart();
        assert_eq!(chart.scene().size, vec2(975.0, 610.0 + 20.0 + 20.0));
        let tooltip = chart.tooltip(MarkId(1)).unwrap();
        assert_eq!(
            tooltip.lines,
            vec!["Name: TheGodfather", "Category: Drama", "Value: 40"]
        );
    }
}
