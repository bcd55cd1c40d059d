use eframe::egui::{Align2, Color32, Pos2, Rect, Vec2, vec2};

use super::{Layer, Scene, Shape, Style};

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color32,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, color: Color32) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// Grid of color swatches with a label beside each, filled row by row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwatchLegend {
    pub origin: Pos2,
    pub swatch: f32,
    pub columns: usize,
    /// Distance between the origins of neighbouring cells.
    pub cell: Vec2,
    /// Label position relative to the swatch's top-left corner.
    pub label_offset: Vec2,
    pub label_anchor: Align2,
    pub font_size: f32,
    pub swatch_alpha: f32,
}

impl SwatchLegend {
    /// One column, swatch left of its label.
    pub fn column(origin: Pos2, swatch: f32, spacing: f32, font_size: f32) -> Self {
        Self {
            origin,
            swatch,
            columns: 1,
            cell: vec2(0.0, spacing),
            label_offset: vec2(swatch + 4.0, swatch * 0.5),
            label_anchor: Align2::LEFT_CENTER,
            font_size,
            swatch_alpha: 1.0,
        }
    }

    /// Top-left corner of entry `index`'s swatch.
    pub fn cell_origin(&self, index: usize) -> Pos2 {
        let columns = self.columns.max(1);
        let column = (index % columns) as f32;
        let row = (index / columns) as f32;
        self.origin + vec2(column * self.cell.x, row * self.cell.y)
    }

    /// Height taken by `count` entries.
    pub fn height(&self, count: usize) -> f32 {
        let rows = count.div_ceil(self.columns.max(1));
        if rows == 0 {
            return 0.0;
        }
        (rows - 1) as f32 * self.cell.y + self.swatch
    }

    pub fn draw(&self, scene: &mut Scene, entries: &[LegendEntry]) {
        for (index, entry) in entries.iter().enumerate() {
            let corner = self.cell_origin(index);
            scene.push(
                Layer::Legend,
                Shape::Rect(Rect::from_min_size(corner, Vec2::splat(self.swatch))),
                Style::fill(entry.color.gamma_multiply(self.swatch_alpha)),
            );
            scene.text(
                Layer::Legend,
                corner + self.label_offset,
                entry.label.clone(),
                self.label_anchor,
                self.font_size,
                Color32::BLACK,
            );
        }
    }
}

/// Horizontal strip of equal color bins with a label under each, as used
/// for sequential and quantized color scales.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinLegend {
    pub origin: Pos2,
    pub bin: Vec2,
    pub label_offset: Vec2,
    pub font_size: f32,
    pub label_color: Color32,
}

impl BinLegend {
    pub fn draw(&self, scene: &mut Scene, entries: &[LegendEntry]) {
        for (index, entry) in entries.iter().enumerate() {
            let corner = self.origin + vec2(self.bin.x * index as f32, 0.0);
            scene.push(
                Layer::Legend,
                Shape::Rect(Rect::from_min_size(corner, self.bin)),
                Style::fill(entry.color),
            );
            scene.text(
                Layer::Legend,
                corner + self.label_offset,
                entry.label.clone(),
                Align2::LEFT_BOTTOM,
                self.font_size,
                self.label_color,
            );
        }
    }

    pub fn bounds(&self, count: usize) -> Rect {
        Rect::from_min_size(self.origin, vec2(self.bin.x * count as f32, self.bin.y))
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn grid_fills_rows_first() {
        let legend = SwatchLegend {
            origin: pos2(0.0, 620.0),
            swatch: 20.0,
            columns: 5,
            cell: vec2(160.0, 40.0),
            label_offset: vec2(25.0, 15.0),
            label_anchor: Align2::LEFT_BOTTOM,
            font_size: 14.0,
            swatch_alpha: 1.0,
        };
        assert_eq!(legend.cell_origin(0), pos2(0.0, 620.0));
        assert_eq!(legend.cell_origin(4), pos2(640.0, 620.0));
        assert_eq!(legend.cell_origin(5), pos2(0.0, 660.0));
        assert_eq!(legend.height(18), 140.0);
        assert_eq!(legend.height(0), 0.0);
    }

    #[test]
    fn bins_draw_a_rect_and_label_each() {
        let legend = BinLegend {
            origin: pos2(70.0, 510.0),
            bin: vec2(40.0, 20.0),
            label_offset: vec2(0.0, 30.0),
            font_size: 9.0,
            label_color: Color32::GRAY,
        };
        let entries = [
            LegendEntry::new("≥ 2.8", Color32::BLUE),
            LegendEntry::new("≥ 4", Color32::RED),
        ];
        let mut scene = Scene::new(200.0, 600.0);
        legend.draw(&mut scene, &entries);
        assert_eq!(scene.commands().len(), 4);
        assert_eq!(legend.bounds(2).max, pos2(150.0, 530.0));
    }
}
