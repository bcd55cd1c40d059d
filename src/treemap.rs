//! Squarified treemap partitioning (Bruls, Huizing & van Wijk).
//!
//! Children are laid out in descending value order in rows along the
//! shorter side of the remaining rectangle; a row grows while its worst
//! aspect ratio keeps improving. Neighbouring tiles share the same cut
//! coordinate, and every coordinate is rounded to whole pixels once after
//! the whole tree is laid out, so siblings never overlap or leave gaps.

use eframe::egui::{Rect, pos2};

/// Tile bounds in pixels; `x0 <= x1` and `y0 <= y1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl TileRect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Area shared with `other`; zero for tiles that only touch.
    pub fn overlap(&self, other: &Self) -> f64 {
        let width = self.x1.min(other.x1) - self.x0.max(other.x0);
        let height = self.y1.min(other.y1) - self.y0.max(other.y0);
        width.max(0.0) * height.max(0.0)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_min_max(
            pos2(self.x0 as f32, self.y0 as f32),
            pos2(self.x1 as f32, self.y1 as f32),
        )
    }

    fn rounded(&self) -> Self {
        Self {
            x0: self.x0.round(),
            y0: self.y0.round(),
            x1: self.x1.round(),
            y1: self.y1.round(),
        }
    }
}

/// A weighted tree node. A branch's value is the sum of its children's
/// values, fixed when the branch is built.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    name: String,
    category: Option<String>,
    value: f64,
    children: Vec<TreeNode>,
    rect: Option<TileRect>,
}

impl TreeNode {
    /// Negative or non-finite weights are treated as zero.
    pub fn leaf(name: impl Into<String>, category: Option<String>, value: f64) -> Self {
        let name = name.into();
        let value = if value.is_finite() && value >= 0.0 {
            value
        } else {
            log::warn!("treemap leaf `{name}` has weight {value}; using 0");
            0.0
        };
        Self {
            name,
            category,
            value,
            children: Vec::new(),
            rect: None,
        }
    }

    pub fn branch(name: impl Into<String>, category: Option<String>, children: Vec<TreeNode>) -> Self {
        let value = children.iter().map(|child| child.value).sum();
        Self {
            name: name.into(),
            category,
            value,
            children,
            rect: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Assigned by [`layout`]; `None` before.
    pub fn rect(&self) -> Option<TileRect> {
        self.rect
    }

    /// Leaves in depth-first child order, which after [`layout`] is the
    /// descending-value order used to place them.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    fn sort_descending(&mut self) {
        self.children
            .sort_by(|a, b| b.value.total_cmp(&a.value));
        for child in &mut self.children {
            child.sort_descending();
        }
    }

    fn round_rects(&mut self) {
        self.rect = self.rect.map(|rect| rect.rounded());
        for child in &mut self.children {
            child.round_rects();
        }
    }
}

pub struct Leaves<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<&'a TreeNode> {
        while let Some(node) = self.stack.pop() {
            if node.is_leaf() {
                return Some(node);
            }
            self.stack.extend(node.children.iter().rev());
        }
        None
    }
}

/// Lays `root` out over `[0, width] × [0, height]` and returns it with every
/// node's rectangle filled in.
pub fn layout(mut root: TreeNode, width: f64, height: f64) -> TreeNode {
    root.sort_descending();
    let bounds = TileRect::new(0.0, 0.0, width.max(0.0), height.max(0.0));
    root.rect = Some(bounds);
    squarify(&mut root.children, bounds);
    root.round_rects();

    log::debug!(
        "treemap laid out {} leaves in {width}x{height}",
        root.leaves().count()
    );
    root
}

fn place(node: &mut TreeNode, rect: TileRect) {
    node.rect = Some(rect);
    squarify(&mut node.children, rect);
}

fn squarify(children: &mut [TreeNode], bounds: TileRect) {
    if children.is_empty() {
        return;
    }

    let mut remaining_value: f64 = children.iter().map(|child| child.value).sum();
    let mut remaining = bounds;
    let mut start = 0;

    while start < children.len() {
        if children[start].value <= 0.0 {
            // Sorted descending, so everything from here on weighs nothing.
            let corner = TileRect::new(remaining.x1, remaining.y1, remaining.x1, remaining.y1);
            for child in &mut children[start..] {
                place(child, corner);
            }
            return;
        }

        let scale = remaining.area() / remaining_value;
        let side = remaining.width().min(remaining.height());

        let mut end = start;
        let mut row_area = 0.0;
        let mut row_min = f64::INFINITY;
        let mut row_max = 0.0_f64;
        let mut current = f64::INFINITY;
        while end < children.len() && children[end].value > 0.0 {
            let area = children[end].value * scale;
            let next = worst_aspect_ratio(row_min.min(area), row_max.max(area), row_area + area, side);
            if end > start && next > current {
                break;
            }
            row_area += area;
            row_min = row_min.min(area);
            row_max = row_max.max(area);
            current = next;
            end += 1;
        }

        let row_value: f64 = children[start..end].iter().map(|child| child.value).sum();
        let is_last = children[end..].iter().all(|child| child.value <= 0.0);
        remaining = layout_row(
            &mut children[start..end],
            row_value,
            remaining_value,
            remaining,
            is_last,
        );
        remaining_value -= row_value;
        start = end;
    }
}

/// Places one row along the shorter side of `bounds` and returns what is
/// left. The final tile of the row, and the final row, end exactly on the
/// bounds so rounding error never opens a gap.
fn layout_row(
    row: &mut [TreeNode],
    row_value: f64,
    remaining_value: f64,
    bounds: TileRect,
    is_last: bool,
) -> TileRect {
    let fraction = if is_last { 1.0 } else { row_value / remaining_value };
    let last_index = row.len().saturating_sub(1);
    let mut cumulative = 0.0;

    if bounds.width() <= bounds.height() {
        let cut_y = if is_last {
            bounds.y1
        } else {
            bounds.y0 + bounds.height() * fraction
        };
        let mut previous_cut = bounds.x0;
        for (index, child) in row.iter_mut().enumerate() {
            cumulative += child.value;
            let cut_x = if index == last_index {
                bounds.x1
            } else {
                bounds.x0 + bounds.width() * (cumulative / row_value)
            };
            place(child, TileRect::new(previous_cut, bounds.y0, cut_x, cut_y));
            previous_cut = cut_x;
        }
        TileRect::new(bounds.x0, cut_y, bounds.x1, bounds.y1)
    } else {
        let cut_x = if is_last {
            bounds.x1
        } else {
            bounds.x0 + bounds.width() * fraction
        };
        let mut previous_cut = bounds.y0;
        for (index, child) in row.iter_mut().enumerate() {
            cumulative += child.value;
            let cut_y = if index == last_index {
                bounds.y1
            } else {
                bounds.y0 + bounds.height() * (cumulative / row_value)
            };
            place(child, TileRect::new(bounds.x0, previous_cut, cut_x, cut_y));
            previous_cut = cut_y;
        }
        TileRect::new(cut_x, bounds.y0, bounds.x1, bounds.y1)
    }
}

fn worst_aspect_ratio(min_area: f64, max_area: f64, sum: f64, side: f64) -> f64 {
    if sum <= 0.0 || side <= 0.0 || min_area <= 0.0 || max_area <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let a = (side_sq * max_area) / sum_sq;
    let b = sum_sq / (side_sq * min_area);
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf(name: &str, value: f64) -> TreeNode {
        TreeNode::leaf(name, None, value)
    }

    #[test]
    fn sixty_forty_split_fills_the_square() {
        let root = TreeNode::branch("root", None, vec![leaf("b", 40.0), leaf("a", 60.0)]);
        assert_eq!(root.value(), 100.0);

        let root = layout(root, 100.0, 100.0);
        let children = root.children();
        assert_eq!(children[0].name(), "a");

        let a = children[0].rect().unwrap();
        let b = children[1].rect().unwrap();
        assert!((a.area() - 6_000.0).abs() <= 60.0);
        assert!((b.area() - 4_000.0).abs() <= 40.0);
        assert_eq!(a.overlap(&b), 0.0);
        assert_eq!(a.area() + b.area(), 10_000.0);
    }

    #[test]
    fn zero_value_children_get_degenerate_tiles() {
        let root = TreeNode::branch(
            "root",
            None,
            vec![leaf("empty", 0.0), leaf("full", 5.0), leaf("negative", -3.0)],
        );
        let root = layout(root, 40.0, 20.0);
        let names: Vec<&str> = root.leaves().map(TreeNode::name).collect();
        assert_eq!(names, vec!["full", "empty", "negative"]);

        let full = root.children()[0].rect().unwrap();
        assert_eq!(full, TileRect::new(0.0, 0.0, 40.0, 20.0));
        for zero in &root.children()[1..] {
            assert_eq!(zero.rect().unwrap().area(), 0.0);
        }
    }

    #[test]
    fn branch_value_is_sum_of_children() {
        let inner = TreeNode::branch("inner", None, vec![leaf("x", 1.5), leaf("y", 2.5)]);
        let root = TreeNode::branch("root", None, vec![inner, leaf("z", 6.0)]);
        assert_eq!(root.value(), 10.0);
        assert_eq!(root.leaves().count(), 3);
    }

    #[test]
    fn rows_keep_tiles_near_square() {
        let values = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0];
        let root = TreeNode::branch(
            "root",
            None,
            values.iter().enumerate().map(|(i, v)| leaf(&i.to_string(), *v)).collect(),
        );
        let root = layout(root, 600.0, 400.0);
        for tile in root.leaves() {
            let rect = tile.rect().unwrap();
            let ratio = rect.width().max(rect.height()) / rect.width().min(rect.height());
            assert!(ratio < 4.0, "{} has aspect {ratio}", tile.name());
        }
    }

    fn arbitrary_tree() -> impl Strategy<Value = TreeNode> {
        let leaf = (0u32..1_000).prop_map(|value| TreeNode::leaf("leaf", None, value as f64));
        let group = prop::collection::vec(leaf.clone(), 1..8)
            .prop_map(|children| TreeNode::branch("group", None, children));
        let child = prop_oneof![leaf, group];
        prop::collection::vec(child, 1..12)
            .prop_map(|children| TreeNode::branch("root", None, children))
    }

    fn check_siblings(node: &TreeNode) -> Result<(), TestCaseError> {
        let parent = node.rect().unwrap();
        let children = node.children();
        for (index, child) in children.iter().enumerate() {
            let rect = child.rect().unwrap();
            prop_assert!(rect.x0 >= parent.x0 && rect.x1 <= parent.x1);
            prop_assert!(rect.y0 >= parent.y0 && rect.y1 <= parent.y1);
            for other in &children[index + 1..] {
                prop_assert_eq!(rect.overlap(&other.rect().unwrap()), 0.0);
            }
            check_siblings(child)?;
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn leaves_tile_the_canvas_without_overlap(
            tree in arbitrary_tree(),
            width in 1u32..1_200,
            height in 1u32..900,
        ) {
            let total = tree.value();
            let root = layout(tree, width as f64, height as f64);
            check_siblings(&root)?;

            if total > 0.0 {
                let covered: f64 = root
                    .leaves()
                    .map(|leaf| leaf.rect().unwrap().area())
                    .sum();
                let canvas = width as f64 * height as f64;
                let leaves = root.leaves().count() as f64;
                prop_assert!((covered - canvas).abs() <= leaves, "{covered} vs {canvas}");
            }
        }
    }
}
