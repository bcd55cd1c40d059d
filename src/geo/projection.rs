use eframe::egui::{Pos2, Rect, Vec2, pos2};

use super::{Point, Region};

/// Maps topology coordinates to screen coordinates.
pub trait Projection {
    fn project(&self, point: Point) -> Pos2;

    fn project_ring(&self, ring: &[Point]) -> Vec<Pos2> {
        ring.iter().map(|point| self.project(*point)).collect()
    }

    fn project_region(&self, region: &Region) -> Vec<Vec<Vec<Pos2>>> {
        region
            .polygons
            .iter()
            .map(|rings| rings.iter().map(|ring| self.project_ring(ring)).collect())
            .collect()
    }
}

/// For topologies whose coordinates are already in screen space, such as
/// pre-projected county files. `offset` moves them into the plot area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Identity {
    pub offset: Vec2,
}

impl Projection for Identity {
    fn project(&self, point: Point) -> Pos2 {
        pos2(point[0] as f32, point[1] as f32) + self.offset
    }
}

/// Plate carrée: longitude → x, latitude → −y, uniformly scaled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Equirectangular {
    pub scale: f64,
    pub translate: [f64; 2],
}

impl Default for Equirectangular {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: [0.0, 0.0],
        }
    }
}

impl Equirectangular {
    /// Scale and translation that fit every point into `extent`, keeping the
    /// aspect ratio and centring the spare axis. Returns the default
    /// projection when there are no finite points.
    pub fn fit_extent<'a, I>(extent: Rect, points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for &[lon, lat] in points {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            let y = -lat;
            min = [min[0].min(lon), min[1].min(y)];
            max = [max[0].max(lon), max[1].max(y)];
        }
        if min[0] > max[0] {
            return Self::default();
        }

        let width = f64::from(extent.width());
        let height = f64::from(extent.height());
        let span_x = (max[0] - min[0]).max(f64::EPSILON);
        let span_y = (max[1] - min[1]).max(f64::EPSILON);
        let scale = (width / span_x).min(height / span_y);

        let translate = [
            f64::from(extent.min.x) + (width - span_x * scale) * 0.5 - min[0] * scale,
            f64::from(extent.min.y) + (height - span_y * scale) * 0.5 - min[1] * scale,
        ];
        Self { scale, translate }
    }
}

impl Projection for Equirectangular {
    fn project(&self, [lon, lat]: Point) -> Pos2 {
        pos2(
            (lon * self.scale + self.translate[0]) as f32,
            (-lat * self.scale + self.translate[1]) as f32,
        )
    }
}
