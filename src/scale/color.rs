use std::collections::HashMap;

use eframe::egui::Color32;

use super::Extent;
use crate::error::{Error, Result};
use crate::palette::Gradient;

/// Continuous domain → color through a [`Gradient`], clamped at both ends.
///
/// The domain may be reversed; the heatmap uses `[max, min]` so hot values
/// land on the red end of the red-yellow-blue ramp.
#[derive(Clone, Debug)]
pub struct Sequential {
    domain: [f64; 2],
    gradient: Gradient,
}

impl Sequential {
    pub fn new(domain: [f64; 2], gradient: Gradient) -> Result<Self> {
        if !domain[0].is_finite() || !domain[1].is_finite() {
            return Err(Error::EmptyDomain {
                scale: "sequential",
            });
        }
        if domain[0] == domain[1] {
            return Err(Error::DivisionByZero {
                scale: "sequential",
                value: domain[0],
            });
        }
        Ok(Self { domain, gradient })
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn scale(&self, value: f64) -> Color32 {
        let [d0, d1] = self.domain;
        self.gradient.sample((value - d0) / (d1 - d0))
    }

    /// Domain value at fraction `p` of the way from `domain[0]` to
    /// `domain[1]`.
    pub fn quantile(&self, p: f64) -> f64 {
        super::interpolate(self.domain[0], self.domain[1], p)
    }
}

/// Continuous domain split into equal-width buckets, one color per bucket.
///
/// Bucket `i` covers `[thresholds[i - 1], thresholds[i])`; the first bucket
/// starts at the domain minimum and the last one ends at (and includes) the
/// domain maximum. [`Quantize::scale`] and [`Quantize::invert_extent`] read
/// the same threshold table, so the extent returned for a value's color
/// always contains that value.
///
/// ```
/// use chartwork::scale::Quantize;
/// use eframe::egui::Color32;
///
/// let colors = vec![Color32::WHITE, Color32::GRAY, Color32::BLACK];
/// let scale = Quantize::new([0.0, 30.0], colors).unwrap();
/// assert_eq!(scale.scale(12.0), Color32::GRAY);
/// assert_eq!(scale.invert_extent(Color32::GRAY), Some((10.0, 20.0)));
/// ```
#[derive(Clone, Debug)]
pub struct Quantize {
    extent: Extent,
    thresholds: Vec<f64>,
    colors: Vec<Color32>,
}

impl Quantize {
    pub fn new(domain: [f64; 2], colors: Vec<Color32>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::InvalidConfig {
                option: "legendBucketCount",
                reason: "a quantize scale needs at least one color".to_owned(),
            });
        }
        let mut first_bucket = HashMap::with_capacity(colors.len());
        for (index, color) in colors.iter().enumerate() {
            if let Some(earlier) = first_bucket.insert(*color, index) {
                return Err(Error::InvalidConfig {
                    option: "colorPalette",
                    reason: format!(
                        "buckets {earlier} and {index} share the color {}; \
                         use fewer buckets or distinct colors",
                        color.to_hex()
                    ),
                });
            }
        }
        if !domain[0].is_finite() || !domain[1].is_finite() {
            return Err(Error::EmptyDomain { scale: "quantize" });
        }
        if domain[0] == domain[1] {
            return Err(Error::DivisionByZero {
                scale: "quantize",
                value: domain[0],
            });
        }

        let extent = Extent::new(domain[0], domain[1]);
        let buckets = colors.len();
        let thresholds = (1..buckets)
            .map(|index| {
                super::interpolate(extent.min, extent.max, index as f64 / buckets as f64)
            })
            .collect();

        Ok(Self {
            extent,
            thresholds,
            colors,
        })
    }

    pub fn colors(&self) -> &[Color32] {
        &self.colors
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    fn bucket(&self, value: f64) -> usize {
        self.thresholds
            .partition_point(|threshold| *threshold <= value)
    }

    pub fn scale(&self, value: f64) -> Color32 {
        self.colors[self.bucket(value)]
    }

    /// `(lo, hi)` bounds of the bucket that produces `color`, or `None` when
    /// the color is not in the palette. Colors are unique per bucket, so the
    /// lookup is unambiguous.
    pub fn invert_extent(&self, color: Color32) -> Option<(f64, f64)> {
        let index = self.colors.iter().position(|entry| *entry == color)?;
        Some(self.bucket_extent(index))
    }

    pub fn bucket_extent(&self, index: usize) -> (f64, f64) {
        let lo = if index == 0 {
            self.extent.min
        } else {
            self.thresholds[index - 1]
        };
        let hi = self
            .thresholds
            .get(index)
            .copied()
            .unwrap_or(self.extent.max);
        (lo, hi)
    }
}
