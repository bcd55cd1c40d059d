//! Domain → range mappings used by every chart.
//!
//! Continuous scales ([`Linear`], [`TimeScale`]) map numbers or instants to
//! pixels and generate axis ticks. Discrete scales ([`Band`], [`Ordinal`])
//! map categories to slots or palette entries. Color scales
//! ([`Sequential`], [`Quantize`]) map numbers to colors.
//!
//! Scales are built from an already computed domain and expose no setters,
//! so a scale's domain never changes after construction.

mod band;
mod color;
mod linear;
mod ordinal;
mod time;

pub use band::Band;
pub use color::{Quantize, Sequential};
pub use linear::{Linear, LinearTicks, tick_increment};
pub use ordinal::Ordinal;
pub use time::{TimeInterval, TimeScale, TimeTicks};

use crate::error::{Error, Result};

/// Smallest span substituted for a collapsed continuous domain.
pub const MIN_SPAN: f64 = 1.0;

/// Closed `[min, max]` interval of finite data values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Extent of the finite values in `values`. Non-finite values are skipped;
    /// if nothing remains the domain is empty.
    pub fn from_values<I>(values: I, scale: &'static str) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values.into_iter().filter(|value| value.is_finite()) {
            min = min.min(value);
            max = max.max(value);
        }

        if min > max {
            return Err(Error::EmptyDomain { scale });
        }
        Ok(Self { min, max })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.span() <= 0.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns the extent unchanged unless it is degenerate, in which case a
    /// span of `min_span` centred on the single value is substituted.
    pub fn padded(self, min_span: f64) -> Self {
        if !self.is_degenerate() {
            return self;
        }

        let half = min_span.abs().max(f64::EPSILON) * 0.5;
        log::warn!(
            "collapsed domain at {}; widening to a span of {}",
            self.min,
            half * 2.0
        );
        Self {
            min: self.min - half,
            max: self.max + half,
        }
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.min, self.max]
    }

    /// `[max, min]`, for axes that grow downward in data space.
    pub fn reversed(&self) -> [f64; 2] {
        [self.max, self.min]
    }
}

/// Linear interpolation that reproduces both endpoints exactly.
pub(crate) fn interpolate(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_skips_non_finite_values() {
        let extent = Extent::from_values([3.0, f64::NAN, -1.0, f64::INFINITY, 7.5], "test")
            .expect("finite values present");
        assert_eq!(extent, Extent { min: -1.0, max: 7.5 });
    }

    #[test]
    fn extent_of_nothing_is_empty_domain() {
        let error = Extent::from_values(std::iter::empty(), "y").unwrap_err();
        assert_eq!(error, Error::EmptyDomain { scale: "y" });
    }

    #[test]
    fn padded_only_touches_collapsed_extents() {
        let wide = Extent::new(0.0, 10.0);
        assert_eq!(wide.padded(MIN_SPAN), wide);

        let single = Extent::new(4.0, 4.0).padded(2.0);
        assert_eq!(single, Extent { min: 3.0, max: 5.0 });
    }

    #[test]
    fn interpolate_hits_endpoints_exactly() {
        let (a, b) = (410.0, 40.0);
        assert_eq!(interpolate(a, b, 0.0), a);
        assert_eq!(interpolate(a, b, 1.0), b);
    }
}
