use super::{Extent, interpolate};
use crate::error::{Error, Result};
use crate::util::group_thousands;

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Continuous linear scale from a numeric domain to a pixel range.
///
/// Both the domain and the range may be reversed; values outside the domain
/// are extrapolated rather than clamped.
///
/// ```
/// use chartwork::scale::Linear;
///
/// let y = Linear::new([0.0, 100.0], [410.0, 40.0]).unwrap();
/// assert_eq!(y.scale(0.0), 410.0);
/// assert_eq!(y.scale(100.0), 40.0);
/// assert_eq!(y.scale(50.0), 225.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Linear {
    domain: [f64; 2],
    range: [f64; 2],
}

impl Linear {
    /// Fails with [`Error::DivisionByZero`] when the domain is a single point
    /// and with [`Error::EmptyDomain`] when it is not finite.
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Result<Self> {
        if !domain[0].is_finite() || !domain[1].is_finite() {
            return Err(Error::EmptyDomain { scale: "linear" });
        }
        if domain[0] == domain[1] {
            return Err(Error::DivisionByZero {
                scale: "linear",
                value: domain[0],
            });
        }
        Ok(Self { domain, range })
    }

    pub fn from_extent(extent: Extent, range: [f64; 2]) -> Result<Self> {
        Self::new(extent.as_array(), range)
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn scale(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let t = (value - d0) / (d1 - d0);
        interpolate(self.range[0], self.range[1], t)
    }

    /// Maps a range value back into the domain. A collapsed range maps every
    /// value to the start of the domain.
    pub fn invert(&self, value: f64) -> f64 {
        let [r0, r1] = self.range;
        if r0 == r1 {
            return self.domain[0];
        }
        let t = (value - r0) / (r1 - r0);
        interpolate(self.domain[0], self.domain[1], t)
    }

    /// Roughly `count` evenly spaced "nice" values inside the domain, in
    /// ascending order.
    pub fn ticks(&self, count: usize) -> LinearTicks {
        let extent = Extent::new(self.domain[0], self.domain[1]);
        LinearTicks::new(extent.min, extent.max, count)
    }

    /// Extends the domain outward to the nearest tick step.
    pub fn nice(&self, count: usize) -> Self {
        let reversed = self.domain[0] > self.domain[1];
        let extent = Extent::new(self.domain[0], self.domain[1]);
        let mut start = extent.min;
        let mut stop = extent.max;
        let mut previous = None;

        // Rounding the bounds can change the step; iterate until it settles.
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if previous == Some(step) || step == 0.0 || !step.is_finite() {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else {
                start = (start * -step).floor() / -step;
                stop = (stop * -step).ceil() / -step;
            }
            previous = Some(step);
        }

        let domain = if reversed { [stop, start] } else { [start, stop] };
        Self {
            domain,
            range: self.range,
        }
    }
}

/// Step between ticks for `count` ticks over `[start, stop]`.
///
/// Positive results are the step itself (1, 2 or 5 × 10^k). Negative results
/// encode sub-unit steps as the negated inverse, so `-10.0` means a step of
/// 0.1; tick values are then `i / 10.0`, which avoids accumulating
/// floating-point error.
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    if count == 0 || !(stop > start) {
        return 0.0;
    }

    let step = (stop - start) / count as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

/// Lazy ascending sequence of linear tick values.
///
/// The iterator is finite and `Clone`; cloning before iterating restarts it.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearTicks {
    next: i64,
    last: i64,
    increment: f64,
}

impl LinearTicks {
    fn new(start: f64, stop: f64, count: usize) -> Self {
        let increment = tick_increment(start, stop, count);
        if increment == 0.0 || !increment.is_finite() {
            return Self::empty(increment);
        }

        let (first, last) = if increment > 0.0 {
            ((start / increment).ceil(), (stop / increment).floor())
        } else {
            let inverse = -increment;
            ((start * inverse).ceil(), (stop * inverse).floor())
        };

        if !first.is_finite() || !last.is_finite() || first > last {
            return Self::empty(increment);
        }

        Self {
            next: first as i64,
            last: last as i64,
            increment,
        }
    }

    fn empty(increment: f64) -> Self {
        Self {
            next: 1,
            last: 0,
            increment,
        }
    }

    /// Distance between consecutive ticks.
    pub fn step(&self) -> f64 {
        if self.increment < 0.0 {
            1.0 / -self.increment
        } else {
            self.increment
        }
    }

    /// Label with just enough decimals for this tick step, grouped by
    /// thousands.
    pub fn label(&self, value: f64) -> String {
        let precision = if self.increment < 0.0 {
            (-self.increment).log10().ceil().max(0.0) as usize
        } else {
            0
        };
        group_thousands(&format!("{value:.precision$}"))
    }

    fn value_at(&self, index: i64) -> f64 {
        if self.increment < 0.0 {
            index as f64 / -self.increment
        } else {
            index as f64 * self.increment
        }
    }
}

impl Iterator for LinearTicks {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next > self.last {
            return None;
        }
        let value = self.value_at(self.next);
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last - self.next + 1).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LinearTicks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values_map_exactly() {
        let cases = [
            ([0.0, 1.0], [0.0, 1.0]),
            ([0.0, 18_064.7], [410.0, 40.0]),
            ([2_330.0, 2_210.0], [410.0, 40.0]),
            ([-3.3, 7.1], [70.0, 835.0]),
            ([1e-9, 3e-9], [0.1, 0.7]),
        ];
        for (domain, range) in cases {
            let scale = Linear::new(domain, range).unwrap();
            assert_eq!(scale.scale(domain[0]), range[0], "{domain:?} → {range:?}");
            assert_eq!(scale.scale(domain[1]), range[1], "{domain:?} → {range:?}");
        }
    }

    #[test]
    fn collapsed_domain_is_division_by_zero() {
        let error = Linear::new([5.0, 5.0], [0.0, 100.0]).unwrap_err();
        assert_eq!(
            error,
            Error::DivisionByZero {
                scale: "linear",
                value: 5.0
            }
        );
    }

    #[test]
    fn padded_extent_avoids_nan() {
        let extent = Extent::new(5.0, 5.0).padded(super::super::MIN_SPAN);
        let scale = Linear::from_extent(extent, [0.0, 100.0]).unwrap();
        assert_eq!(scale.scale(5.0), 50.0);
        assert!(scale.scale(1e12).is_finite());
    }

    #[test]
    fn invert_round_trips_interior_points() {
        let scale = Linear::new([0.0, 200.0], [410.0, 40.0]).unwrap();
        assert!((scale.invert(scale.scale(123.0)) - 123.0).abs() < 1e-9);
    }

    #[test]
    fn ticks_cover_domain_with_nice_steps() {
        let ticks = Linear::new([0.0, 100.0], [0.0, 1.0]).unwrap().ticks(10);
        assert_eq!(ticks.step(), 10.0);
        let values: Vec<f64> = ticks.collect();
        assert_eq!(values.len(), 11);
        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&100.0));
    }

    #[test]
    fn sub_unit_ticks_do_not_drift() {
        let values: Vec<f64> = Linear::new([0.0, 1.0], [0.0, 1.0])
            .unwrap()
            .ticks(10)
            .collect();
        assert_eq!(values[3], 0.3);
        assert_eq!(values[7], 0.7);
    }

    #[test]
    fn reversed_domain_ticks_ascend() {
        let values: Vec<f64> = Linear::new([2_330.0, 2_210.0], [410.0, 40.0])
            .unwrap()
            .ticks(10)
            .collect();
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(values.first(), Some(&2_210.0));
        assert_eq!(values.last(), Some(&2_330.0));
    }

    #[test]
    fn ticks_are_restartable() {
        let ticks = Linear::new([0.0, 18_064.7], [0.0, 1.0]).unwrap().ticks(10);
        let first: Vec<f64> = ticks.clone().collect();
        let second: Vec<f64> = ticks.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
    }

    #[test]
    fn labels_use_step_precision_and_grouping() {
        let ticks = Linear::new([0.0, 18_000.0], [0.0, 1.0]).unwrap().ticks(10);
        assert_eq!(ticks.label(16_000.0), "16,000");

        let fine = Linear::new([0.0, 1.0], [0.0, 1.0]).unwrap().ticks(10);
        assert_eq!(fine.label(0.5), "0.5");
    }

    #[test]
    fn nice_rounds_outward() {
        let scale = Linear::new([0.13, 9.7], [0.0, 1.0]).unwrap().nice(10);
        assert_eq!(scale.domain(), [0.0, 10.0]);

        let reversed = Linear::new([9.7, 0.13], [0.0, 1.0]).unwrap().nice(10);
        assert_eq!(reversed.domain(), [10.0, 0.0]);
    }
}
