use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Discrete scale that splits a pixel range into one equal slot per domain
/// value.
///
/// Each slot is `step` wide; the drawn band inside it is `bandwidth =
/// step * (1 - padding)` wide and centred in the slot, so with zero padding
/// [`Band::scale`] returns the slot's leading edge. When the range is
/// reversed (`range[0] > range[1]`) the first domain value takes the slot at
/// the far end, which is how month rows stack bottom-up in the heatmap.
#[derive(Clone, Debug)]
pub struct Band<K> {
    domain: Vec<K>,
    index: HashMap<K, usize>,
    start: f64,
    step: f64,
    bandwidth: f64,
    reversed: bool,
}

impl<K: Clone + Eq + Hash> Band<K> {
    /// Duplicate domain values keep their first position.
    pub fn new<I>(domain: I, range: [f64; 2], padding: f64) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        let mut values = Vec::new();
        let mut index = HashMap::new();
        for key in domain {
            if !index.contains_key(&key) {
                index.insert(key.clone(), values.len());
                values.push(key);
            }
        }

        if values.is_empty() {
            return Err(Error::EmptyDomain { scale: "band" });
        }
        if !(0.0..1.0).contains(&padding) {
            return Err(Error::InvalidConfig {
                option: "paddingFraction",
                reason: format!("{padding} is outside [0, 1)"),
            });
        }

        let reversed = range[1] < range[0];
        let start = range[0].min(range[1]);
        let step = (range[1] - range[0]).abs() / values.len() as f64;
        let bandwidth = step * (1.0 - padding);

        Ok(Self {
            domain: values,
            index,
            start,
            step,
            bandwidth,
            reversed,
        })
    }

    pub fn domain(&self) -> &[K] {
        &self.domain
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Leading edge of the band for `key`, or `None` for values outside the
    /// domain.
    pub fn scale(&self, key: &K) -> Option<f64> {
        let position = *self.index.get(key)?;
        let slot = if self.reversed {
            self.domain.len() - 1 - position
        } else {
            position
        };
        let inset = (self.step - self.bandwidth) * 0.5;
        Some(self.start + slot as f64 * self.step + inset)
    }

    /// Centre of the band for `key`, where axis ticks sit.
    pub fn center(&self, key: &K) -> Option<f64> {
        self.scale(key).map(|edge| edge + self.bandwidth * 0.5)
    }
}
