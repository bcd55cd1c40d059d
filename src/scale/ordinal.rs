use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Categorical scale assigning palette entries to categories in first-seen
/// order, cycling through the palette when there are more categories than
/// entries.
#[derive(Clone, Debug)]
pub struct Ordinal<K, V> {
    domain: Vec<K>,
    index: HashMap<K, usize>,
    palette: Vec<V>,
    unknown: V,
}

impl<K: Clone + Eq + Hash, V: Clone> Ordinal<K, V> {
    pub fn new<I>(domain: I, palette: Vec<V>, unknown: V) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        if palette.is_empty() {
            return Err(Error::InvalidConfig {
                option: "colorPalette",
                reason: "palette has no entries".to_owned(),
            });
        }

        let mut values = Vec::new();
        let mut index = HashMap::new();
        for key in domain {
            if !index.contains_key(&key) {
                index.insert(key.clone(), values.len());
                values.push(key);
            }
        }

        Ok(Self {
            domain: values,
            index,
            palette,
            unknown,
        })
    }

    pub fn domain(&self) -> &[K] {
        &self.domain
    }

    /// Palette entry for `key`; categories outside the domain get the
    /// `unknown` value.
    pub fn scale(&self, key: &K) -> &V {
        match self.index.get(key) {
            Some(&position) => &self.palette[position % self.palette.len()],
            None => &self.unknown,
        }
    }

    /// `(category, value)` pairs in domain order, for legends.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.domain.iter().map(|key| (key, self.scale(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_cycle_through_palette() {
        let scale = Ordinal::new(["suit", "licensing", "resolved", "suit"], vec![1, 2], 0).unwrap();
        assert_eq!(scale.domain(), &["suit", "licensing", "resolved"]);
        assert_eq!(*scale.scale(&"suit"), 1);
        assert_eq!(*scale.scale(&"licensing"), 2);
        assert_eq!(*scale.scale(&"resolved"), 1);
        assert_eq!(*scale.scale(&"other"), 0);
    }

    #[test]
    fn empty_palette_is_invalid() {
        assert!(Ordinal::<&str, u8>::new(["a"], Vec::new(), 0).is_err());
    }

    #[test]
    fn entries_follow_domain_order() {
        let scale = Ordinal::new(["b", "a"], vec!['x', 'y'], '?').unwrap();
        let entries: Vec<_> = scale.entries().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(entries, vec![("b", 'x'), ("a", 'y')]);
    }
}
