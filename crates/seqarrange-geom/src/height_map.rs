//! Height-keyed shape maps.
//!
//! Objects and the extruder assembly are both described as a stack of
//! shapes, each valid from its key height up to the next key. The map is a
//! sorted vector searched with binary search, so "at or below `h`" and
//! "overlapping `[lo, hi)`" queries follow the stacking order directly.

use serde::{Deserialize, Serialize};

/// Sorted `(height, value)` pairs with unique heights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightMap<T> {
    entries: Vec<(f64, T)>,
}

impl<T> Default for HeightMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> HeightMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` at `height`, replacing any value already there.
    pub fn insert(&mut self, height: f64, value: T) {
        match self
            .entries
            .binary_search_by(|(h, _)| h.total_cmp(&height))
        {
            Ok(i) => self.entries[i].1 = value,
            Err(i) => self.entries.insert(i, (height, value)),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value stored exactly at `height`.
    pub fn get(&self, height: f64) -> Option<&T> {
        self.entries
            .binary_search_by(|(h, _)| h.total_cmp(&height))
            .ok()
            .map(|i| &self.entries[i].1)
    }

    /// The entry in effect at `height`: the highest key at or below it.
    pub fn at_or_below(&self, height: f64) -> Option<(f64, &T)> {
        let idx = self.entries.partition_point(|(h, _)| *h <= height);
        if idx == 0 {
            return None;
        }
        let (h, v) = &self.entries[idx - 1];
        Some((*h, v))
    }

    /// All entries in ascending height order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> {
        self.entries.iter().map(|(h, v)| (*h, v))
    }

    /// Keys in ascending order.
    pub fn heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(h, _)| *h)
    }

    /// Entries as `(start, end, value)` spans; the last span ends at `top`.
    pub fn spans(&self, top: f64) -> impl Iterator<Item = (f64, f64, &T)> {
        self.entries.iter().enumerate().map(move |(i, (h, v))| {
            let end = self.entries.get(i + 1).map_or(top, |(next, _)| *next);
            (*h, end, v)
        })
    }

    /// Spans (ending at `top`) that intersect the half-open range `[lo, hi)`.
    pub fn overlapping(&self, lo: f64, hi: f64, top: f64) -> impl Iterator<Item = (f64, f64, &T)> {
        // Skip entries whose span ends at or below `lo`.
        let first = self
            .entries
            .partition_point(|(h, _)| *h <= lo)
            .saturating_sub(1);
        self.spans(top)
            .skip(first)
            .take_while(move |(start, _, _)| *start < hi)
            .filter(move |(start, end, _)| start < end && *end > lo && *start < hi)
    }

    /// Map every value, keeping the keys.
    pub fn map<U>(&self, mut f: impl FnMut(f64, &T) -> U) -> HeightMap<U> {
        HeightMap {
            entries: self.entries.iter().map(|(h, v)| (*h, f(*h, v))).collect(),
        }
    }

    /// Fallible [`HeightMap::map`].
    pub fn try_map<U, E>(&self, mut f: impl FnMut(f64, &T) -> Result<U, E>) -> Result<HeightMap<U>, E> {
        let entries = self
            .entries
            .iter()
            .map(|(h, v)| f(*h, v).map(|u| (*h, u)))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(HeightMap { entries })
    }
}

impl<T> FromIterator<(f64, T)> for HeightMap<T> {
    fn from_iter<I: IntoIterator<Item = (f64, T)>>(iter: I) -> Self {
        let mut map = HeightMap::new();
        for (h, v) in iter {
            map.insert(h, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HeightMap<&'static str> {
        [(10.0, "body"), (0.0, "nozzle"), (25.0, "gantry")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_sorted_insert_and_replace() {
        let mut map = sample();
        assert_eq!(map.heights().collect::<Vec<_>>(), vec![0.0, 10.0, 25.0]);
        map.insert(10.0, "fan");
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(10.0), Some(&"fan"));
        assert_eq!(map.get(11.0), None);
    }

    #[test]
    fn test_at_or_below() {
        let map = sample();
        assert_eq!(map.at_or_below(-1.0), None);
        assert_eq!(map.at_or_below(0.0), Some((0.0, &"nozzle")));
        assert_eq!(map.at_or_below(9.99), Some((0.0, &"nozzle")));
        assert_eq!(map.at_or_below(10.0), Some((10.0, &"body")));
        assert_eq!(map.at_or_below(1000.0), Some((25.0, &"gantry")));
    }

    #[test]
    fn test_spans_and_overlapping() {
        let map = sample();
        let spans: Vec<_> = map.spans(f64::INFINITY).collect();
        assert_eq!(spans[0], (0.0, 10.0, &"nozzle"));
        assert_eq!(spans[2], (25.0, f64::INFINITY, &"gantry"));

        let hit: Vec<_> = map
            .overlapping(5.0, 12.0, f64::INFINITY)
            .map(|(_, _, v)| *v)
            .collect();
        assert_eq!(hit, vec!["nozzle", "body"]);

        // Touching at a boundary is not an overlap.
        let hit: Vec<_> = map.overlapping(10.0, 25.0, 30.0).map(|(_, _, v)| *v).collect();
        assert_eq!(hit, vec!["body"]);

        // Nothing above the top.
        assert_eq!(map.overlapping(30.0, 40.0, 30.0).count(), 0);
    }

    #[test]
    fn test_map_keeps_keys() {
        let lengths = sample().map(|_, v| v.len());
        assert_eq!(lengths.at_or_below(26.0), Some((25.0, &6)));
    }
}
