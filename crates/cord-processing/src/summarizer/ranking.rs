//! Frequency counting with first-seen tie breaking.

use std::collections::HashMap;
use std::hash::Hash;

/// Counts occurrences while remembering the order keys were first seen.
///
/// Ranking sorts by count descending; equal counts keep first-seen order.
#[derive(Debug, Clone)]
pub(crate) struct FrequencyCounter<K> {
    order: Vec<(K, usize)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> FrequencyCounter<K> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&pos) => self.order[pos].1 += 1,
            None => {
                self.index.insert(key.clone(), self.order.len());
                self.order.push((key, 1));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// All keys by descending count.
    pub fn into_ranked(self) -> Vec<(K, usize)> {
        let mut ranked = self.order;
        // stable: ties stay in first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The `n` most frequent keys.
    pub fn into_top(self, n: usize) -> Vec<(K, usize)> {
        let mut ranked = self.into_ranked();
        ranked.truncate(n);
        ranked
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for FrequencyCounter<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut counter = Self::new();
        for key in iter {
            counter.add(key);
        }
        counter
    }
}
