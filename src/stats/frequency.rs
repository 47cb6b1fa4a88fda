//! Insertion-ordered frequency counting.
//!
//! Every tie in this crate is broken by scan order, so counts are kept in
//! first-seen order next to a hash index.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    index: HashMap<K, usize>,
    counts: Vec<(K, usize)>,
}

impl<K: Eq + Hash + Clone> FrequencyTable<K> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            counts: Vec::new(),
        }
    }

    /// Counts one occurrence of `key` and returns its new count.
    pub fn add(&mut self, key: K) -> usize {
        match self.index.get(&key) {
            Some(&slot) => {
                self.counts[slot].1 += 1;
                self.counts[slot].1
            }
            None => {
                self.index.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
                1
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Most frequent key; on a tie, the one seen first.
    pub fn mode(&self) -> Option<&K> {
        let mut best: Option<&(K, usize)> = None;
        for entry in &self.counts {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(k, _)| k)
    }

    /// Keys with counts, most frequent first; equal counts keep first-seen
    /// order.
    pub fn into_sorted(self) -> Vec<(K, usize)> {
        let mut counts = self.counts;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

impl<K: Eq + Hash + Clone> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::new();
        for key in iter {
            table.add(key);
        }
        table
    }
}

/// Mode of a sequence with first-occurrence tie-break.
pub fn mode<K, I>(values: I) -> Option<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    values.into_iter().collect::<FrequencyTable<K>>().mode().cloned()
}

/// The first key to reach the highest count while scanning in order.
///
/// Differs from [`mode`] on ties: for `[P, Q, Q, P]` this returns `Q`,
/// because `Q` reaches two occurrences before `P` does.
pub fn running_leader<K, I>(values: I) -> Option<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut table = FrequencyTable::new();
    let mut leader: Option<(K, usize)> = None;

    for key in values {
        let count = table.add(key.clone());
        if leader.as_ref().is_none_or(|(_, best)| count > *best) {
            leader = Some((key, count));
        }
    }
    leader.map(|(k, _)| k)
}
