//! Eager, immutable-output query container for derived statistics.
//!
//! A [`Query`] closes over a fixed backing sequence at construction. Every
//! operation is pure and materializes a new container, so chained
//! statistics stay referentially transparent and obey simple equational
//! laws (`map` fusion, count preservation under `group`, and so on).

use std::cmp::Ordering;

/// Chainable query over an ordered in-memory sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<T> {
    items: Vec<T>,
}

impl<T> Query<T> {
    /// Close over a backing sequence.
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Number of elements.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// First element, if any.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Last element, if any.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Iterate over the backing sequence without materializing.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Fold all elements into a single value.
    pub fn reduce<U>(&self, f: impl FnMut(U, &T) -> U, initial: U) -> U {
        self.items.iter().fold(initial, f)
    }

    /// Transform every element, preserving order.
    #[must_use]
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Query<U> {
        Query::new(self.items.iter().map(f).collect())
    }
}

impl<T: Clone> Query<T> {
    /// Elements satisfying the predicate, in their original relative order.
    #[must_use]
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        Self::new(
            self.items
                .iter()
                .filter(|item| predicate(item))
                .cloned()
                .collect(),
        )
    }

    /// Stable sort by a comparable key.
    ///
    /// Keys that cannot be ordered against each other (NaN floats) compare
    /// as equal, keeping the sort stable rather than panicking.
    #[must_use]
    pub fn sort<K: PartialOrd>(&self, key: impl Fn(&T) -> K, ascending: bool) -> Self {
        let mut items = self.items.clone();
        items.sort_by(|a, b| {
            let ordering = key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal);
            if ascending { ordering } else { ordering.reverse() }
        });
        Self::new(items)
    }

    /// Partition into `(key, sub-query)` pairs.
    ///
    /// Key equality is by value; groups appear in first-occurrence order
    /// and each preserves the relative order of its members.
    #[must_use]
    pub fn group<K: PartialEq + Clone>(&self, key: impl Fn(&T) -> K) -> Query<(K, Self)> {
        let mut groups: Vec<(K, Vec<T>)> = Vec::new();
        for item in &self.items {
            let item_key = key(item);
            match groups.iter_mut().find(|(existing, _)| *existing == item_key) {
                Some((_, members)) => members.push(item.clone()),
                None => groups.push((item_key, vec![item.clone()])),
            }
        }
        Query::new(
            groups
                .into_iter()
                .map(|(key, members)| (key, Self::new(members)))
                .collect(),
        )
    }

    /// At most the first `n` elements.
    #[must_use]
    pub fn limit(&self, n: usize) -> Self {
        Self::new(self.items.iter().take(n).cloned().collect())
    }

    /// Everything after the first `n` elements.
    #[must_use]
    pub fn skip(&self, n: usize) -> Self {
        Self::new(self.items.iter().skip(n).cloned().collect())
    }

    /// Materialize the backing sequence.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<T> From<Vec<T>> for Query<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for Query<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Query<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
