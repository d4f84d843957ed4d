//! Dense bitsets over small ranges of winding numbers.

use crate::path::WindingRule;

use std::collections::BTreeSet;

const WORD_BITS: usize = 64;

/// A set of winding numbers over a bounded range `[begin, end)`, stored as a
/// small dense bitset.
///
/// Ranges are always bounded by the winding numbers actually observed in a
/// path, which keeps these sets tiny in practice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindingSet {
    begin: i32,
    end: i32,
    bits: Vec<u64>,
}

impl WindingSet {
    pub fn new() -> Self {
        WindingSet::default()
    }

    pub fn clear(&mut self) {
        self.begin = 0;
        self.end = 0;
        self.bits.clear();
    }

    pub fn begin(&self) -> i32 {
        self.begin
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    /// Marks the winding numbers in `[min_value, max_value]` selected by
    /// `rule`, or by its complement when `complement` is true.
    pub fn extract_from_fill_rule(
        &mut self,
        min_value: i32,
        max_value: i32,
        rule: &dyn WindingRule,
        complement: bool,
    ) {
        debug_assert!(min_value <= max_value);
        self.reset_range(min_value, max_value + 1);
        for w in self.begin..self.end {
            if rule.is_filled(w) != complement {
                self.insert(w);
            }
        }
    }

    /// Rebuilds the set from an explicit collection of winding numbers.
    pub fn extract_from_set(&mut self, values: &BTreeSet<i32>) {
        self.clear();
        let (min, max) = match (values.iter().next(), values.iter().next_back()) {
            (Some(min), Some(max)) => (*min, *max),
            _ => return,
        };

        self.reset_range(min, max + 1);
        for w in values {
            self.insert(*w);
        }
    }

    pub fn has(&self, w: i32) -> bool {
        if w < self.begin || w >= self.end {
            return false;
        }
        let idx = (w - self.begin) as usize;
        self.bits[idx / WORD_BITS] & (1 << (idx % WORD_BITS)) != 0
    }

    /// Whether the two sets share at least one winding number.
    pub fn intersects(&self, other: &WindingSet) -> bool {
        let begin = self.begin.max(other.begin);
        let end = self.end.min(other.end);
        for w in begin..end {
            if self.has(w) && other.has(w) {
                return true;
            }
        }
        false
    }

    fn reset_range(&mut self, begin: i32, end: i32) {
        debug_assert!(begin <= end);
        self.begin = begin;
        self.end = end;
        let words = ((end - begin) as usize + WORD_BITS - 1) / WORD_BITS;
        self.bits.clear();
        self.bits.resize(words, 0);
    }

    fn insert(&mut self, w: i32) {
        debug_assert!(w >= self.begin && w < self.end);
        let idx = (w - self.begin) as usize;
        self.bits[idx / WORD_BITS] |= 1 << (idx % WORD_BITS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::FillRule;

    #[test]
    fn from_rule() {
        let mut set = WindingSet::new();
        set.extract_from_fill_rule(-2, 3, &FillRule::NonZero, false);
        assert!(!set.has(0));
        for w in &[-2, -1, 1, 2, 3] {
            assert!(set.has(*w));
        }
        assert!(!set.has(4));
        assert!(!set.has(-3));

        let mut complement = WindingSet::new();
        complement.extract_from_fill_rule(-2, 3, &FillRule::NonZero, true);
        assert!(complement.has(0));
        assert!(!complement.has(1));
        assert!(!set.intersects(&complement));
    }

    #[test]
    fn from_set() {
        let mut values = BTreeSet::new();
        values.insert(-70);
        values.insert(0);
        values.insert(65);

        let mut set = WindingSet::new();
        set.extract_from_set(&values);
        assert_eq!(set.begin(), -70);
        assert_eq!(set.end(), 66);
        assert!(set.has(-70));
        assert!(set.has(0));
        assert!(set.has(65));
        assert!(!set.has(1));
        assert!(!set.has(64));
    }

    #[test]
    fn intersections() {
        let mut a = WindingSet::new();
        a.extract_from_fill_rule(0, 4, &FillRule::EvenOdd, false);

        let mut b = WindingSet::new();
        b.extract_from_fill_rule(2, 8, &FillRule::EvenOdd, false);
        assert!(a.intersects(&b));

        let mut c = WindingSet::new();
        c.extract_from_fill_rule(4, 8, &FillRule::EvenOdd, false);
        assert!(!a.intersects(&c));

        let empty = WindingSet::new();
        assert!(!a.intersects(&empty));
    }
}
