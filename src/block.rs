use crate::length::Length;
use crate::linear_select;
use crate::linked_list::{ManualLinkedList, Pool};

/// An unordered collection of vertices associated with a half-open distance
/// interval `[lower_bound, upper_bound)` and a soft capacity `M`.
///
/// `dhat` (the shared distance array) is threaded through as an explicit
/// argument to every operation that needs it rather than captured, since a
/// Block outlives any single borrow of it and is shared across recursion
/// levels.
#[derive(Debug)]
pub struct Block {
    items: ManualLinkedList,
    upper_bound: Length,
    lower_bound: Length,
    capacity: usize,
}

impl Block {
    pub fn new(pool: &Pool, upper_bound: Length, lower_bound: Length, capacity: usize) -> Block {
        Block {
            items: ManualLinkedList::new_list(pool),
            upper_bound,
            lower_bound,
            capacity,
        }
    }

    pub fn upper_bound(&self) -> Length {
        self.upper_bound
    }

    pub fn lower_bound(&self) -> Length {
        self.lower_bound
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size(&self) -> usize {
        self.items.size()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn oversized(&self) -> bool {
        self.size() > self.capacity
    }

    pub fn undersized(&self) -> bool {
        self.size() < self.capacity / 2
    }

    pub fn suit(&self, length: Length) -> bool {
        length < self.upper_bound && length >= self.lower_bound
    }

    pub fn contains(&self, v: usize) -> bool {
        self.items.contains(v)
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.items.to_vec()
    }

    pub fn add_item(&self, v: usize) {
        self.items.add(v);
    }

    pub fn count_no_greater(&self, dhat: &[Length], threshold: Length) -> usize {
        self.to_vec()
            .into_iter()
            .filter(|&v| dhat[v] <= threshold)
            .count()
    }

    pub fn min(&self, dhat: &[Length]) -> Length {
        self.to_vec()
            .into_iter()
            .map(|v| dhat[v])
            .min()
            .unwrap_or(self.upper_bound)
    }

    pub fn max(&self, dhat: &[Length]) -> Length {
        self.to_vec()
            .into_iter()
            .map(|v| dhat[v])
            .max()
            .unwrap_or(self.lower_bound)
    }

    /// The `q`-th smallest (1-indexed) `dhat` value among this block's
    /// members, via worst-case linear select on a transient vector.
    pub fn locate_min_q(&self, dhat: &[Length], q: usize) -> Length {
        let n = self.size();
        debug_assert!(q >= 1 && q <= n);
        if q == 1 {
            return self.min(dhat);
        }
        if q == n {
            return self.max(dhat);
        }
        let mut cache: Vec<Length> = self.to_vec().into_iter().map(|v| dhat[v]).collect();
        linear_select::locate_min_q(&mut cache, q, 0, 0)
    }

    /// Partitions items into a new Block (members with `dhat <` or `<=
    /// threshold`, depending on `strict`) and `self`, which keeps the rest
    /// and has its `lower_bound` raised to `threshold`. If `threshold >=
    /// upper_bound`, drains the whole block.
    pub fn extract_less_than_or_equal(
        &mut self,
        dhat: &[Length],
        pool: &Pool,
        threshold: Length,
        strict: bool,
    ) -> Block {
        let old_lower = self.lower_bound;
        let drain_all = threshold >= self.upper_bound;
        self.lower_bound = threshold;

        let new_list = ManualLinkedList::new_list(pool);
        for v in self.to_vec() {
            let matches = drain_all
                || if strict {
                    dhat[v] < threshold
                } else {
                    dhat[v] <= threshold
                };
            if matches {
                new_list.add(v);
            }
        }
        Block {
            items: new_list,
            upper_bound: threshold,
            lower_bound: old_lower,
            capacity: self.capacity,
        }
    }

    pub fn extract_min_q(&mut self, dhat: &[Length], pool: &Pool, q: usize) -> Block {
        let threshold = self.locate_min_q(dhat, q);
        self.extract_less_than_or_equal(dhat, pool, threshold, false)
    }

    /// Extracts and returns the smaller half; the caller keeps the larger
    /// half in `self`.
    pub fn split_at_median(&mut self, dhat: &[Length], pool: &Pool) -> Block {
        let q = (self.size() / 2).max(1);
        self.extract_min_q(dhat, pool, q)
    }

    pub fn merge(&mut self, other: Block) {
        self.items.merge(&other.items);
        self.upper_bound = self.upper_bound.max(other.upper_bound);
        self.lower_bound = self.lower_bound.min(other.lower_bound);
    }

    pub fn remove_unsuit(&mut self, dhat: &[Length]) {
        for v in self.to_vec() {
            if !self.suit(dhat[v]) {
                self.items.erase(v);
            }
        }
    }

    pub fn extend_lower_bound(&mut self, new_lower_bound: Length) {
        self.lower_bound = self.lower_bound.min(new_lower_bound);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linked_list::ManualLinkedListBase;

    fn dhat_fixture(n: usize) -> Vec<Length> {
        (0..n)
            .map(|v| Length {
                length: ordered_float::OrderedFloat(v as f64),
                num_of_edges: 1,
                prev_vertex: 0,
                this_vertex: v,
            })
            .collect()
    }

    #[test]
    fn oversized_and_undersized() {
        let pool = ManualLinkedListBase::new(10);
        let block = Block::new(&pool, Length::infinity(), Length::zero(), 4);
        for v in 0..5 {
            block.add_item(v);
        }
        assert!(block.oversized());
        assert!(!block.undersized());
    }

    #[test]
    fn locate_min_q_matches_min_max_boundaries() {
        let pool = ManualLinkedListBase::new(10);
        let dhat = dhat_fixture(10);
        let block = Block::new(&pool, Length::infinity(), Length::zero(), 10);
        for v in [5, 1, 8, 3, 2] {
            block.add_item(v);
        }
        assert_eq!(block.locate_min_q(&dhat, 1), block.min(&dhat));
        assert_eq!(block.locate_min_q(&dhat, block.size()), block.max(&dhat));
    }

    #[test]
    fn extract_less_than_or_equal_partitions_and_raises_lower_bound() {
        let pool = ManualLinkedListBase::new(10);
        let dhat = dhat_fixture(10);
        let mut block = Block::new(&pool, Length::infinity(), Length::zero(), 10);
        for v in 0..6 {
            block.add_item(v);
        }
        let threshold = dhat[2];
        let extracted = block.extract_less_than_or_equal(&dhat, &pool, threshold, false);
        let mut extracted_ids = extracted.to_vec();
        extracted_ids.sort_unstable();
        assert_eq!(extracted_ids, vec![0, 1, 2]);
        let mut remaining = block.to_vec();
        remaining.sort_unstable();
        assert_eq!(remaining, vec![3, 4, 5]);
        assert_eq!(block.lower_bound(), threshold);
    }

    #[test]
    fn split_at_median_gives_caller_the_smaller_half() {
        let pool = ManualLinkedListBase::new(10);
        let dhat = dhat_fixture(10);
        let mut block = Block::new(&pool, Length::infinity(), Length::zero(), 10);
        for v in 0..7 {
            block.add_item(v);
        }
        let smaller_half = block.split_at_median(&dhat, &pool);
        assert!(smaller_half.size() <= block.size());
        assert_eq!(smaller_half.size() + block.size(), 7);
    }

    #[test]
    fn remove_unsuit_drops_items_outside_interval() {
        let pool = ManualLinkedListBase::new(10);
        let mut dhat = dhat_fixture(10);
        let mut block = Block::new(
            &pool,
            Length {
                length: ordered_float::OrderedFloat(5.0),
                ..Length::infinity()
            },
            Length::zero(),
            10,
        );
        for v in 0..5 {
            block.add_item(v);
        }
        dhat[3] = Length {
            length: ordered_float::OrderedFloat(99.0),
            num_of_edges: 1,
            prev_vertex: 0,
            this_vertex: 3,
        };
        block.remove_unsuit(&dhat);
        assert!(!block.contains(3));
        assert_eq!(block.size(), 4);
    }
}
