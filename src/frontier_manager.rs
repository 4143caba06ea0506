//! The "D" structure of Lemma 3.3: two sequences of Blocks, D0 (a
//! block-wise monotone sequence fed by batch-prepends) and D1 (an ordered
//! map keyed by block upper bound, fed by single inserts), together
//! exposing `insert`, `batch_prepend`, and `pull` with the amortized bounds
//! the BMSSP recursion depends on.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::block::Block;
use crate::error::{Error, Result};
use crate::length::Length;
use crate::linked_list::Pool;

type BlockRef = Rc<RefCell<Block>>;

pub struct FrontierManager {
    pool: Pool,
    d0: VecDeque<BlockRef>,
    d1: BTreeMap<Length, BlockRef>,
    m: usize,
    upper_bound: Length,
    current_lower_bound: Length,
}

fn take_block(rc: BlockRef) -> Block {
    Rc::try_unwrap(rc)
        .unwrap_or_else(|_| panic!("frontier block unexpectedly shared"))
        .into_inner()
}

impl FrontierManager {
    pub fn new(pool: &Pool, m: usize, upper_bound: Length) -> Self {
        FrontierManager {
            pool: Rc::clone(pool),
            d0: VecDeque::new(),
            d1: BTreeMap::new(),
            m,
            upper_bound,
            current_lower_bound: upper_bound,
        }
    }

    pub fn current_lower_bound(&self) -> Length {
        self.current_lower_bound
    }

    pub fn upper_bound(&self) -> Length {
        self.upper_bound
    }

    pub fn is_empty(&self) -> bool {
        self.d0.iter().all(|b| b.borrow().is_empty()) && self.d1.iter().all(|(_, b)| b.borrow().is_empty())
    }

    fn new_block(&self, upper_bound: Length, lower_bound: Length) -> Block {
        Block::new(&self.pool, upper_bound, lower_bound, self.m)
    }

    /// §4.5.1 Insert(v).
    pub fn insert(&mut self, v: usize, dhat: &[Length]) -> Result<()> {
        let d = dhat[v];
        if d >= self.upper_bound {
            return Ok(());
        }
        self.current_lower_bound = self.current_lower_bound.min(d);

        if self.d1.is_empty() {
            let default_block = self.new_block(self.upper_bound, Length::zero());
            self.d1
                .insert(self.upper_bound, Rc::new(RefCell::new(default_block)));
        }

        let key = *self
            .d1
            .range((std::ops::Bound::Excluded(d), std::ops::Bound::Unbounded))
            .next()
            .map(|(k, _)| k)
            .ok_or_else(|| Error::invariant("frontier insert found no suitable block for vertex"))?;

        let block_ref = Rc::clone(self.d1.get(&key).unwrap());
        block_ref.borrow().add_item(v);

        let oversized = block_ref.borrow().oversized();
        if oversized {
            let smaller = {
                let mut block_mut = block_ref.borrow_mut();
                block_mut.split_at_median(dhat, &self.pool)
            };
            let smaller_key = smaller.upper_bound();
            self.d1.insert(smaller_key, Rc::new(RefCell::new(smaller)));
        }
        Ok(())
    }

    /// §4.5.2 BatchPrepend(K). Caller is responsible for `K.upper_bound <=
    /// current_lower_bound` and for updating `current_lower_bound`
    /// afterwards based on `K`'s contents.
    pub fn batch_prepend(&mut self, k: Block, dhat: &[Length]) -> Result<()> {
        if k.is_empty() {
            return Ok(());
        }
        if k.upper_bound() > self.current_lower_bound {
            return Err(Error::invariant(
                "batch_prepend precondition violated: K.upper_bound > currentLowerBound",
            ));
        }
        if k.oversized() {
            let mut larger = k;
            let smaller = larger.split_at_median(dhat, &self.pool);
            // Recurse on the larger half first so the smaller half's own
            // pushes land in front of it, preserving D0's monotone order.
            self.batch_prepend(larger, dhat)?;
            self.batch_prepend(smaller, dhat)?;
        } else {
            self.d0.push_front(Rc::new(RefCell::new(k)));
        }
        Ok(())
    }

    fn reinsert_residual_d0(&mut self, mut s0g: Block, dhat: &[Length]) {
        if s0g.undersized() && !self.d0.is_empty() {
            let front = self.d0.pop_front().unwrap();
            let mut combined = take_block(front);
            combined.merge(s0g);
            if combined.oversized() {
                let smaller = combined.split_at_median(dhat, &self.pool);
                self.d0.push_front(Rc::new(RefCell::new(combined)));
                s0g = smaller;
            } else {
                s0g = combined;
            }
        }
        if s0g.oversized() {
            let smaller = s0g.split_at_median(dhat, &self.pool);
            self.d0.push_front(Rc::new(RefCell::new(s0g)));
            self.d0.push_front(Rc::new(RefCell::new(smaller)));
        } else if !s0g.is_empty() {
            self.d0.push_front(Rc::new(RefCell::new(s0g)));
        }
    }

    fn reinsert_residual_d1(&mut self, mut s1g: Block, dhat: &[Length]) {
        if s1g.undersized() && !self.d1.is_empty() {
            let (_, front) = self.d1.pop_first().unwrap();
            let mut combined = take_block(front);
            combined.merge(s1g);
            if combined.oversized() {
                let smaller = combined.split_at_median(dhat, &self.pool);
                let key = combined.upper_bound();
                self.d1.insert(key, Rc::new(RefCell::new(combined)));
                s1g = smaller;
            } else {
                s1g = combined;
            }
        }
        if s1g.oversized() {
            let smaller = s1g.split_at_median(dhat, &self.pool);
            let key_large = s1g.upper_bound();
            self.d1.insert(key_large, Rc::new(RefCell::new(s1g)));
            let key_small = smaller.upper_bound();
            self.d1.insert(key_small, Rc::new(RefCell::new(smaller)));
        } else if !s1g.is_empty() {
            let key = s1g.upper_bound();
            self.d1.insert(key, Rc::new(RefCell::new(s1g)));
        }
    }

    fn pull_m1(&mut self, dhat: &[Length]) -> Result<(Length, Block)> {
        while let Some(front) = self.d0.front() {
            if front.borrow().is_empty() {
                self.d0.pop_front();
            } else {
                break;
            }
        }
        loop {
            let Some(key) = self.d1.keys().next().copied() else {
                break;
            };
            let empty = self.d1.get(&key).unwrap().borrow().is_empty();
            if empty {
                self.d1.remove(&key);
            } else {
                break;
            }
        }

        let d0_min = self.d0.front().map(|b| b.borrow().min(dhat));
        let d1_min = self.d1.values().next().map(|b| b.borrow().min(dhat));

        let picked = match (d0_min, d1_min) {
            (None, None) => {
                self.current_lower_bound = self.upper_bound;
                return Ok((self.upper_bound, self.new_block(self.upper_bound, self.current_lower_bound)));
            }
            (Some(_), None) => take_block(self.d0.pop_front().unwrap()),
            (None, Some(_)) => take_block(self.d1.pop_first().unwrap().1),
            (Some(a), Some(b)) => {
                if a <= b {
                    take_block(self.d0.pop_front().unwrap())
                } else {
                    take_block(self.d1.pop_first().unwrap().1)
                }
            }
        };

        let d0_remaining = self.d0.front().map(|b| b.borrow().min(dhat));
        let d1_remaining = self.d1.values().next().map(|b| b.borrow().min(dhat));
        let remaining_min = match (d0_remaining, d1_remaining) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => self.upper_bound,
        };
        self.current_lower_bound = remaining_min;
        Ok((remaining_min, picked))
    }

    /// §4.5.3 Pull(). Returns up to `M` smallest vertices and the bound
    /// separating them from everything still resident.
    pub fn pull(&mut self, dhat: &[Length]) -> Result<(Length, Block)> {
        if self.m <= 1 {
            return self.pull_m1(dhat);
        }

        let mut s0 = self.new_block(self.upper_bound, self.current_lower_bound);
        while s0.size() <= self.m {
            let Some(front) = self.d0.pop_front() else {
                break;
            };
            s0.merge(take_block(front));
        }

        let mut s1 = self.new_block(self.upper_bound, self.current_lower_bound);
        while s1.size() <= self.m {
            let Some((_, front)) = self.d1.pop_first() else {
                break;
            };
            s1.merge(take_block(front));
        }

        if s0.size() + s1.size() <= self.m {
            s0.merge(s1);
            self.current_lower_bound = self.upper_bound;
            return Ok((self.upper_bound, s0));
        }

        let mut cache: Vec<Length> = s0.to_vec().into_iter().map(|v| dhat[v]).collect();
        cache.extend(s1.to_vec().into_iter().map(|v| dhat[v]));
        let x = crate::linear_select::locate_min_q(&mut cache, self.m + 1, 0, 0);

        let s0l = s0.extract_less_than_or_equal(dhat, &self.pool, x, true);
        let s1l = s1.extract_less_than_or_equal(dhat, &self.pool, x, true);
        let mut output = s0l;
        output.merge(s1l);

        self.reinsert_residual_d0(s0, dhat);
        self.reinsert_residual_d1(s1, dhat);

        self.current_lower_bound = x;
        Ok((x, output))
    }
}
