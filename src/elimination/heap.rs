//! A max-heap over per-candidate weights that supports random access by
//! candidate id.  Alongside the conventional heap array it maintains the
//! inverse mapping from id to heap slot, which makes "this id's weight just
//! went down, restore the heap property" an O(log N) operation with no search
//! and no per-node allocation.
//!
//! Slots are 1-based so that the parent/child arithmetic stays in the classic
//! `s/2`, `2s`, `2s+1` form; slot 0 of the id array is never used.  A popped id
//! is not discarded: it is parked in the slot just past the active range, so
//! after the elimination loop the heap array reads as the surviving ids
//! followed by the eliminated ids in reverse order of removal.

/// An indexed max-heap over f64 weights.  The heap owns the weight table;
/// weights can only change through [`IndexedMaxHeap::decrease`], which keeps
/// the table and the heap ordering consistent with each other.
pub struct IndexedMaxHeap {
    weights: Vec<f64>,

    /// Heap slot of each id, 1-based.  A slot greater than `active` means the
    /// id has been popped.
    slot_of_id: Vec<usize>,

    /// Id stored in each heap slot; index 0 is unused.
    id_at_slot: Vec<usize>,

    /// Number of ids still in the heap.  Slots `1..=active` satisfy the
    /// max-heap property; slots above hold popped ids.
    active: usize,
}

impl IndexedMaxHeap {
    /// Build a heap over the given weight table in O(N) with a bottom-up
    /// sift-down pass.  Id `i` refers to `weights[i]`.
    pub fn build(weights: Vec<f64>) -> Self {
        let n = weights.len();
        let mut heap = Self {
            weights,
            slot_of_id: (1..=n).collect(),
            id_at_slot: (0..=n).map(|s| s.saturating_sub(1)).collect(),
            active: n,
        };
        for slot in (1..=n / 2).rev() {
            heap.sift_down(slot);
        }
        heap
    }

    /// The total number of ids, including popped ones.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The number of ids still in the heap.
    pub fn active_len(&self) -> usize {
        self.active
    }

    /// The id with the largest weight.  Meaningless when `active_len` is zero.
    pub fn top_id(&self) -> usize {
        debug_assert!(self.active > 0);
        self.id_at_slot[1]
    }

    /// The largest weight currently in the heap.
    pub fn top_weight(&self) -> f64 {
        self.weights[self.top_id()]
    }

    /// The current weight of an id, whether or not it is still in the heap.
    pub fn weight_of(&self, id: usize) -> f64 {
        self.weights[id]
    }

    /// Whether an id is still in the heap or has been popped.
    pub fn is_active(&self, id: usize) -> bool {
        self.slot_of_id[id] <= self.active
    }

    /// Read the heap array at a 0-based rank.  Ranks `0..active_len` hold the
    /// ids still in the heap (rank 0 being the maximum); ranks past that hold
    /// the popped ids, most recently popped first, so the full range enumerates
    /// survivors followed by the eliminated in reverse order of removal.
    pub fn id_at_rank(&self, rank: usize) -> usize {
        self.id_at_slot[rank + 1]
    }

    /// Remove and return the id with the largest weight.  The id keeps its
    /// weight and is parked just past the active range.
    pub fn pop(&mut self) -> usize {
        debug_assert!(self.active > 0);
        let id = self.id_at_slot[1];
        self.swap_slots(1, self.active);
        self.active -= 1;
        self.sift_down(1);
        id
    }

    /// Subtract `amount` from the weight of `id` and restore the heap property
    /// by sifting its slot down.  A decreased weight can only violate the
    /// ordering toward the leaves, so no upward pass is needed.  If the id has
    /// already been popped its weight is still updated but the heap is left
    /// untouched.
    pub fn decrease(&mut self, id: usize, amount: f64) {
        self.weights[id] -= amount;
        let slot = self.slot_of_id[id];
        if slot <= self.active {
            self.sift_down(slot);
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let mut child = slot * 2;
        while child + 1 <= self.active {
            if self.slot_less(child, child + 1) {
                child += 1;
            }
            if !self.slot_less(slot, child) {
                return;
            }
            self.swap_slots(slot, child);
            slot = child;
            child = slot * 2;
        }
        // A node with a single child at the very end of the active range.
        if child <= self.active && self.slot_less(slot, child) {
            self.swap_slots(slot, child);
        }
    }

    fn slot_less(&self, s1: usize, s2: usize) -> bool {
        self.weights[self.id_at_slot[s1]] < self.weights[self.id_at_slot[s2]]
    }

    fn swap_slots(&mut self, s1: usize, s2: usize) {
        self.id_at_slot.swap(s1, s2);
        self.slot_of_id[self.id_at_slot[s1]] = s1;
        self.slot_of_id[self.id_at_slot[s2]] = s2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pops_in_descending_weight_order() {
        let mut heap = IndexedMaxHeap::build(vec![0.5, 2.0, 1.5, 0.25, 3.0]);
        assert_eq!(heap.active_len(), 5);
        assert_eq!(heap.top_id(), 4);

        let order: Vec<usize> = (0..5).map(|_| heap.pop()).collect();
        assert_eq!(order, vec![4, 1, 2, 0, 3]);
        assert_eq!(heap.active_len(), 0);
    }

    #[test]
    fn decrease_reorders_the_top() {
        let mut heap = IndexedMaxHeap::build(vec![1.0, 5.0, 3.0]);
        assert_eq!(heap.top_id(), 1);

        heap.decrease(1, 4.5);
        assert_eq!(heap.top_id(), 2);
        assert_relative_eq!(heap.weight_of(1), 0.5, epsilon = 1e-12);
        assert_eq!(heap.pop(), 2);
        assert_eq!(heap.pop(), 0);
        assert_eq!(heap.pop(), 1);
    }

    #[test]
    fn popped_ids_read_back_in_reverse_removal_order() {
        let mut heap = IndexedMaxHeap::build(vec![4.0, 1.0, 3.0, 2.0]);
        let first = heap.pop();
        let second = heap.pop();
        assert_eq!(first, 0);
        assert_eq!(second, 2);

        // Ranks 0..2 are the active survivors, ranks 2..4 the eliminated ids
        // with the most recently removed first.
        assert_eq!(heap.active_len(), 2);
        assert_eq!(heap.id_at_rank(2), second);
        assert_eq!(heap.id_at_rank(3), first);

        let active: Vec<usize> = (0..2).map(|r| heap.id_at_rank(r)).collect();
        assert!(active.contains(&1));
        assert!(active.contains(&3));
    }

    #[test]
    fn decrease_after_pop_updates_weight_but_not_the_heap() {
        let mut heap = IndexedMaxHeap::build(vec![2.0, 1.0]);
        let popped = heap.pop();
        assert_eq!(popped, 0);
        assert!(!heap.is_active(popped));

        heap.decrease(popped, 0.5);
        assert_relative_eq!(heap.weight_of(popped), 1.5, epsilon = 1e-12);
        assert_eq!(heap.top_id(), 1);
        assert_eq!(heap.active_len(), 1);
    }

    #[test]
    fn build_handles_degenerate_sizes() {
        let heap = IndexedMaxHeap::build(Vec::new());
        assert!(heap.is_empty());
        assert_eq!(heap.active_len(), 0);

        let mut heap = IndexedMaxHeap::build(vec![1.25]);
        assert_eq!(heap.top_id(), 0);
        assert_eq!(heap.pop(), 0);
        assert_eq!(heap.active_len(), 0);
    }

    #[test]
    fn equal_weights_break_ties_deterministically() {
        let pops = |mut heap: IndexedMaxHeap| -> Vec<usize> {
            (0..heap.len()).map(|_| heap.pop()).collect()
        };
        let a = pops(IndexedMaxHeap::build(vec![1.0; 6]));
        let b = pops(IndexedMaxHeap::build(vec![1.0; 6]));
        assert_eq!(a, b);
    }
}
