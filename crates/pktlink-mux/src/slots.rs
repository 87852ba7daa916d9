//! Fixed-capacity slot storage with first-fit allocation.
//!
//! Both the outbound queue and the registration table are arrays of slots
//! that never grow. New entries always take the lowest free index, and
//! scans always run in index order; frame grouping and dispatch order
//! depend on that.

/// A fixed number of slots, each empty or holding one `T`.
#[derive(Debug, Clone)]
pub struct SlotArena<T> {
    slots: Box<[Option<T>]>,
}

impl<T> SlotArena<T> {
    /// Allocate `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Whether no slot is free.
    pub fn is_full(&self) -> bool {
        self.first_free().is_none()
    }

    /// Lowest-index empty slot.
    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Lowest-index occupied slot.
    pub fn first_occupied(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_some)
    }

    /// Lowest-index occupied slot whose value matches `pred`.
    pub fn position(&self, mut pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(&mut pred))
    }

    /// Store `value` in the lowest free slot and return its index.
    ///
    /// Hands the value back if every slot is occupied.
    pub fn insert(&mut self, value: T) -> Result<usize, T> {
        match self.first_free() {
            Some(index) => {
                self.slots[index] = Some(value);
                Ok(index)
            }
            None => Err(value),
        }
    }

    /// Value at `index`, if occupied.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Mutable value at `index`, if occupied.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Empty the slot at `index` and return what it held.
    pub fn take(&mut self, index: usize) -> Option<T> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }

    /// Mutable occupied slots in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (i, v)))
    }
}
