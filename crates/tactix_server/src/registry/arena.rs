//! Bounded slot arena with free-list reuse.
//!
//! Records are addressed by integer handle. Removal frees the slot in O(1)
//! and invalidates the handle; the slot index is reused by later insertions.
//! Handle identity, not position, is what callers hold on to.

/// Fixed-capacity arena of `T`.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
    capacity: usize,
}

impl<T> Arena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            capacity,
        }
    }

    /// Inserts a record, reusing a freed slot when one exists. Returns the
    /// handle, or `None` when the arena is at capacity.
    pub fn insert(&mut self, value: T) -> Option<usize> {
        let handle = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(value);
                slot
            }
            None => {
                if self.slots.len() >= self.capacity {
                    return None;
                }
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        };
        self.len += 1;
        Some(handle)
    }

    /// Removes the record at `handle`, freeing the slot for reuse.
    pub fn remove(&mut self, handle: usize) -> Option<T> {
        let value = self.slots.get_mut(handle)?.take()?;
        self.free.push(handle);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: usize) -> Option<&T> {
        self.slots.get(handle)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        self.slots.get_mut(handle)?.as_mut()
    }

    /// Iterates occupied slots as `(handle, record)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(handle, slot)| slot.as_ref().map(|value| (handle, value)))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }
}
