//! Fixed-capacity ring buffer
//!
//! Storage is allocated once at construction and never grows past the
//! configured capacity. Pushing into a full buffer overwrites the oldest
//! element. Reads hand out copies or borrowed iterators; nothing aliases the
//! live storage mutably.

/// Drop-oldest FIFO with a hard capacity
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Backing storage (len <= capacity)
    slots: Vec<T>,
    /// Maximum number of elements
    capacity: usize,
    /// Index of the oldest element once the buffer has wrapped
    head: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Append a value, evicting the oldest one when full
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
        } else {
            self.slots[self.head] = value;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Number of stored elements
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Element by age, 0 = oldest
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.slots.len() {
            return None;
        }
        Some(&self.slots[(self.head + index) % self.slots.len()])
    }

    /// Most recently pushed element
    pub fn last(&self) -> Option<&T> {
        let len = self.slots.len();
        if len == 0 {
            None
        } else {
            Some(&self.slots[(self.head + len - 1) % len])
        }
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Drop all elements, keeping the allocation
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy of the contents, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Push every element of a slice in order
    pub fn extend_from_slice(&mut self, values: &[T]) {
        for value in values {
            self.push(value.clone());
        }
    }
}
