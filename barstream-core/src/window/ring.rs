//! Fixed-capacity FIFO ring buffer.

/// Ring buffer holding at most `capacity` elements.
///
/// Pushing into a full buffer overwrites the oldest element and returns it.
/// Logical index 0 is always the oldest element.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: Vec<T>,
    head: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "ring buffer capacity must be >= 1");
        Self {
            buf: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    /// Slots currently allocated: `capacity` while in use, 0 after `clear`.
    pub fn allocated(&self) -> usize {
        self.buf.capacity()
    }

    /// Append `value`, returning the evicted oldest element if the buffer was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.buf.len() < self.capacity {
            if self.buf.capacity() == 0 {
                self.buf.reserve_exact(self.capacity);
            }
            self.buf.push(value);
            None
        } else {
            let evicted = std::mem::replace(&mut self.buf[self.head], value);
            self.head = (self.head + 1) % self.capacity;
            Some(evicted)
        }
    }

    fn physical(&self, index: usize) -> usize {
        (self.head + index) % self.capacity
    }

    /// Element at logical `index` (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.buf.len() {
            Some(&self.buf[self.physical(index)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.buf.len() {
            let i = self.physical(index);
            Some(&mut self.buf[i])
        } else {
            None
        }
    }

    /// Element `age` positions back from the newest (0 = newest).
    pub fn get_from_newest(&self, age: usize) -> Option<&T> {
        let len = self.buf.len();
        if age < len {
            self.get(len - 1 - age)
        } else {
            None
        }
    }

    pub fn get_from_newest_mut(&mut self, age: usize) -> Option<&mut T> {
        let len = self.buf.len();
        if age < len {
            self.get_mut(len - 1 - age)
        } else {
            None
        }
    }

    pub fn newest(&self) -> Option<&T> {
        self.get_from_newest(0)
    }

    pub fn oldest(&self) -> Option<&T> {
        self.get(0)
    }

    /// Iterate oldest → newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (tail, front) = self.buf.split_at(self.head);
        front.iter().chain(tail.iter())
    }

    /// Discard all elements and release the storage. The next push
    /// reallocates exactly `capacity` slots.
    pub fn clear(&mut self) {
        self.buf = Vec::new();
        self.head = 0;
    }
}
