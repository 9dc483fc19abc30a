//! Queue: FIFO over a circular buffer that doubles when full.

use crate::array::write_list;
use crate::error::ContainerError;
use core::fmt;

/// Buffer size used when zero is requested.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

#[derive(Clone, Debug)]
pub struct Queue<T> {
    buf: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> Queue<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_QUEUE_CAPACITY
        } else {
            capacity
        };
        Self {
            buf: core::iter::repeat_with(|| None).take(capacity).collect(),
            head: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current buffer size; grows by doubling.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn enqueue(&mut self, value: T) {
        if self.len == self.buf.len() {
            self.grow();
        }
        let tail = (self.head + self.len) % self.buf.len();
        self.buf[tail] = Some(value);
        self.len += 1;
    }

    pub fn dequeue(&mut self) -> Result<T, ContainerError> {
        if self.len == 0 {
            return Err(ContainerError::Empty);
        }
        let value = self.buf[self.head].take().ok_or(ContainerError::Empty)?;
        self.head = (self.head + 1) % self.buf.len();
        self.len -= 1;
        Ok(value)
    }

    pub fn peek(&self) -> Result<&T, ContainerError> {
        if self.len == 0 {
            return Err(ContainerError::Empty);
        }
        self.buf[self.head].as_ref().ok_or(ContainerError::Empty)
    }

    pub fn clear(&mut self) {
        for slot in self.buf.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let cap = self.buf.len();
        (0..self.len).filter_map(move |i| self.buf[(self.head + i) % cap].as_ref())
    }

    // Unrolls the ring so the front lands at index 0.
    fn grow(&mut self) {
        let new_capacity = self.buf.len() * 2;
        let cap = self.buf.len();
        let mut next: Vec<Option<T>> = Vec::with_capacity(new_capacity);
        for i in 0..self.len {
            next.push(self.buf[(self.head + i) % cap].take());
        }
        next.resize_with(new_capacity, || None);
        self.buf = next;
        self.head = 0;
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut q = Queue::default();
        for item in iter {
            q.enqueue(item);
        }
        q
    }
}

impl<T: fmt::Display> fmt::Display for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_across_wraparound_and_growth() {
        let mut q = Queue::new(3);
        q.enqueue(1);
        q.enqueue(2);
        assert_eq!(q.dequeue(), Ok(1));
        q.enqueue(3);
        q.enqueue(4); // wraps to slot 0
        assert_eq!(q.capacity(), 3);
        q.enqueue(5); // full: grows
        assert_eq!(q.capacity(), 6);
        assert_eq!(q.to_string(), "[2, 3, 4, 5]");
        assert_eq!(q.peek(), Ok(&2));
        let drained: Vec<_> = core::iter::from_fn(|| q.dequeue().ok()).collect();
        assert_eq!(drained, [2, 3, 4, 5]);
        assert_eq!(q.dequeue(), Err(ContainerError::Empty));
    }

    #[test]
    fn zero_capacity_and_clear() {
        let mut q: Queue<u8> = Queue::new(0);
        assert_eq!(q.capacity(), DEFAULT_QUEUE_CAPACITY);
        q.enqueue(7);
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.peek(), Err(ContainerError::Empty));
    }
}
