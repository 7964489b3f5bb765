/// Fixed-capacity FIFO ring buffer.
///
/// The queue performs no synchronization and never blocks. Callers must not [`put`] into a
/// full queue; [`StageGate`] guarantees that through its free slot semaphore.
///
/// [`put`]: BoundedQueue::put
/// [`StageGate`]: crate::stage::StageGate
#[derive(Debug)]
pub struct BoundedQueue<T> {
    slots: Box<[Option<T>]>,
    /// Next slot to fill.
    head: usize,
    /// Next slot to drain.
    tail: usize,
    len: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        let slots = std::iter::repeat_with(|| None).take(capacity).collect();

        Self {
            slots,
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Writes `value` into the slot at `head`.
    pub fn put(&mut self, value: T) {
        debug_assert!(!self.is_full(), "put into a full queue");

        self.slots[self.head] = Some(value);
        self.head = (self.head + 1) % self.slots.len();
        self.len += 1;
    }

    /// Removes the value in the slot at `tail`, or returns `None` when the queue is empty.
    pub fn take(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        let value = self.slots[self.tail].take();
        self.tail = (self.tail + 1) % self.slots.len();
        self.len -= 1;

        value
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_returns_values_in_put_order() {
        let mut queue = BoundedQueue::new(3);
        queue.put(1);
        queue.put(2);
        queue.put(3);

        assert!(queue.is_full());
        assert_eq!(queue.take(), Some(1));
        assert_eq!(queue.take(), Some(2));
        assert_eq!(queue.take(), Some(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn indices_wrap_around() {
        let mut queue = BoundedQueue::new(2);
        for value in 0..7 {
            queue.put(value);
            assert_eq!(queue.len(), 1);
            assert_eq!(queue.take(), Some(value));
        }

        queue.put(10);
        queue.put(11);
        assert_eq!(queue.take(), Some(10));
        queue.put(12);
        assert_eq!(queue.take(), Some(11));
        assert_eq!(queue.take(), Some(12));
    }

    #[test]
    fn put_advances_head_and_take_advances_tail() {
        let mut queue = BoundedQueue::new(3);
        queue.put('a');
        queue.put('b');
        assert_eq!((queue.head, queue.tail), (2, 0));

        assert_eq!(queue.take(), Some('a'));
        assert_eq!((queue.head, queue.tail), (2, 1));

        queue.put('c');
        queue.put('d');
        assert_eq!((queue.head, queue.tail), (1, 1));
        assert!(queue.is_full());

        assert_eq!(queue.take(), Some('b'));
        assert_eq!(queue.take(), Some('c'));
        assert_eq!(queue.take(), Some('d'));
        assert_eq!((queue.head, queue.tail), (1, 1));
        assert!(queue.is_empty());
    }

    #[test]
    fn take_from_empty_queue_returns_none() {
        let mut queue = BoundedQueue::<u8>::new(1);
        assert_eq!(queue.take(), None);
        assert_eq!(queue.capacity(), 1);
    }
}
