//! FIFO waiting list.
//!
//! One global queue, independent of tier. Only the head is ever considered for
//! promotion, so a head waiting for a busy tier holds back everyone behind it.

use reseasy_core::{BookingRequest, WaitingRequest};
use std::collections::VecDeque;

/// Parties waiting for a table, oldest first
#[derive(Debug, Default)]
pub struct WaitingQueue {
    entries: VecDeque<WaitingRequest>,
    next_order: u64,
}

impl WaitingQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request at the tail
    ///
    /// Returns its 1-based position.
    pub fn enqueue(&mut self, request: BookingRequest) -> usize {
        let order = self.next_order;
        self.next_order += 1;
        self.entries.push_back(WaitingRequest { order, request });
        self.entries.len()
    }

    /// The oldest waiting request
    #[must_use]
    pub fn peek_head(&self) -> Option<&WaitingRequest> {
        self.entries.front()
    }

    /// Remove and return the oldest waiting request
    pub fn pop_head(&mut self) -> Option<WaitingRequest> {
        self.entries.pop_front()
    }

    /// Number of waiting requests
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the queue, oldest first
    #[must_use]
    pub fn snapshot(&self) -> Vec<WaitingRequest> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use reseasy_core::Money;

    fn request(name: &str, party_size: u32) -> BookingRequest {
        BookingRequest::minutes(name, party_size, 30, Money::from_major(50))
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = WaitingQueue::new();
        assert_eq!(queue.enqueue(request("A", 4)), 1);
        assert_eq!(queue.enqueue(request("B", 2)), 2);
        assert_eq!(queue.enqueue(request("C", 6)), 3);

        assert_eq!(queue.peek_head().unwrap().request.name, "A");
        assert_eq!(queue.pop_head().unwrap().request.name, "A");
        assert_eq!(queue.pop_head().unwrap().request.name, "B");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_enqueue_order_keeps_increasing_after_pops() {
        let mut queue = WaitingQueue::new();
        queue.enqueue(request("A", 2));
        queue.pop_head();
        queue.enqueue(request("B", 2));

        let waiting = queue.snapshot();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].order, 1);
    }

    proptest! {
        #[test]
        fn prop_pops_follow_enqueue_order(sizes in proptest::collection::vec(1u32..12, 0..40)) {
            let mut queue = WaitingQueue::new();
            for (i, size) in sizes.iter().enumerate() {
                prop_assert_eq!(queue.enqueue(request(&format!("P{i}"), *size)), i + 1);
            }
            let mut last = None;
            while let Some(head) = queue.pop_head() {
                prop_assert!(last.is_none_or(|order| head.order > order));
                last = Some(head.order);
            }
            prop_assert_eq!(last.map(|order| order + 1), u64::try_from(sizes.len()).ok().filter(|n| *n > 0));
        }
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = WaitingQueue::new();
        assert!(queue.is_empty());
        assert!(queue.peek_head().is_none());
        assert!(queue.pop_head().is_none());
    }
}
