//! FIFO queue of pending cross-process focus requests.

use std::collections::VecDeque;

use crate::types::focus::FocusRequest;
use crate::types::tab::now_millis;

/// Server-side queue. Each enqueued request gets a fresh `request_id`,
/// seeded from the wall clock so ids keep increasing across restarts.
#[derive(Debug)]
pub struct FocusQueue {
    pending: VecDeque<FocusRequest>,
    next_id: u64,
}

impl FocusQueue {
    pub fn new() -> Self {
        Self::starting_at(now_millis().max(1) as u64)
    }

    pub fn starting_at(first_id: u64) -> Self {
        Self {
            pending: VecDeque::new(),
            next_id: first_id,
        }
    }

    /// Queues a request for `tab_id` and returns it.
    pub fn enqueue(&mut self, tab_id: i64) -> FocusRequest {
        let request = FocusRequest {
            tab_id: Some(tab_id),
            request_id: Some(self.next_id),
        };
        self.next_id += 1;
        self.pending.push_back(request);
        request
    }

    /// Removes and returns the oldest pending request.
    pub fn dequeue(&mut self) -> Option<FocusRequest> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for FocusQueue {
    fn default() -> Self {
        Self::new()
    }
}
