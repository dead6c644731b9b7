//! Drag-to-reorder reconciliation.
//!
//! The displayed order is owned by the client. A drag rearranges it at once
//! and issues a full-sequence reorder carrying the new order. Each request is
//! tracked by a ticket and settles as confirmed or reverted:
//!
//! ```text
//! Idle --drag--> Pending --ok--> Confirmed
//!                   |
//!                   +--error--> Reverted
//! ```
//!
//! Every request carries the whole visible sequence, so the latest request to
//! succeed defines the server order. A failure only rolls the display back to
//! the last confirmed order when no later request is still in flight.

use quillboard_db::ordering::move_element;
use quillboard_db::OrderingError;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderStatus {
    Idle,
    Pending,
    Confirmed,
    Reverted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderRequest {
    pub ticket: u64,
    pub ordered_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct ReorderReconciler {
    confirmed: Vec<i64>,
    displayed: Vec<i64>,
    in_flight: Vec<ReorderRequest>,
    next_ticket: u64,
    status: ReorderStatus,
}

impl ReorderReconciler {
    pub fn new(ids: Vec<i64>) -> Self {
        Self {
            confirmed: ids.clone(),
            displayed: ids,
            in_flight: Vec::new(),
            next_ticket: 1,
            status: ReorderStatus::Idle,
        }
    }

    pub fn displayed(&self) -> &[i64] {
        &self.displayed
    }

    pub fn confirmed(&self) -> &[i64] {
        &self.confirmed
    }

    pub fn status(&self) -> ReorderStatus {
        self.status
    }

    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Moves a row in the displayed order and returns the request to send.
    pub fn begin_move(&mut self, from: usize, to: usize) -> Result<ReorderRequest, OrderingError> {
        let mut next = self.displayed.clone();
        move_element(&mut next, from, to)?;
        self.displayed = next;

        let request = ReorderRequest {
            ticket: self.next_ticket,
            ordered_ids: self.displayed.clone(),
        };
        self.next_ticket += 1;
        self.in_flight.push(request.clone());
        self.status = ReorderStatus::Pending;
        debug!(ticket = request.ticket, from, to, "Reorder pending");
        Ok(request)
    }

    /// The server accepted `ticket`. Earlier requests are superseded.
    pub fn confirm(&mut self, ticket: u64) {
        let Some(request) = self.in_flight.iter().find(|r| r.ticket == ticket).cloned() else {
            return;
        };
        self.confirmed = request.ordered_ids;
        self.in_flight.retain(|r| r.ticket > ticket);
        self.status = if self.in_flight.is_empty() {
            ReorderStatus::Confirmed
        } else {
            ReorderStatus::Pending
        };
    }

    /// The server rejected `ticket`.
    pub fn revert(&mut self, ticket: u64) {
        if !self.in_flight.iter().any(|r| r.ticket == ticket) {
            return;
        }
        self.in_flight.retain(|r| r.ticket != ticket);
        let superseded = self.in_flight.iter().any(|r| r.ticket > ticket);
        if superseded {
            return;
        }
        warn!(ticket, "Reorder failed; restoring last confirmed order");
        if self.in_flight.is_empty() {
            self.displayed = self.confirmed.clone();
            self.status = ReorderStatus::Reverted;
        } else if let Some(last) = self.in_flight.last() {
            // Only earlier requests remain; the newest of them is what the
            // server will hold if it succeeds.
            self.displayed = last.ordered_ids.clone();
        }
    }

    /// Settles `ticket` from a request outcome.
    pub fn settle<E>(&mut self, ticket: u64, outcome: &Result<(), E>) {
        match outcome {
            Ok(()) => self.confirm(ticket),
            Err(_) => self.revert(ticket),
        }
    }

    /// Adopts a freshly fetched order unless local moves are still in flight.
    pub fn sync(&mut self, ids: Vec<i64>) {
        if self.has_pending() {
            return;
        }
        self.confirmed = ids.clone();
        self.displayed = ids;
        self.status = ReorderStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_then_confirm() {
        let mut r = ReorderReconciler::new(vec![1, 2, 3]);
        let request = r.begin_move(0, 2).unwrap();
        assert_eq!(request.ordered_ids, vec![2, 3, 1]);
        assert_eq!(r.displayed(), [2, 3, 1]);
        assert_eq!(r.status(), ReorderStatus::Pending);

        r.confirm(request.ticket);
        assert_eq!(r.status(), ReorderStatus::Confirmed);
        assert_eq!(r.confirmed(), [2, 3, 1]);
        assert!(!r.has_pending());
    }

    #[test]
    fn test_failure_reverts_display() {
        let mut r = ReorderReconciler::new(vec![1, 2, 3]);
        let request = r.begin_move(2, 0).unwrap();
        r.settle(request.ticket, &Err::<(), _>("boom"));
        assert_eq!(r.status(), ReorderStatus::Reverted);
        assert_eq!(r.displayed(), [1, 2, 3]);
    }

    #[test]
    fn test_invalid_index_changes_nothing() {
        let mut r = ReorderReconciler::new(vec![1, 2]);
        assert!(r.begin_move(0, 5).is_err());
        assert_eq!(r.displayed(), [1, 2]);
        assert_eq!(r.status(), ReorderStatus::Idle);
    }

    #[test]
    fn test_earlier_failure_superseded_by_later_move() {
        let mut r = ReorderReconciler::new(vec![1, 2, 3]);
        let first = r.begin_move(0, 1).unwrap();
        let second = r.begin_move(2, 0).unwrap();
        assert_eq!(r.displayed(), [3, 2, 1]);

        r.revert(first.ticket);
        assert_eq!(r.displayed(), [3, 2, 1]);
        assert_eq!(r.status(), ReorderStatus::Pending);

        r.confirm(second.ticket);
        assert_eq!(r.confirmed(), [3, 2, 1]);
        assert_eq!(r.status(), ReorderStatus::Confirmed);
    }

    #[test]
    fn test_later_confirm_supersedes_earlier() {
        let mut r = ReorderReconciler::new(vec![1, 2, 3]);
        let first = r.begin_move(0, 1).unwrap();
        let second = r.begin_move(0, 2).unwrap();
        r.confirm(second.ticket);
        assert!(!r.has_pending());
        // The late answer for the first request is ignored.
        r.revert(first.ticket);
        assert_eq!(r.displayed(), [1, 3, 2]);
        assert_eq!(r.status(), ReorderStatus::Confirmed);
    }

    #[test]
    fn test_sync_waits_for_pending() {
        let mut r = ReorderReconciler::new(vec![1, 2, 3]);
        let request = r.begin_move(0, 2).unwrap();
        r.sync(vec![1, 2, 3]);
        assert_eq!(r.displayed(), [2, 3, 1]);

        r.confirm(request.ticket);
        r.sync(vec![2, 3, 1, 4]);
        assert_eq!(r.displayed(), [2, 3, 1, 4]);
        assert_eq!(r.status(), ReorderStatus::Idle);
    }
}
