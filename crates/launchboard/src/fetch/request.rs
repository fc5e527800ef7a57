//! Request tickets.
//!
//! A component that issues fetches keeps a [`RequestTracker`]. Every new
//! request gets a ticket and cancels the one before it; results are applied
//! only while their ticket is still current, so a late response can never
//! overwrite newer state.

use tokio_util::sync::CancellationToken;

/// Identifies one request issued by a component.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: u64,
    token: CancellationToken,
}

impl RequestTicket {
    /// The generation number of this request.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token that fires when this request is superseded or abandoned.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Tracks the latest request of a component.
#[derive(Debug, Default)]
pub struct RequestTracker {
    generation: u64,
    active: Option<CancellationToken>,
}

impl RequestTracker {
    /// Create a tracker with no request in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, cancelling the previous one.
    pub fn begin(&mut self) -> RequestTicket {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
        self.generation += 1;
        let token = CancellationToken::new();
        self.active = Some(token.clone());
        RequestTicket {
            generation: self.generation,
            token,
        }
    }

    /// Check whether `ticket` belongs to the latest request.
    #[must_use]
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.generation == self.generation && !ticket.token.is_cancelled()
    }

    /// Mark `ticket` as finished. Returns `false` if it was stale.
    pub fn finish(&mut self, ticket: &RequestTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.active = None;
        true
    }

    /// Abandon the request in flight, if any. No outstanding ticket stays current.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
        self.generation += 1;
    }

    /// Check if a request is in flight.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for RequestTracker {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
    }
}
