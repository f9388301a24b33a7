//! The refresh-and-retry state machine for 401 responses.
//!
//! A resource request that comes back 401 gets exactly one session refresh
//! and one retry. A second 401 is surfaced as a rejection. Stateless
//! credentials have nothing to refresh, so their first 401 is final.

/// What the caller should do with the response it just received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Hand the response to the caller as-is.
    Deliver,
    /// Refresh the session, then resend the original request once.
    Refresh,
    /// Stop and report the credential as rejected.
    Reject,
}

/// Per-request retry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryState {
    /// The original request has been sent.
    #[default]
    Initial,
    /// The session was refreshed and the request resent.
    Refreshed,
    /// A terminal action was decided.
    Finished,
}

impl RetryState {
    /// Advance the state for a response and return the action to take.
    ///
    /// `unauthorized` is whether the response was a 401; `refreshable` is
    /// whether the credential scheme holds a session that can be renewed.
    pub fn on_response(&mut self, unauthorized: bool, refreshable: bool) -> RetryAction {
        let (next, action) = match (*self, unauthorized) {
            (_, false) => (RetryState::Finished, RetryAction::Deliver),
            (RetryState::Initial, true) if refreshable => {
                (RetryState::Refreshed, RetryAction::Refresh)
            }
            (_, true) => (RetryState::Finished, RetryAction::Reject),
        };
        *self = next;
        action
    }

    /// Returns true once a terminal action was produced.
    pub fn is_finished(self) -> bool {
        self == RetryState::Finished
    }
}
