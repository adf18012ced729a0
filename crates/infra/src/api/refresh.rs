//! Single-flight refresh coordination
//!
//! An in-flight flag plus a waiting list of one-shot continuations. The
//! first request to hit a 401 becomes the leader and performs the refresh
//! call; requests that 401 while it is running enqueue a continuation and
//! share the leader's outcome. Exactly one refresh call is in flight at any
//! time.

use tokio::sync::{oneshot, Mutex};

/// Outcome shared with every waiter: the new access token, or `None` when
/// the refresh failed and the session was torn down.
pub(crate) type RefreshOutcome = Option<String>;

/// What `begin` handed out
pub(crate) enum RefreshTicket {
    /// Caller must perform the refresh and then `settle` the gate
    Leader,
    /// Caller awaits the leader's outcome
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Default)]
struct GateState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Serializes concurrent refresh attempts into one network round-trip
#[derive(Default)]
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    /// Join the in-flight refresh, or become the leader of a new one
    pub async fn begin(&self) -> RefreshTicket {
        let mut state = self.state.lock().await;
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            RefreshTicket::Waiter(rx)
        } else {
            state.in_flight = true;
            RefreshTicket::Leader
        }
    }

    /// Release every queued continuation with the leader's outcome
    ///
    /// The waiting list is drained atomically; a waiter enqueued after this
    /// point belongs to the next refresh.
    pub async fn settle(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock().await;
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A dropped receiver means the request was abandoned; nothing to do.
            let _ = waiter.send(outcome.clone());
        }
    }
}
