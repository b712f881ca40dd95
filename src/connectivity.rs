//! Connectivity monitor: host-reported reachability transitions.
//!
//! A two-state machine (`Reachable` / `Unreachable`) driven entirely by
//! [`ConnectivityMonitor::set_reachable`] calls from the host; there is no
//! polling. Each transition records the previous state before updating, so
//! consumers can distinguish the *edge* ("just came back online") from the
//! steady state.
//!
//! The pending-operation list accumulates while unreachable and is only
//! ever cleared explicitly. Reconnecting does not clear it: replay policy
//! belongs to the orchestrator, not to this monitor.

use crate::store::OperationKind;
use std::sync::RwLock;
use std::time::SystemTime;

/// A snapshot of the monitor's reachability state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    pub is_reachable: bool,
    /// The value `is_reachable` held before the most recent transition.
    pub previous_is_reachable: bool,
    /// When the most recent transition was reported.
    pub last_change_at: SystemTime,
}

/// An operation noted while the host was unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub kind: OperationKind,
    pub noted_at: SystemTime,
}

/// Tracks reachability and the operations attempted while unreachable.
///
/// Shareable as `Arc<ConnectivityMonitor>`; all methods take `&self`.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    state: RwLock<ConnectivityState>,
    pending: RwLock<Vec<PendingOperation>>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the host's initial reachability.
    pub fn new(initially_reachable: bool) -> Self {
        Self {
            state: RwLock::new(ConnectivityState {
                is_reachable: initially_reachable,
                previous_is_reachable: initially_reachable,
                last_change_at: SystemTime::now(),
            }),
            pending: RwLock::new(Vec::new()),
        }
    }

    /// Record a host-reported transition.
    ///
    /// Always shifts the current value into `previous_is_reachable`, even
    /// when the host re-reports an unchanged state.
    pub fn set_reachable(&self, reachable: bool) {
        let mut state = self.state.write().expect("connectivity lock poisoned");
        state.previous_is_reachable = state.is_reachable;
        state.is_reachable = reachable;
        state.last_change_at = SystemTime::now();
    }

    /// Current reachability.
    pub fn is_reachable(&self) -> bool {
        self.state
            .read()
            .expect("connectivity lock poisoned")
            .is_reachable
    }

    /// Snapshot of the full state.
    pub fn state(&self) -> ConnectivityState {
        *self.state.read().expect("connectivity lock poisoned")
    }

    /// True exactly when the most recent transition went
    /// `Unreachable -> Reachable`.
    pub fn just_reconnected(&self) -> bool {
        let state = self.state.read().expect("connectivity lock poisoned");
        state.is_reachable && !state.previous_is_reachable
    }

    /// Note an operation attempted while unreachable. Additive only.
    pub fn add_pending_operation(&self, kind: OperationKind) {
        self.pending
            .write()
            .expect("pending lock poisoned")
            .push(PendingOperation {
                kind,
                noted_at: SystemTime::now(),
            });
    }

    /// The operations noted so far, in arrival order.
    pub fn pending_operations(&self) -> Vec<PendingOperation> {
        self.pending.read().expect("pending lock poisoned").clone()
    }

    /// Explicitly drop every pending operation.
    pub fn clear_pending_operations(&self) {
        self.pending.write().expect("pending lock poisoned").clear();
    }
}
