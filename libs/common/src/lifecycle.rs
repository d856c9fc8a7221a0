//! View lifecycle scopes
//!
//! A view acquires a [`MountGuard`] when it mounts and drops it when it
//! unmounts. Asynchronous work takes a [`Ticket`] before awaiting and checks
//! it before writing its result back; a ticket from an earlier mount, or one
//! taken while nothing is mounted, is never live again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

const UNMOUNTED: u64 = 0;

#[derive(Debug, Default)]
struct LifecycleState {
    current: AtomicU64,
    next: AtomicU64,
}

/// Shared handle to one view's mount state
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: Arc<LifecycleState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new mount generation. Any tickets issued before this call
    /// stop being live.
    pub fn acquire(&self) -> MountGuard {
        let id = self.state.next.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.current.store(id, Ordering::Release);
        debug!("View mounted (generation {})", id);

        MountGuard {
            id,
            state: Arc::clone(&self.state),
        }
    }

    /// Snapshot the current generation
    pub fn ticket(&self) -> Ticket {
        Ticket {
            id: self.state.current.load(Ordering::Acquire),
            state: Arc::clone(&self.state),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.state.current.load(Ordering::Acquire) != UNMOUNTED
    }
}

/// Held for as long as a view is mounted; releases the mount on drop
#[derive(Debug)]
pub struct MountGuard {
    id: u64,
    state: Arc<LifecycleState>,
}

impl MountGuard {
    pub fn generation(&self) -> u64 {
        self.id
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        // A newer mount may already own the state; only release our own.
        if self
            .state
            .current
            .compare_exchange(self.id, UNMOUNTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            debug!("View unmounted (generation {})", self.id);
        }
    }
}

/// Proof that work was started under a particular mount
#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    state: Arc<LifecycleState>,
}

impl Ticket {
    /// True while the mount this ticket was taken under is still current
    pub fn is_live(&self) -> bool {
        self.id != UNMOUNTED && self.state.current.load(Ordering::Acquire) == self.id
    }
}
