//! Single-in-flight request bookkeeping shared by the geocoding throttle and
//! the directions tracker.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of one asynchronous lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestHandle(u64);

impl RequestHandle {
    /// Allocate a handle that is unique for the lifetime of the process
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RequestHandle {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Slot holding the handle of the one live request, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InFlight {
    current: Option<RequestHandle>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<RequestHandle> {
        self.current
    }

    pub fn is_pending(&self) -> bool {
        self.current.is_some()
    }

    /// Store `handle` as the live request and return the one it supersedes
    pub fn replace(&mut self, handle: RequestHandle) -> Option<RequestHandle> {
        self.current.replace(handle)
    }

    /// Clear the slot if `handle` is the live request. Returns false for stale handles.
    pub fn take(&mut self, handle: RequestHandle) -> bool {
        if self.current == Some(handle) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) -> Option<RequestHandle> {
        self.current.take()
    }
}

/// Result of an asynchronous lookup, tagged with the handle it was issued under
#[derive(Debug)]
pub struct Completion<T, E> {
    pub handle: RequestHandle,
    pub result: std::result::Result<T, E>,
}

impl<T, E> Completion<T, E> {
    pub fn new(handle: RequestHandle, result: std::result::Result<T, E>) -> Self {
        Self { handle, result }
    }
}

/// Channel used to marshal completions back onto the owning context
pub fn completion_channel<T, E>() -> (Sender<Completion<T, E>>, Receiver<Completion<T, E>>) {
    unbounded()
}
