//! Process-wide shutdown coordination.
//!
//! The Ctrl-C handler calls [`request`]. Outside a critical section the
//! binary exits right away; inside one (between the move and the end of
//! link/rollback, or unlink/restore) the request is only recorded so the
//! filesystem is never left half-relocated by an interrupt.
//!
//! Notes:
//! - SeqCst on both sides: either the handler sees the section counter, or
//!   [`enter_critical`] sees the request and refuses to start.
//! - `request()` is safe to call from signal handlers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);
static CRITICAL: AtomicUsize = AtomicUsize::new(0);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// True while some thread holds a [`CriticalSection`].
#[inline]
pub fn in_critical_section() -> bool {
    CRITICAL.load(Ordering::SeqCst) > 0
}

/// Guard for a span of filesystem mutations that must run to completion.
#[must_use]
pub struct CriticalSection {
    _private: (),
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        CRITICAL.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Enter a critical section, or `None` if a shutdown was already requested.
pub fn enter_critical() -> Option<CriticalSection> {
    CRITICAL.fetch_add(1, Ordering::SeqCst);
    let guard = CriticalSection { _private: () };
    if is_requested() {
        return None;
    }
    Some(guard)
}

/// Test/utility-only: clear the shutdown flag.
#[cfg(test)]
#[inline]
pub fn reset() {
    SHUTDOWN.store(false, Ordering::SeqCst);
}
