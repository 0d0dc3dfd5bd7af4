//! Per-event error boundary.
//!
//! Every routed event ends in a [`Disposition`]. Errors are logged here and
//! never reach the event loop. Release builds also contain panics raised by
//! a handler; debug builds let them propagate.

use tracing::error;

use crate::common::error::RouteResult;

/// What happened to a routed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Forwarded to the other side.
    Forwarded,
    /// Answered locally on the originating side.
    Replied,
    /// Dropped without a reply.
    Dropped(DropReason),
    /// Handling failed; the error was logged.
    Failed,
}

/// Why an event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Wrong group, anonymous sender, or unanswered echo.
    NotForUs,
    /// Sender rejected by the access list.
    AccessDenied,
    /// Rate gate throttled the message.
    RateLimited,
    /// Message longer than the configured cap.
    Oversize,
    /// Join/leave notice while forwarding those is off.
    JoinLeave,
    /// Nothing to do with this message.
    Ignored,
}

/// Run `handler` for one event, logging any failure with `what`.
pub fn guarded<F>(what: &str, handler: F) -> Disposition
where
    F: FnOnce() -> RouteResult<Disposition>,
{
    match catch(handler) {
        Ok(Ok(disposition)) => disposition,
        Ok(Err(e)) => {
            error!("Error while handling {}: {}", what, e);
            Disposition::Failed
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("Panic while handling {}: {}", what, message);
            Disposition::Failed
        }
    }
}

#[cfg(debug_assertions)]
fn catch<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    Ok(f())
}

#[cfg(not(debug_assertions))]
fn catch<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
}
