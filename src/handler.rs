//! Result handlers bridging a view's completion to the caller's future.
//!
//! A [`ResultHandler`] is the resolve/reject pair injected into a view. It is
//! cheap to clone; all clones share one settle slot, so only the first
//! `resolve` or `reject` across every clone reaches the caller. The caller
//! holds the matching [`Pending`] future.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::{OverlayError, OverlayResult};
use crate::stack::EntryId;
use crate::token::ViewToken;

/// How a show cycle settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The view called `resolve`.
    Fulfilled,
    /// The view called `reject`.
    Rejected,
}

/// Callback run once after a handler settles.
pub(crate) type SettleHook = Box<dyn Fn(&ViewToken, EntryId, Outcome) + Send + Sync>;

struct Shared<T, E> {
    token: ViewToken,
    entry: EntryId,
    sender: Mutex<Option<oneshot::Sender<Result<T, E>>>>,
    on_settle: Option<SettleHook>,
}

/// The resolve/reject pair for one show cycle.
pub struct ResultHandler<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> ResultHandler<T, E> {
    /// Create a handler and the future it settles.
    pub fn channel(token: ViewToken, entry: EntryId) -> (Self, Pending<T, E>) {
        Self::build(token, entry, None)
    }

    pub(crate) fn with_settle_hook(
        token: ViewToken,
        entry: EntryId,
        hook: SettleHook,
    ) -> (Self, Pending<T, E>) {
        Self::build(token, entry, Some(hook))
    }

    fn build(token: ViewToken, entry: EntryId, on_settle: Option<SettleHook>) -> (Self, Pending<T, E>) {
        let (tx, rx) = oneshot::channel();
        let handler = Self {
            shared: Arc::new(Shared {
                token: token.clone(),
                entry,
                sender: Mutex::new(Some(tx)),
                on_settle,
            }),
        };
        (handler, Pending { token, rx })
    }

    /// Fulfil the caller's future with `data`.
    ///
    /// Returns `false` if this show cycle already settled.
    pub fn resolve(&self, data: T) -> bool {
        self.settle(Ok(data))
    }

    /// Reject the caller's future with `error`, unmodified.
    ///
    /// Returns `false` if this show cycle already settled.
    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(error))
    }

    /// Check if resolve or reject has already been called.
    pub fn is_settled(&self) -> bool {
        self.shared
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Token of the view this handler belongs to.
    pub fn token(&self) -> &ViewToken {
        &self.shared.token
    }

    /// Show cycle this handler belongs to.
    pub fn entry(&self) -> EntryId {
        self.shared.entry
    }

    fn settle(&self, result: Result<T, E>) -> bool {
        let sender = self
            .shared
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(sender) = sender else {
            trace!(token = %self.shared.token, "handler already settled; ignoring");
            return false;
        };

        let outcome = match result {
            Ok(_) => Outcome::Fulfilled,
            Err(_) => Outcome::Rejected,
        };
        // The view is hidden before the caller can observe the result.
        if let Some(hook) = &self.shared.on_settle {
            hook(&self.shared.token, self.shared.entry, outcome);
        }

        if sender.send(result).is_err() {
            debug!(token = %self.shared.token, "caller dropped its future before settle");
        }
        true
    }
}

impl<T, E> Clone for ResultHandler<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for ResultHandler<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHandler")
            .field("token", &self.shared.token)
            .field("entry", &self.shared.entry)
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Future returned by `show`; settles when the view resolves or rejects.
///
/// If every clone of the handler is dropped unsettled, the future settles
/// with [`OverlayError::Abandoned`].
#[derive(Debug)]
#[must_use = "an overlay result is only observed by awaiting it"]
pub struct Pending<T, E> {
    token: ViewToken,
    rx: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> Pending<T, E> {
    /// Token of the overlay this future waits on.
    pub fn token(&self) -> &ViewToken {
        &self.token
    }
}

impl<T, E> Future for Pending<T, E> {
    type Output = OverlayResult<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|received| match received {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(error)) => Err(OverlayError::Rejected(error)),
            Err(_) => Err(OverlayError::Abandoned(this.token.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::ActiveStack;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry() -> EntryId {
        ActiveStack::new().push("test".into())
    }

    #[tokio::test]
    async fn test_resolve_fulfils_future() {
        let (handler, pending) = ResultHandler::<&str, ()>::channel("test".into(), entry());
        assert!(handler.resolve("ok"));
        assert_eq!(pending.await, Ok("ok"));
    }

    #[tokio::test]
    async fn test_reject_passes_error_through() {
        let (handler, pending) = ResultHandler::<(), String>::channel("test".into(), entry());
        assert!(handler.reject("boom".to_string()));
        assert_eq!(pending.await, Err(OverlayError::Rejected("boom".to_string())));
    }

    #[tokio::test]
    async fn test_first_settle_wins_across_clones() {
        let (handler, pending) = ResultHandler::<u32, u32>::channel("test".into(), entry());
        let clone = handler.clone();

        assert!(clone.resolve(1));
        assert!(!handler.resolve(2));
        assert!(!handler.reject(3));
        assert!(handler.is_settled());
        assert_eq!(pending.await, Ok(1));
    }

    #[tokio::test]
    async fn test_dropped_handler_abandons_future() {
        let (handler, pending) = ResultHandler::<u32, u32>::channel("lost".into(), entry());
        drop(handler);
        assert_eq!(pending.await, Err(OverlayError::Abandoned("lost".into())));
    }

    #[test]
    fn test_settle_hook_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let (handler, _pending) = ResultHandler::<(), ()>::with_settle_hook(
            "test".into(),
            entry(),
            Box::new(move |_: &ViewToken, _: EntryId, outcome: Outcome| {
                assert_eq!(outcome, Outcome::Rejected);
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        handler.reject(());
        handler.resolve(());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_settle_hook_runs_before_future_is_ready() {
        type Slot = Arc<Mutex<Option<Pending<u32, ()>>>>;
        let slot: Slot = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&slot);
        let (handler, pending) = ResultHandler::<u32, ()>::with_settle_hook(
            "test".into(),
            entry(),
            Box::new(move |_: &ViewToken, _: EntryId, _: Outcome| {
                let mut pending = seen.lock().unwrap();
                let ready = pending.as_mut().unwrap().now_or_never();
                assert!(ready.is_none());
            }),
        );
        *slot.lock().unwrap() = Some(pending);

        assert!(handler.resolve(7));
        let pending = slot.lock().unwrap().take().unwrap();
        assert_eq!(pending.now_or_never(), Some(Ok(7)));
    }
}
