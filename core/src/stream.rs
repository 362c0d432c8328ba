//! Cold, subscribe-to-start operations.
//!
//! # Design
//! A `Cold` is a factory for one remote exchange. Creating it does nothing;
//! every subscription builds a fresh future from the factory, so two
//! subscriptions mean two exchanges. Nothing is shared or cached between
//! them.
//!
//! Cancellation follows ownership: dropping a subscribed stream (or the
//! future from `single`) drops the exchange in flight. `spawn` runs the
//! exchange as a tokio task instead, and `Subscription::unsubscribe` aborts
//! it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt};
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;

use crate::error::ApiError;

type Factory<T, E> = dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync;

/// A deferred operation that yields one value, or fails, per subscription.
pub struct Cold<T, E = ApiError> {
    factory: Arc<Factory<T, E>>,
}

impl<T, E> Clone for Cold<T, E> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T, E> fmt::Debug for Cold<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cold").finish_non_exhaustive()
    }
}

impl<T: Send + 'static, E: Send + 'static> Cold<T, E> {
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move || factory().boxed()),
        }
    }

    /// Start a new exchange when the returned stream is first polled.
    ///
    /// The stream yields exactly one item: `Ok` followed by completion, or
    /// `Err` as its terminal failure.
    pub fn subscribe(&self) -> BoxStream<'static, Result<T, E>> {
        stream::once(self.single()).boxed()
    }

    /// The single value of a new exchange, as a plain future.
    pub fn single(&self) -> BoxFuture<'static, Result<T, E>> {
        let factory = Arc::clone(&self.factory);
        async move { factory().await }.boxed()
    }

    /// Run a new exchange on the current tokio runtime right away.
    ///
    /// Fails when called outside a tokio runtime.
    pub fn spawn(&self) -> Result<Subscription<T, E>, TryCurrentError> {
        let runtime = Handle::try_current()?;
        Ok(Subscription {
            handle: runtime.spawn(self.single()),
        })
    }
}

/// Handle to an exchange started with `Cold::spawn`.
///
/// Dropping the handle detaches the task; call `unsubscribe` to abort it.
#[derive(Debug)]
pub struct Subscription<T, E = ApiError> {
    handle: JoinHandle<Result<T, E>>,
}

impl<T, E> Subscription<T, E> {
    /// Abort the exchange if it has not finished yet.
    pub fn unsubscribe(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the result. `None` if the subscription was cancelled first.
    pub async fn outcome(self) -> Option<Result<T, E>> {
        match self.handle.await {
            Ok(result) => Some(result),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(calls: &Arc<AtomicUsize>) -> Cold<usize, String> {
        let calls = Arc::clone(calls);
        Cold::new(move || {
            let calls = Arc::clone(&calls);
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
        })
    }

    #[tokio::test]
    async fn nothing_runs_until_polled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cold = counting(&calls);
        let _stream = cold.subscribe();
        let _future = cold.single();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stream_yields_once_then_completes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut stream = counting(&calls).subscribe();
        assert_eq!(stream.next().await, Some(Ok(1)));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn every_subscription_runs_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cold = counting(&calls);
        assert_eq!(cold.single().await, Ok(1));
        assert_eq!(cold.clone().single().await, Ok(2));
        let collected: Vec<_> = cold.subscribe().collect().await;
        assert_eq!(collected, vec![Ok(3)]);
    }

    #[tokio::test]
    async fn failure_is_the_terminal_item() {
        let cold: Cold<(), String> = Cold::new(|| async { Err("boom".to_string()) });
        let mut stream = cold.subscribe();
        assert_eq!(stream.next().await, Some(Err("boom".to_string())));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn spawned_subscription_delivers_outcome() {
        let calls = Arc::new(AtomicUsize::new(0));
        let subscription = counting(&calls).spawn().unwrap();
        assert_eq!(subscription.outcome().await, Some(Ok(1)));
    }

    #[test]
    fn spawn_outside_runtime_fails() {
        let calls = Arc::new(AtomicUsize::new(0));
        assert!(counting(&calls).spawn().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsubscribed_task_has_no_outcome() {
        let cold: Cold<(), String> = Cold::new(|| futures::future::pending());
        let subscription = cold.spawn().unwrap();
        subscription.unsubscribe();
        assert_eq!(subscription.outcome().await, None);
    }
}
