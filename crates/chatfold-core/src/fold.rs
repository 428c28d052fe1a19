//! Entry points for folding update sequences, synchronously or from a stream.

use std::convert::Infallible;
use std::fmt::Display;

use futures::{Stream, StreamExt as _};
use tokio::sync::watch;
use tracing::debug;

use crate::accumulator::Accumulator;
use crate::errors::FoldError;
use crate::response::Response;
use crate::update::Update;

/// Folds a finite update sequence into a response.
pub fn fold<I>(updates: I) -> Response
where
    I: IntoIterator<Item = Update>,
{
    let mut acc = Accumulator::new();
    for update in updates {
        acc.push(update);
    }
    acc.finish()
}

/// Folds one more update into an existing response.
///
/// Equivalent to folding `update` as the next element of the sequence that
/// produced `response`.
pub fn apply(response: &mut Response, update: Update) {
    apply_many(response, std::iter::once(update));
}

/// Folds several more updates into an existing response.
pub fn apply_many<I>(response: &mut Response, updates: I)
where
    I: IntoIterator<Item = Update>,
{
    let mut acc = Accumulator::resume(std::mem::take(response));
    for update in updates {
        acc.push(update);
    }
    *response = acc.finish();
}

/// Receiving side of a fold cancellation, created by [`cancellation`].
pub struct FoldCancel {
    rx: watch::Receiver<bool>,
}

/// Handle used to abort a fold that is waiting on its update source.
#[derive(Clone)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Requests cancellation.
    ///
    /// Takes effect the next time the fold waits for an update; an update that
    /// is already being folded always completes first.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Creates a linked abort handle and cancellation receiver.
pub fn cancellation() -> (AbortHandle, FoldCancel) {
    let (tx, rx) = watch::channel(false);
    (AbortHandle { tx }, FoldCancel { rx })
}

trait UpdateSink {
    fn accept(&mut self, update: Update);
}

impl UpdateSink for Accumulator {
    fn accept(&mut self, update: Update) {
        self.push(update);
    }
}

// Applying per update keeps the response whole at every await point, even if
// the caller drops the future.
impl UpdateSink for Response {
    fn accept(&mut self, update: Update) {
        apply(self, update);
    }
}

enum Waited<T> {
    Signal { senders_alive: bool },
    Update(Option<T>),
}

async fn drive<T, S, E>(
    sink: &mut T,
    updates: S,
    cancel: Option<FoldCancel>,
) -> Result<(), FoldError>
where
    T: UpdateSink,
    S: Stream<Item = Result<Update, E>>,
    E: Display,
{
    let mut updates = std::pin::pin!(updates);
    let mut cancel = cancel.map(|cancel| cancel.rx);
    let mut seen = 0_u64;
    loop {
        if cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            debug!(updates = seen, "fold cancelled");
            return Err(FoldError::Cancelled);
        }
        let waited = match cancel.as_mut() {
            Some(rx) => tokio::select! {
                biased;
                changed = rx.changed() => Waited::Signal { senders_alive: changed.is_ok() },
                next = updates.next() => Waited::Update(next),
            },
            None => Waited::Update(updates.next().await),
        };
        let next = match waited {
            Waited::Signal {
                senders_alive: true,
            } => continue,
            Waited::Signal {
                senders_alive: false,
            } => {
                // Every abort handle is gone; nothing can cancel anymore.
                cancel = None;
                continue;
            }
            Waited::Update(next) => next,
        };
        match next {
            Some(Ok(update)) => {
                sink.accept(update);
                seen = seen.saturating_add(1);
            }
            Some(Err(err)) => {
                debug!(updates = seen, error = %err, "update source failed");
                return Err(FoldError::source_msg(err));
            }
            None => {
                debug!(updates = seen, "update source completed");
                return Ok(());
            }
        }
    }
}

/// Folds every update of a source that can neither fail nor be cancelled.
async fn drain<T, S>(sink: &mut T, updates: S)
where
    T: UpdateSink,
    S: Stream<Item = Update>,
{
    let mut updates = std::pin::pin!(updates);
    let mut seen = 0_u64;
    while let Some(update) = updates.next().await {
        sink.accept(update);
        seen = seen.saturating_add(1);
    }
    debug!(updates = seen, "update source completed");
}

fn infallible<S>(updates: S) -> impl Stream<Item = Result<Update, Infallible>>
where
    S: Stream<Item = Update>,
{
    updates.map(Ok)
}

/// Folds an asynchronous update source; resolves once the source completes.
pub async fn fold_async<S>(updates: S) -> Response
where
    S: Stream<Item = Update>,
{
    let mut acc = Accumulator::new();
    drain(&mut acc, updates).await;
    acc.finish()
}

/// Folds a fallible asynchronous update source, stopping at the first error.
pub async fn fold_try_async<S, E>(updates: S) -> Result<Response, FoldError>
where
    S: Stream<Item = Result<Update, E>>,
    E: Display,
{
    let mut acc = Accumulator::new();
    drive(&mut acc, updates, None).await?;
    Ok(acc.finish())
}

/// Folds an asynchronous update source that can be aborted between updates.
pub async fn fold_async_with_cancel<S>(updates: S, cancel: FoldCancel) -> Result<Response, FoldError>
where
    S: Stream<Item = Update>,
{
    let mut acc = Accumulator::new();
    drive(&mut acc, infallible(updates), Some(cancel)).await?;
    Ok(acc.finish())
}

/// Folds every update of an asynchronous source into an existing response.
pub async fn apply_many_async<S>(response: &mut Response, updates: S)
where
    S: Stream<Item = Update>,
{
    drain(response, updates).await;
}

/// Fallible variant of [`apply_many_async`].
///
/// On error the updates received before it remain applied.
pub async fn apply_many_try_async<S, E>(response: &mut Response, updates: S) -> Result<(), FoldError>
where
    S: Stream<Item = Result<Update, E>>,
    E: Display,
{
    drive(response, updates, None).await
}

/// Stream extension for folding updates as they arrive.
pub trait UpdateStreamExt: Stream<Item = Update> + Sized {
    /// Folds the stream into a response once it completes.
    fn fold_response(self) -> impl Future<Output = Response> {
        fold_async(self)
    }
}

impl<S> UpdateStreamExt for S where S: Stream<Item = Update> {}
