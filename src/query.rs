//! View-local loading state for one async request.
//!
//! A `Query<T>` owns the idle/loading/success/error state of a single view's
//! request. The shared KPI store is the cross-view cache; this type only
//! tracks what the current view is waiting on.
//!
//! # Example
//!
//! ```ignore
//! let client = cached_client.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.section_cards().await.map_err(|e| e.to_string()) }
//! });
//!
//! let unmounted = CancellationToken::new();
//! query.fetch_with(unmounted.clone());
//!
//! // In the view's tick
//! if query.poll() {
//!     // State changed
//! }
//!
//! // Leaving the view
//! unmounted.cancel();
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started, or its view went away
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }
}

/// A boxed future that returns a Result<T, String>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async query with explicit cancellation.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  cancel: Option<CancellationToken>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is called each time a fetch starts.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
      cancel: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Start fetching data if not already loading.
  #[cfg(test)]
  pub fn fetch(&mut self) {
    self.fetch_with(CancellationToken::new());
  }

  /// Start fetching, tied to `token`.
  ///
  /// Cancelling the token makes the next `poll` drop whatever the fetch
  /// produces and return to `Idle`. The fetch itself keeps running, so a
  /// cached fetcher still writes its result into the shared store.
  pub fn fetch_with(&mut self, token: CancellationToken) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch(token);
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    if self.receiver.is_none() {
      return false;
    }

    if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
      debug!("Query cancelled, discarding pending result");
      self.receiver = None;
      self.cancel = None;
      self.state = QueryState::Idle;
      return true;
    }

    let Some(receiver) = self.receiver.as_mut() else {
      return false;
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.finish();
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.finish();
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.finish();
        true
      }
    }
  }

  fn finish(&mut self) {
    self.receiver = None;
    self.cancel = None;
  }

  fn start_fetch(&mut self, token: CancellationToken) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.cancel = Some(token);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field(
        "cancelled",
        &self.cancel.as_ref().map(CancellationToken::is_cancelled),
      )
      .finish_non_exhaustive()
  }
}
