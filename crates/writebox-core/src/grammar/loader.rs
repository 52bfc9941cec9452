//! One-time background loading of the grammar checker.
//!
//! Loading a real checker is slow, so it happens once per process on a worker thread.
//! Sessions [`subscribe`](CheckerLoader::subscribe) to the outcome; every subscriber registered
//! before the load finishes is woken exactly once, and later subscribers receive the outcome
//! immediately. A failed load is final: it is reported to each subscriber and never retried.

use super::checker::{CheckerError, GrammarChecker};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// A checker shared by every session.
pub type SharedChecker = Arc<dyn GrammarChecker>;

/// The outcome delivered to subscribers.
pub type LoadOutcome = Result<SharedChecker, CheckerError>;

/// Where the loader is in its lifecycle.
#[derive(Clone)]
pub enum LoaderStatus {
    /// `start` has not been called.
    Uninitialized,
    /// The worker thread is running.
    Loading,
    /// The checker is available.
    Ready(SharedChecker),
    /// Loading failed.
    Failed(CheckerError),
}

impl std::fmt::Debug for LoaderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("Uninitialized"),
            Self::Loading => f.write_str("Loading"),
            Self::Ready(_) => f.write_str("Ready"),
            Self::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

struct LoaderInner {
    status: LoaderStatus,
    subscribers: Vec<Sender<LoadOutcome>>,
}

/// Loads a [`GrammarChecker`] once and broadcasts readiness.
#[derive(Clone)]
pub struct CheckerLoader {
    inner: Arc<Mutex<LoaderInner>>,
}

impl std::fmt::Debug for CheckerLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("CheckerLoader")
            .field("status", &inner.status)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl Default for CheckerLoader {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_LOADER: Lazy<CheckerLoader> = Lazy::new(CheckerLoader::new);

impl CheckerLoader {
    /// A fresh loader. Most callers want [`CheckerLoader::global`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LoaderInner {
                status: LoaderStatus::Uninitialized,
                subscribers: Vec::new(),
            })),
        }
    }

    /// The process-wide loader.
    pub fn global() -> &'static CheckerLoader {
        &GLOBAL_LOADER
    }

    /// Current status.
    pub fn status(&self) -> LoaderStatus {
        self.inner.lock().status.clone()
    }

    /// The checker, once ready.
    pub fn checker(&self) -> Option<SharedChecker> {
        match &self.inner.lock().status {
            LoaderStatus::Ready(checker) => Some(checker.clone()),
            _ => None,
        }
    }

    /// Start loading on a worker thread.
    ///
    /// Only the first call spawns a worker; later calls return `false` and drop `factory`.
    pub fn start<F>(&self, factory: F) -> bool
    where
        F: FnOnce() -> LoadOutcome + Send + 'static,
    {
        {
            let mut inner = self.inner.lock();
            if !matches!(inner.status, LoaderStatus::Uninitialized) {
                return false;
            }
            inner.status = LoaderStatus::Loading;
        }

        tracing::debug!("starting grammar checker load");
        let inner = self.inner.clone();
        let spawned = thread::Builder::new()
            .name("grammar-checker-loader".to_string())
            .spawn(move || {
                let outcome = std::panic::catch_unwind(AssertUnwindSafe(factory)).unwrap_or_else(
                    |_| Err(CheckerError::Load("checker initialization panicked".to_string())),
                );
                finish(&inner, outcome);
            });

        if let Err(err) = spawned {
            finish(
                &self.inner,
                Err(CheckerError::Load(format!("failed to spawn loader thread: {err}"))),
            );
        }
        true
    }

    /// Register for the load outcome.
    ///
    /// The receiver yields exactly one value: immediately if loading already finished,
    /// otherwise when it does.
    pub fn subscribe(&self) -> Receiver<LoadOutcome> {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.inner.lock();
        match &inner.status {
            LoaderStatus::Ready(checker) => {
                let _ = tx.send(Ok(checker.clone()));
            }
            LoaderStatus::Failed(err) => {
                let _ = tx.send(Err(err.clone()));
            }
            LoaderStatus::Uninitialized | LoaderStatus::Loading => inner.subscribers.push(tx),
        }
        rx
    }
}

fn finish(inner: &Mutex<LoaderInner>, outcome: LoadOutcome) {
    let mut inner = inner.lock();
    inner.status = match &outcome {
        Ok(checker) => {
            tracing::debug!("grammar checker ready");
            LoaderStatus::Ready(checker.clone())
        }
        Err(err) => {
            tracing::warn!("{err}");
            LoaderStatus::Failed(err.clone())
        }
    };

    for subscriber in inner.subscribers.drain(..) {
        let _ = subscriber.send(outcome.clone());
    }
}
