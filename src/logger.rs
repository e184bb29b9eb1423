//! Injected logger handle.
//!
//! Every component receives a [`Logger`] at construction and emits its
//! `tracing` events inside [`Logger::scope`], so log output goes to the
//! subscriber the caller chose rather than to whatever is installed globally.
//! The default logger discards everything.

use std::fmt;
use tracing::{Dispatch, Subscriber};

#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// A logger that drops every event.
    pub fn noop() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Wrap an existing dispatcher.
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Build a logger around a subscriber.
    pub fn from_subscriber<S>(subscriber: S) -> Self
    where
        S: Subscriber + Send + Sync + 'static,
    {
        Self::new(Dispatch::new(subscriber))
    }

    /// Capture the dispatcher that is current for the calling thread.
    ///
    /// Binaries call this once after installing their subscriber and pass the
    /// result down explicitly.
    pub fn current() -> Self {
        Self::new(Dispatch::default())
    }

    /// Run `f` with this logger's dispatcher as the default.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
