//! Debounced scheduling
//!
//! [`Debouncer`] owns at most one pending timer. Scheduling again cancels
//! the pending one, so a burst of calls collapses into a single callback
//! after the idle window. Dropping the debouncer cancels whatever is
//! pending. Must be used from within a Tokio runtime.

use crate::config::DEFAULT_DEBOUNCE_MS;
use crate::services::PreferenceStore;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// A cancellable, restartable delayed callback
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Run `callback` once `delay` passes without another call to `schedule`
    ///
    /// The callback runs synchronously on the timer task; anything
    /// long-running should be spawned from it so a later `schedule` cannot
    /// abort work that already started.
    pub fn schedule<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = self.delay;
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = pending.take() {
            handle.abort();
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    /// Cancel the pending callback; returns whether one was pending
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        match pending.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

/// Preference setter that coalesces rapid writes
///
/// Only the latest value passed within the idle window is written;
/// intermediate values are superseded, never queued. Writes land in call
/// order: each one waits for the write started before it.
pub struct DebouncedSetter<T> {
    store: PreferenceStore,
    key: String,
    pending: Arc<Mutex<Pending<T>>>,
    debouncer: Debouncer,
}

struct Pending<T> {
    value: Option<T>,
    write: Option<JoinHandle<()>>,
}

/// Wrap `store.set(key, _)` behind a debouncer (150ms when `delay` is `None`)
pub fn make_debounced<T>(
    store: PreferenceStore,
    key: impl Into<String>,
    delay: Option<Duration>,
) -> DebouncedSetter<T>
where
    T: Serialize + Send + Sync + 'static,
{
    DebouncedSetter {
        store,
        key: key.into(),
        pending: Arc::new(Mutex::new(Pending {
            value: None,
            write: None,
        })),
        debouncer: Debouncer::new(delay.unwrap_or(Duration::from_millis(DEFAULT_DEBOUNCE_MS))),
    }
}

impl<T> DebouncedSetter<T>
where
    T: Serialize + Send + Sync + 'static,
{
    pub fn call(&self, value: T) {
        self.lock().value = Some(value);

        let store = self.store.clone();
        let key = self.key.clone();
        let pending = Arc::clone(&self.pending);

        self.debouncer.schedule(move || {
            let mut pending = pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(value) = pending.value.take() {
                let previous = pending.write.take();
                pending.write = Some(tokio::spawn(async move {
                    if let Some(previous) = previous {
                        let _ = previous.await;
                    }
                    store.set(&key, &value).await;
                }));
            }
        });
    }

    /// Write the pending value now instead of waiting for the timer
    ///
    /// Returns once every earlier write has landed too.
    pub async fn flush(&self) {
        self.debouncer.cancel();

        let (value, write) = {
            let mut pending = self.lock();
            (pending.value.take(), pending.write.take())
        };

        if let Some(write) = write {
            let _ = write.await;
        }
        if let Some(value) = value {
            self.store.set(&self.key, &value).await;
        }
    }

    /// Drop the pending value without writing it
    pub fn cancel(&self) {
        self.debouncer.cancel();
        self.lock().value = None;
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn lock(&self) -> MutexGuard<'_, Pending<T>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
