//! Write-once deferred values.
//!
//! A [`Future`] is resolved exactly once with [`Future::set`]. Consumers
//! never wait on it: they register a continuation with [`Future::on_ready`]
//! (or, more usefully, [`crate::algs::communicator::World::when_ready`]),
//! which runs as soon as the value is available. Registration before and
//! after resolution behave the same.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::mra_error::MraError;

type Waiter<T> = Box<dyn FnOnce(&T) + Send + 'static>;

struct Inner<T> {
    value: OnceCell<T>,
    waiters: Mutex<Vec<Waiter<T>>>,
}

/// Shared handle to a value that may not exist yet.
pub struct Future<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> Future<T> {
    /// An unresolved value.
    pub fn pending() -> Self {
        Self {
            inner: Arc::new(Inner {
                value: OnceCell::new(),
                waiters: Mutex::new(Vec::new()),
            }),
        }
    }

    /// An already-resolved value.
    pub fn ready(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                value: OnceCell::with_value(value),
                waiters: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.value.get().is_some()
    }

    /// The value, if resolved.
    pub fn get(&self) -> Option<&T> {
        self.inner.value.get()
    }

    /// Resolve the value and run every registered continuation.
    ///
    /// Fails with [`MraError::AlreadyResolved`] on a second call; the first
    /// value is kept.
    pub fn set(&self, value: T) -> Result<(), MraError> {
        let waiters = {
            let mut waiters = self.inner.waiters.lock();
            self.inner
                .value
                .set(value)
                .map_err(|_| MraError::AlreadyResolved)?;
            std::mem::take(&mut *waiters)
        };
        if let Some(v) = self.inner.value.get() {
            for waiter in waiters {
                waiter(v);
            }
        }
        Ok(())
    }

    /// Run `f` once the value is available (immediately if it already is).
    pub fn on_ready<F>(&self, f: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        {
            let mut waiters = self.inner.waiters.lock();
            if self.inner.value.get().is_none() {
                waiters.push(Box::new(f));
                return;
            }
        }
        if let Some(v) = self.inner.value.get() {
            f(v);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.value.get() {
            Some(v) => f.debug_tuple("Future").field(v).finish(),
            None => f.write_str("Future(<pending>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static_assertions::assert_impl_all!(Future<Vec<f64>>: Send, Sync, Clone);

    #[test]
    fn continuation_runs_once_either_order() {
        let hits = Arc::new(AtomicUsize::new(0));

        let early = Future::pending();
        let h = hits.clone();
        early.on_ready(move |v: &u32| {
            assert_eq!(*v, 7);
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        early.set(7).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let h = hits.clone();
        early.on_ready(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn second_set_is_rejected() {
        let f = Future::ready(1u8);
        assert_eq!(f.set(2), Err(MraError::AlreadyResolved));
        assert_eq!(f.get(), Some(&1));
    }
}
