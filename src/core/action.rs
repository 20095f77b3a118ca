//! Opaque action handles collected and ordered by the engine.
//!
//! The engine never invokes a handle itself: each tick produces an ordered
//! list of handles, and the host loop is responsible for invoking them.

use std::fmt;
use std::sync::Arc;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// An opaque, invokable token wrapping zero or more callbacks.
///
/// Handles are cheap to clone (shared allocation) and compare by identity:
/// a clone is equal to the handle it was cloned from, while two handles
/// built from the same closure separately are not. This lets hosts and
/// tests recognize a handle they installed in a returned action list.
///
/// # Example
///
/// ```rust
/// use stratum::ActionHandle;
///
/// let greet = ActionHandle::from_fn(|| println!("hello"));
/// let copy = greet.clone();
/// assert_eq!(greet, copy);
///
/// // The host decides when (and whether) to run the callbacks.
/// copy.invoke();
/// ```
#[derive(Clone)]
pub struct ActionHandle {
    callbacks: Arc<[Callback]>,
}

impl ActionHandle {
    /// A handle with no callbacks. Still a valid, orderable token.
    pub fn none() -> Self {
        Self {
            callbacks: Arc::from(Vec::new()),
        }
    }

    /// Wrap a single callback.
    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            callbacks: Arc::from(vec![Arc::new(callback) as Callback]),
        }
    }

    /// Concatenate two handles into one that runs both callback lists in order.
    pub fn join(&self, other: &ActionHandle) -> ActionHandle {
        let mut callbacks: Vec<Callback> = self.callbacks.to_vec();
        callbacks.extend(other.callbacks.iter().cloned());
        Self {
            callbacks: Arc::from(callbacks),
        }
    }

    /// Run every callback in order. Called by the host, never by the engine.
    pub fn invoke(&self) {
        for callback in self.callbacks.iter() {
            callback();
        }
    }

    /// Number of callbacks behind this handle.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// True when the handle carries no callbacks.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl Default for ActionHandle {
    fn default() -> Self {
        Self::none()
    }
}

impl PartialEq for ActionHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callbacks, &other.callbacks)
    }
}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandle")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// The three action handles every state carries.
///
/// Each slot may be empty; empty handles are still emitted in result lists
/// so the host sees one handle per protocol step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateHooks {
    pub entry: ActionHandle,
    pub tick: ActionHandle,
    pub exit: ActionHandle,
}

impl StateHooks {
    /// Hooks with all three slots empty.
    pub fn none() -> Self {
        Self::default()
    }

    /// Replace the entry handle.
    pub fn on_entry(mut self, handle: ActionHandle) -> Self {
        self.entry = handle;
        self
    }

    /// Replace the per-tick handle.
    pub fn on_tick(mut self, handle: ActionHandle) -> Self {
        self.tick = handle;
        self
    }

    /// Replace the exit handle.
    pub fn on_exit(mut self, handle: ActionHandle) -> Self {
        self.exit = handle;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn empty_handle_has_no_callbacks() {
        let handle = ActionHandle::none();
        assert!(handle.is_empty());
        assert_eq!(handle.len(), 0);
        handle.invoke();
    }

    #[test]
    fn invoke_runs_callbacks_in_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));

        let first = {
            let log = Arc::clone(&log);
            ActionHandle::from_fn(move || log.lock().unwrap().push("first"))
        };
        let second = {
            let log = Arc::clone(&log);
            ActionHandle::from_fn(move || log.lock().unwrap().push("second"))
        };

        let joined = first.join(&second);
        assert_eq!(joined.len(), 2);
        joined.invoke();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn clones_compare_equal() {
        let handle = ActionHandle::from_fn(|| {});
        let copy = handle.clone();
        assert_eq!(handle, copy);
    }

    #[test]
    fn distinct_handles_compare_unequal() {
        let a = ActionHandle::from_fn(|| {});
        let b = ActionHandle::from_fn(|| {});
        assert_ne!(a, b);
    }

    #[test]
    fn invoke_can_repeat() {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = {
            let count = Arc::clone(&count);
            ActionHandle::from_fn(move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        handle.invoke();
        handle.invoke();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn hooks_builder_fills_slots() {
        let entry = ActionHandle::from_fn(|| {});
        let exit = ActionHandle::from_fn(|| {});

        let hooks = StateHooks::none()
            .on_entry(entry.clone())
            .on_exit(exit.clone());

        assert_eq!(hooks.entry, entry);
        assert_eq!(hooks.exit, exit);
        assert!(hooks.tick.is_empty());
    }
}
