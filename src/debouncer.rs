//! Debounce scheduler
//!
//! Delays a callback until a quiet period has elapsed since the last `arm`.
//! Re-arming restarts the timer, so only the last call in a burst fires.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Identifies one armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The currently armed timer
#[derive(Debug)]
struct ArmedTimer {
    handle: TimerHandle,
    guard: CancellationToken,
    task: JoinHandle<()>,
}

/// Timer that fires a callback once after a fixed quiet period
///
/// Timers run as tokio tasks, so `arm` must be called inside a runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    /// Cancelled when the owning binding is torn down
    binding: CancellationToken,
    armed: Option<ArmedTimer>,
    next_id: u64,
}

impl Debouncer {
    /// Create a debouncer whose timers stop firing once `binding` is cancelled
    pub fn new(delay: Duration, binding: CancellationToken) -> Self {
        Self {
            delay,
            binding,
            armed: None,
            next_id: 0,
        }
    }

    /// Clear any existing timer and start a new one
    ///
    /// `callback` receives the handle returned here and runs at most once,
    /// only if neither this timer nor the binding has been cancelled.
    pub fn arm<F>(&mut self, callback: F) -> TimerHandle
    where
        F: FnOnce(TimerHandle) + Send + 'static,
    {
        self.cancel();

        self.next_id = self.next_id.wrapping_add(1);
        let handle = TimerHandle(self.next_id);
        let guard = self.binding.child_token();
        let delay = self.delay;

        let task_guard = guard.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = task_guard.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !task_guard.is_cancelled() {
                        callback(handle);
                    }
                }
            }
        });

        self.armed = Some(ArmedTimer {
            handle,
            guard,
            task,
        });
        handle
    }

    /// Clear the armed timer without firing it
    ///
    /// Returns the handle of the timer that was cancelled, if any.
    pub fn cancel(&mut self) -> Option<TimerHandle> {
        let armed = self.armed.take()?;
        armed.guard.cancel();
        armed.task.abort();
        Some(armed.handle)
    }

    /// Handle of the armed timer if it has not fired or been cancelled yet
    #[cfg(test)]
    pub(crate) fn pending(&self) -> Option<TimerHandle> {
        self.armed
            .as_ref()
            .filter(|armed| !armed.task.is_finished())
            .map(|armed| armed.handle)
    }

    /// Forget the armed timer after it fired
    pub fn mark_fired(&mut self, handle: TimerHandle) {
        if self.armed.as_ref().is_some_and(|armed| armed.handle == handle) {
            self.armed = None;
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "debouncer_tests.rs"]
mod debouncer_tests;
