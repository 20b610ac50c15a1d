//! Visibility scheduler implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use curtain_window::{Phase, WindowSpec};

use crate::Clock;

/// Predicate consulted once at construction to force visibility,
/// bypassing all window logic.
pub type OverridePredicate = Box<dyn Fn() -> bool + Send + Sync>;

/// Scheduler behavior beyond the window itself.
#[derive(Default)]
pub struct SchedulerOptions {
    debug_override: Option<OverridePredicate>,
    auto_hide: Option<Duration>,
}

impl SchedulerOptions {
    /// Options with no override and no auto-hide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force visibility when the predicate holds at construction.
    pub fn with_debug_override(mut self, predicate: OverridePredicate) -> Self {
        self.debug_override = Some(predicate);
        self
    }

    /// Hide this long after construction even if the window is still
    /// open. The earlier of this and the window end wins.
    pub fn with_auto_hide(mut self, duration: Duration) -> Self {
        self.auto_hide = Some(duration);
        self
    }
}

/// Schedules show/hide transitions for one mounted UI element.
///
/// Construction is synchronous: it resolves the window, classifies the
/// current phase, sets the initial visibility, and arms whatever
/// timers the phase calls for. Hosts observe visibility through the
/// watch receiver from [`WindowScheduler::visibility`].
///
/// A misconfigured window degrades to "never shown" with a warning;
/// construction itself cannot fail.
pub struct WindowScheduler {
    inner: Arc<Inner>,
    visible_rx: watch::Receiver<bool>,
}

struct Inner {
    visible_tx: watch::Sender<bool>,
    clock: Arc<dyn Clock>,
    /// Window end cached at construction, read by the show callback to
    /// compute the hide delay from its own firing time.
    window_end: Option<DateTime<Utc>>,
    slots: Mutex<Slots>,
}

/// Pending timer handles. At most one outstanding handle per slot;
/// arming a slot cancels whatever it previously held.
#[derive(Default)]
struct Slots {
    show: Option<JoinHandle<()>>,
    hide: Option<JoinHandle<()>>,
    auto_hide: Option<JoinHandle<()>>,
    /// Set by dismiss and teardown. A callback that observes this
    /// under the lock must not act, which keeps a stale timer from
    /// firing after its transition was cancelled.
    cancelled: bool,
}

/// Cancel-and-replace for a timer slot.
fn arm(slot: &mut Option<JoinHandle<()>>, handle: JoinHandle<()>) {
    cancel(slot);
    *slot = Some(handle);
}

/// Abort a pending handle, if any. Aborting a task that has already
/// finished is a no-op.
fn cancel(slot: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = slot.take() {
        handle.abort();
    }
}

fn to_std(delay: chrono::Duration) -> Duration {
    delay.to_std().unwrap_or_default()
}

impl WindowScheduler {
    /// Build a scheduler for `spec` and arm its timers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(spec: &WindowSpec, options: SchedulerOptions, clock: Arc<dyn Clock>) -> Self {
        if let Some(predicate) = options.debug_override.as_ref()
            && predicate()
        {
            // The override wins over all window logic: visible, and
            // nothing armed that could take the element back down.
            debug!("debug override active, forcing visible");
            return Self::pinned(true, clock);
        }

        let now = clock.now();
        let window = match spec.resolve(now) {
            Ok(window) => window,
            Err(e) => {
                // A scheduling misconfiguration must never block
                // rendering; the element just stays hidden.
                warn!(error = %e, "window disabled");
                return Self::pinned(false, clock);
            }
        };

        let (visible_tx, visible_rx) = watch::channel(false);
        let inner = Arc::new(Inner {
            visible_tx,
            clock,
            window_end: Some(window.end),
            slots: Mutex::new(Slots::default()),
        });

        let phase = window.phase(now);
        let mut slots = inner.lock_slots();
        match phase {
            Phase::Inside => {
                inner.set_visible(true);
                let delay = window.end - inner.clock.now();
                if delay > chrono::Duration::zero() {
                    let handle = inner.spawn_hide(delay);
                    arm(&mut slots.hide, handle);
                } else {
                    // Raced past the boundary while classifying.
                    inner.set_visible(false);
                }
            }
            Phase::Before => {
                let delay = window.start - inner.clock.now();
                if delay > chrono::Duration::zero() {
                    let handle = inner.spawn_show(delay);
                    arm(&mut slots.show, handle);
                } else {
                    inner.show_now(&mut slots);
                }
            }
            Phase::After => {}
        }

        // The auto-hide runs from mount, independent of the window's
        // own end. A window that will never open again arms nothing.
        if let Some(duration) = options.auto_hide
            && phase != Phase::After
        {
            let handle = inner.spawn_auto_hide(duration);
            arm(&mut slots.auto_hide, handle);
        }
        drop(slots);

        Self { inner, visible_rx }
    }

    /// A scheduler with fixed visibility and no timers, used for the
    /// debug override and for disabled windows.
    fn pinned(visible: bool, clock: Arc<dyn Clock>) -> Self {
        let (visible_tx, visible_rx) = watch::channel(visible);
        let inner = Arc::new(Inner {
            visible_tx,
            clock,
            window_end: None,
            slots: Mutex::new(Slots::default()),
        });
        Self { inner, visible_rx }
    }

    /// Subscribe to visibility changes.
    pub fn visibility(&self) -> watch::Receiver<bool> {
        self.visible_rx.clone()
    }

    /// Current visibility.
    pub fn is_visible(&self) -> bool {
        *self.visible_rx.borrow()
    }

    /// Hide now and cancel every pending timer. Idempotent; safe after
    /// the hide already fired.
    pub fn dismiss(&self) {
        let mut slots = self.inner.lock_slots();
        slots.cancelled = true;
        cancel(&mut slots.show);
        cancel(&mut slots.hide);
        cancel(&mut slots.auto_hide);
        self.inner.set_visible(false);
    }

    /// Cancel every pending timer without altering visibility. Safe to
    /// call repeatedly; also runs on drop.
    pub fn shutdown(&self) {
        let mut slots = self.inner.lock_slots();
        slots.cancelled = true;
        cancel(&mut slots.show);
        cancel(&mut slots.hide);
        cancel(&mut slots.auto_hide);
    }
}

impl Drop for WindowScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn lock_slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_visible(&self, visible: bool) {
        // Hosts are only notified on actual transitions, so redundant
        // hides (dismiss after the timer already fired) stay silent.
        let changed = self.visible_tx.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
        if changed {
            debug!(visible, "visibility changed");
        }
    }

    /// Show immediately and arm the window hide from the current clock
    /// reading, never the originally computed delay. Caller holds the
    /// slot lock.
    fn show_now(self: &Arc<Self>, slots: &mut Slots) {
        self.set_visible(true);
        let Some(end) = self.window_end else {
            return;
        };
        let remaining = end - self.clock.now();
        if remaining > chrono::Duration::zero() {
            let handle = self.spawn_hide(remaining);
            arm(&mut slots.hide, handle);
        } else {
            // The window's remaining width was consumed by timer
            // drift. The element stays visible until the host
            // dismisses or tears down.
            warn!(end = %end, "window already over when show fired, no hide armed");
        }
    }

    fn show_fired(self: &Arc<Self>) {
        let mut slots = self.lock_slots();
        if slots.cancelled {
            return;
        }
        slots.show = None;
        self.show_now(&mut slots);
    }

    fn hide_fired(self: &Arc<Self>) {
        let mut slots = self.lock_slots();
        if slots.cancelled {
            return;
        }
        slots.hide = None;
        // The competing auto-hide loses; cancel it so it cannot fire a
        // second, redundant hide.
        cancel(&mut slots.auto_hide);
        self.set_visible(false);
    }

    fn auto_hide_fired(self: &Arc<Self>) {
        let mut slots = self.lock_slots();
        if slots.cancelled {
            return;
        }
        slots.auto_hide = None;
        cancel(&mut slots.hide);
        self.set_visible(false);
    }

    fn spawn_show(self: &Arc<Self>, delay: chrono::Duration) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        let delay = to_std(delay);
        tokio::spawn(async move {
            sleep(delay).await;
            inner.show_fired();
        })
    }

    fn spawn_hide(self: &Arc<Self>, delay: chrono::Duration) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        let delay = to_std(delay);
        tokio::spawn(async move {
            sleep(delay).await;
            inner.hide_fired();
        })
    }

    fn spawn_auto_hide(self: &Arc<Self>, delay: Duration) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            sleep(delay).await;
            inner.auto_hide_fired();
        })
    }
}
