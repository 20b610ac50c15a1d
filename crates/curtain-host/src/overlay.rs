//! Full-screen maintenance overlay.

use std::sync::Arc;

use tokio::sync::watch;

use curtain_scheduler::{Clock, SchedulerOptions, WindowScheduler};
use curtain_store::FlagStore;
use curtain_window::WindowSpec;

use crate::read_flag;

/// Flag consulted at mount to force the overlay visible.
pub const DEBUG_SHOW_OVERLAY: &str = "debug.show_overlay";

/// A mounted maintenance overlay.
///
/// Not user-dismissable: it appears when its window opens and leaves
/// when the window ends. Dropping the overlay tears the scheduler
/// down.
pub struct Overlay {
    scheduler: WindowScheduler,
}

impl Overlay {
    /// Mount the overlay over `window`.
    pub fn mount(window: WindowSpec, store: Arc<dyn FlagStore>, clock: Arc<dyn Clock>) -> Self {
        let options = SchedulerOptions::new().with_debug_override(Box::new(move || {
            read_flag(store.as_ref(), DEBUG_SHOW_OVERLAY)
        }));
        let scheduler = WindowScheduler::new(&window, options, clock);
        Self { scheduler }
    }

    /// Subscribe to visibility changes.
    pub fn visibility(&self) -> watch::Receiver<bool> {
        self.scheduler.visibility()
    }

    /// Current visibility.
    pub fn is_visible(&self) -> bool {
        self.scheduler.is_visible()
    }

    /// Cancel pending timers without changing visibility. Also runs on
    /// drop.
    pub fn unmount(&self) {
        self.scheduler.shutdown();
    }
}
