//! Closable maintenance banner.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use curtain_scheduler::{Clock, SchedulerOptions, WindowScheduler};
use curtain_store::FlagStore;
use curtain_window::WindowSpec;

use crate::read_flag;

/// Flag consulted at mount to force the banner visible.
pub const DEBUG_SHOW_BANNER: &str = "debug.show_banner";

/// Flag recording a persisted dismissal.
pub const BANNER_DISMISSED: &str = "banner.dismissed";

/// Default auto-hide duration.
pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_millis(8000);

/// Banner configuration.
#[derive(Clone)]
pub struct BannerConfig {
    /// The maintenance window to display for.
    pub window: WindowSpec,
    /// Hide this long after mount even if the window is still open.
    /// `None` disables the auto-hide.
    pub auto_hide: Option<Duration>,
    /// Suppress re-display across mounts once dismissed. When false
    /// the banner reappears on every mount.
    pub persist_dismissal: bool,
}

impl BannerConfig {
    /// A banner over `window` with the default auto-hide and no
    /// persisted dismissal.
    pub fn new(window: WindowSpec) -> Self {
        Self {
            window,
            auto_hide: Some(DEFAULT_AUTO_HIDE),
            persist_dismissal: false,
        }
    }
}

/// A mounted maintenance banner.
///
/// Dropping the banner tears the underlying scheduler down and
/// cancels any pending timers.
pub struct Banner {
    scheduler: Option<WindowScheduler>,
    store: Arc<dyn FlagStore>,
    persist_dismissal: bool,
    /// Kept alive so a suppressed banner's receivers read a stable
    /// `false`.
    _suppressed_tx: Option<watch::Sender<bool>>,
    visible_rx: watch::Receiver<bool>,
}

impl Banner {
    /// Mount the banner: consult the persisted-dismissal flag, then
    /// build and arm the scheduler.
    ///
    /// The flag is read once here; the mount decision is made against
    /// that single read.
    pub fn mount(config: BannerConfig, store: Arc<dyn FlagStore>, clock: Arc<dyn Clock>) -> Self {
        if config.persist_dismissal && read_flag(store.as_ref(), BANNER_DISMISSED) {
            // Dismissed on a previous mount; stay hidden (and arm
            // nothing) until the flag is cleared externally.
            debug!("banner suppressed by persisted dismissal");
            let (tx, rx) = watch::channel(false);
            return Self {
                scheduler: None,
                store,
                persist_dismissal: true,
                _suppressed_tx: Some(tx),
                visible_rx: rx,
            };
        }

        let debug_store = Arc::clone(&store);
        let mut options = SchedulerOptions::new().with_debug_override(Box::new(move || {
            read_flag(debug_store.as_ref(), DEBUG_SHOW_BANNER)
        }));
        if let Some(duration) = config.auto_hide {
            options = options.with_auto_hide(duration);
        }

        let scheduler = WindowScheduler::new(&config.window, options, clock);
        let visible_rx = scheduler.visibility();
        Self {
            scheduler: Some(scheduler),
            store,
            persist_dismissal: config.persist_dismissal,
            _suppressed_tx: None,
            visible_rx,
        }
    }

    /// Subscribe to visibility changes.
    pub fn visibility(&self) -> watch::Receiver<bool> {
        self.visible_rx.clone()
    }

    /// Current visibility.
    pub fn is_visible(&self) -> bool {
        *self.visible_rx.borrow()
    }

    /// Close-button action: hide now and, when configured, persist the
    /// dismissal so later mounts stay hidden.
    pub fn dismiss(&self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.dismiss();
        }
        if self.persist_dismissal
            && let Err(e) = self.store.set(BANNER_DISMISSED, true)
        {
            // A failed write degrades to ephemeral dismissal.
            warn!(error = %e, "failed to persist banner dismissal");
        }
    }

    /// Cancel pending timers without changing visibility. Also runs on
    /// drop.
    pub fn unmount(&self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.shutdown();
        }
    }
}
