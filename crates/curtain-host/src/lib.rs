//! Host policies for Curtain's maintenance UI.
//!
//! Both hosts are thin configuration permutations over
//! [`curtain_scheduler::WindowScheduler`]:
//!
//! - [`Banner`]: closable, auto-hides a fixed duration after mount,
//!   and can persist its dismissal to a flag store.
//! - [`Overlay`]: tracks its window exactly, nothing else.

mod banner;
mod overlay;

pub use banner::{BANNER_DISMISSED, Banner, BannerConfig, DEBUG_SHOW_BANNER, DEFAULT_AUTO_HIDE};
pub use overlay::{DEBUG_SHOW_OVERLAY, Overlay};

use curtain_store::FlagStore;
use tracing::warn;

/// Read a flag, treating store failures as "absent" so a broken
/// backend can never break a mount.
pub(crate) fn read_flag(store: &dyn FlagStore, name: &str) -> bool {
    match store.get(name) {
        Ok(value) => value,
        Err(e) => {
            warn!(flag = name, error = %e, "flag read failed, treating as unset");
            false
        }
    }
}
