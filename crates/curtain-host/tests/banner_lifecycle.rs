//! End-to-end lifecycle tests for the banner and overlay hosts.
//!
//! These run the real scheduler against virtual time: a paused tokio
//! runtime plus a `SimulatedClock` pinned to it, so every timer fires
//! at an exact, reproducible instant.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use curtain_host::{BANNER_DISMISSED, Banner, BannerConfig, Overlay};
use curtain_scheduler::{Clock, SimulatedClock};
use curtain_store::{FileFlagStore, FlagStore, MemoryFlagStore};
use curtain_window::WindowSpec;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 6, 17, 3, 0).unwrap()
}

fn sim_clock() -> Arc<SimulatedClock> {
    Arc::new(SimulatedClock::starting_at(base()))
}

async fn wait_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn banner_hides_at_whichever_deadline_comes_first() {
    // Window ends 5s after mount, auto-hide at 8s: the window wins.
    let window = WindowSpec::absolute(
        base() - chrono::Duration::minutes(1),
        base() + chrono::Duration::seconds(5),
    );
    let config = BannerConfig {
        window,
        auto_hide: Some(Duration::from_millis(8000)),
        persist_dismissal: false,
    };
    let store: Arc<dyn FlagStore> = Arc::new(MemoryFlagStore::new());
    let banner = Banner::mount(config, store, sim_clock());

    assert!(banner.is_visible());
    wait_ms(4999).await;
    assert!(banner.is_visible());
    wait_ms(2).await;
    assert!(!banner.is_visible());

    // The cancelled auto-hide never produces a second transition.
    let mut rx = banner.visibility();
    rx.borrow_and_update();
    wait_ms(4000).await;
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn banner_auto_hide_wins_inside_a_long_window() {
    let window = WindowSpec::absolute(
        base() - chrono::Duration::minutes(1),
        base() + chrono::Duration::hours(6),
    );
    let config = BannerConfig {
        window,
        auto_hide: Some(Duration::from_millis(8000)),
        persist_dismissal: false,
    };
    let store: Arc<dyn FlagStore> = Arc::new(MemoryFlagStore::new());
    let banner = Banner::mount(config, store, sim_clock());

    assert!(banner.is_visible());
    wait_ms(8001).await;
    assert!(!banner.is_visible());
}

#[tokio::test(start_paused = true)]
async fn dismissal_survives_a_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flags.json");
    let window = WindowSpec::absolute(
        base() - chrono::Duration::minutes(1),
        base() + chrono::Duration::hours(6),
    );
    let config = BannerConfig {
        window,
        auto_hide: None,
        persist_dismissal: true,
    };

    // First session: show, dismiss, persist.
    {
        let store: Arc<dyn FlagStore> = Arc::new(FileFlagStore::new(&path));
        let banner = Banner::mount(config.clone(), store, sim_clock());
        assert!(banner.is_visible());
        banner.dismiss();
    }

    // Second session over the same file: suppressed.
    {
        let store: Arc<dyn FlagStore> = Arc::new(FileFlagStore::new(&path));
        let banner = Banner::mount(config.clone(), Arc::clone(&store), sim_clock());
        assert!(!banner.is_visible());

        // Clearing the flag is the documented way to bring it back.
        store.clear(BANNER_DISMISSED).unwrap();
        let banner = Banner::mount(config, store, sim_clock());
        assert!(banner.is_visible());
    }
}

#[tokio::test(start_paused = true)]
async fn overlay_runs_a_scheduled_daily_window() {
    // Mounted during the afternoon, ahead of a 17:03 -> 17:00 window
    // that crosses midnight.
    let clock: Arc<dyn Clock> = Arc::new(SimulatedClock::starting_at(
        Utc.with_ymd_and_hms(2026, 2, 6, 12, 0, 0).unwrap(),
    ));
    let store: Arc<dyn FlagStore> = Arc::new(MemoryFlagStore::new());
    let overlay = Overlay::mount(WindowSpec::daily(17, 3, 17, 0), store, Arc::clone(&clock));

    assert!(!overlay.is_visible());

    // 17:03 today: shows.
    wait_ms((5 * 3600 + 3 * 60) * 1000 + 1).await;
    assert!(overlay.is_visible());
    assert_eq!(clock.now().date_naive(), base().date_naive());

    // Still up at 23:00.
    wait_ms((5 * 3600 + 57 * 60) * 1000).await;
    assert!(overlay.is_visible());

    // Gone after 17:00 the next day.
    wait_ms(18 * 3600 * 1000).await;
    assert!(!overlay.is_visible());
}
