//! Curtain: maintenance-window visibility scheduling.
//!
//! Subcommands:
//! - `banner`: closable banner with auto-hide and optional persisted dismissal
//! - `overlay`: blocking overlay that tracks its window exactly
//! - `reset`: clear the persisted dismissal flag

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use miette::Result;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curtain_host::{BANNER_DISMISSED, Banner, BannerConfig, Overlay};
use curtain_scheduler::SystemClock;
use curtain_store::{FileFlagStore, FlagStore};
use curtain_window::WindowSpec;

/// Parse boolean from environment variable, accepting common truthy values.
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true.
/// Accepts "0", "false", "no", "off", "" (case-insensitive) as false.
fn parse_bool_env(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(format!(
            "invalid boolean value '{}', expected 1/true/yes/on or 0/false/no/off",
            s
        )),
    }
}

/// Parse a recurring daily window from `HH:MM-HH:MM`.
fn parse_daily(s: &str) -> Result<WindowSpec, String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected HH:MM-HH:MM, got '{}'", s))?;
    let (start_hour, start_minute) = parse_hhmm(start)?;
    let (end_hour, end_minute) = parse_hhmm(end)?;
    Ok(WindowSpec::daily(
        start_hour,
        start_minute,
        end_hour,
        end_minute,
    ))
}

fn parse_hhmm(s: &str) -> Result<(u32, u32), String> {
    let s = s.trim();
    let (hour, minute) = s
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{}'", s))?;
    let hour: u32 = hour.parse().map_err(|_| format!("invalid hour '{}'", hour))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| format!("invalid minute '{}'", minute))?;
    if hour > 23 || minute > 59 {
        return Err(format!("time of day out of range: '{}'", s));
    }
    Ok((hour, minute))
}

#[derive(Parser)]
#[command(name = "curtain")]
#[command(about = "Maintenance-window visibility scheduling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Window selection, shared by `banner` and `overlay`.
#[derive(Args)]
struct WindowArgs {
    /// Window start (RFC 3339, e.g. 2026-02-06T17:03:00Z)
    #[arg(long, env = "CURTAIN_START")]
    start: Option<chrono::DateTime<chrono::Utc>>,

    /// Window end (RFC 3339)
    #[arg(long, env = "CURTAIN_END")]
    end: Option<chrono::DateTime<chrono::Utc>>,

    /// Recurring daily window as HH:MM-HH:MM. An end at or before the
    /// start rolls into the next day.
    #[arg(long, env = "CURTAIN_DAILY", value_parser = parse_daily, conflicts_with_all = ["start", "end"])]
    daily: Option<WindowSpec>,
}

impl WindowArgs {
    fn into_spec(self) -> Result<WindowSpec> {
        match (self.daily, self.start, self.end) {
            (Some(spec), None, None) => Ok(spec),
            (None, Some(start), Some(end)) => Ok(WindowSpec::absolute(start, end)),
            _ => Err(miette::miette!(
                "provide either --start and --end, or --daily"
            )),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a closable maintenance banner
    Banner {
        #[command(flatten)]
        window: WindowArgs,

        /// Auto-hide delay in milliseconds (0 disables)
        #[arg(long, env = "CURTAIN_AUTO_HIDE_MS", default_value = "8000")]
        auto_hide_ms: u64,

        /// Persist dismissal so the banner stays hidden across runs
        #[arg(long, env = "CURTAIN_PERSIST", value_parser = parse_bool_env, default_value = "false")]
        persist: bool,

        /// Dismiss this many milliseconds after mount (simulates the
        /// close button)
        #[arg(long)]
        dismiss_after_ms: Option<u64>,

        /// Flag store path (defaults under the user cache directory)
        #[arg(long, env = "CURTAIN_STORE_PATH")]
        store_path: Option<PathBuf>,
    },

    /// Run a maintenance overlay
    Overlay {
        #[command(flatten)]
        window: WindowArgs,

        /// Flag store path (defaults under the user cache directory)
        #[arg(long, env = "CURTAIN_STORE_PATH")]
        store_path: Option<PathBuf>,
    },

    /// Clear the persisted banner dismissal flag
    Reset {
        /// Flag store path (defaults under the user cache directory)
        #[arg(long, env = "CURTAIN_STORE_PATH")]
        store_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "curtain=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Banner {
            window,
            auto_hide_ms,
            persist,
            dismiss_after_ms,
            store_path,
        } => run_banner(window, auto_hide_ms, persist, dismiss_after_ms, store_path).await,

        Commands::Overlay { window, store_path } => run_overlay(window, store_path).await,

        Commands::Reset { store_path } => run_reset(store_path),
    }
}

fn open_store(store_path: Option<PathBuf>) -> Arc<dyn FlagStore> {
    let path = store_path.unwrap_or_else(FileFlagStore::default_path);
    Arc::new(FileFlagStore::new(path))
}

async fn run_banner(
    window: WindowArgs,
    auto_hide_ms: u64,
    persist: bool,
    dismiss_after_ms: Option<u64>,
    store_path: Option<PathBuf>,
) -> Result<()> {
    let spec = window.into_spec()?;
    let config = BannerConfig {
        window: spec,
        auto_hide: (auto_hide_ms > 0).then(|| Duration::from_millis(auto_hide_ms)),
        persist_dismissal: persist,
    };

    let banner = Arc::new(Banner::mount(
        config,
        open_store(store_path),
        Arc::new(SystemClock),
    ));

    if let Some(ms) = dismiss_after_ms {
        let banner = Arc::clone(&banner);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            info!("dismissing banner");
            banner.dismiss();
        });
    }

    watch_transitions(banner.visibility(), "banner").await;
    banner.unmount();
    Ok(())
}

async fn run_overlay(window: WindowArgs, store_path: Option<PathBuf>) -> Result<()> {
    let spec = window.into_spec()?;
    let overlay = Overlay::mount(spec, open_store(store_path), Arc::new(SystemClock));

    watch_transitions(overlay.visibility(), "overlay").await;
    overlay.unmount();
    Ok(())
}

fn run_reset(store_path: Option<PathBuf>) -> Result<()> {
    let store = open_store(store_path);
    store
        .clear(BANNER_DISMISSED)
        .map_err(|e| miette::miette!("{}", e))?;
    info!("cleared persisted banner dismissal");
    Ok(())
}

/// Log visibility transitions until ctrl-c.
async fn watch_transitions(mut rx: watch::Receiver<bool>, host: &str) {
    info!(host, visible = *rx.borrow_and_update(), "mounted");
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                info!(host, visible = *rx.borrow_and_update(), "visibility changed");
            }
            _ = tokio::signal::ctrl_c() => {
                info!(host, "shutting down");
                break;
            }
        }
    }
}
