//! SyncScroll entry point.
//!
//! Loads the configuration, initializes logging, and wires the Win32 adapters
//! into a [`SyncSession`].
//!
//! # Usage
//!
//! ```text
//! syncscroll                           list candidate windows
//! syncscroll <source-hwnd> <target-hwnd>
//!                                      mirror scrolling until Ctrl-C
//! ```
//!
//! Handles are printed by the list mode and accepted in decimal or `0x` hex.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()             -- fatal on invalid values
//!  └─ SingleInstance::acquire() -- sync mode only, fatal if already running
//!  └─ SyncSession::new()
//!       ├─ WindowsMouseHook     (hook thread + message loop)
//!       ├─ WindowsWindowSystem  (EnumWindows, GetWindowRect, ...)
//!       └─ WindowsInputEmitter  (SendInput / PostMessageW)
//!  └─ initialize() / start()
//!       ├─ EventProcessor       (Tokio task)
//!       └─ RectRefresher        (Tokio task)
//! ```

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use syncscroll::infrastructure::storage::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    info!("SyncScroll starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    platform::run(&config, &args).await
}

#[cfg(target_os = "windows")]
mod platform {
    use std::sync::Arc;

    use anyhow::{bail, Context};
    use tracing::info;

    use syncscroll::application::session::{SyncOptions, SyncSession};
    use syncscroll::infrastructure::input_emulation::windows::WindowsInputEmitter;
    use syncscroll::infrastructure::mouse_hook::windows::WindowsMouseHook;
    use syncscroll::infrastructure::single_instance::SingleInstance;
    use syncscroll::infrastructure::storage::config::AppConfig;
    use syncscroll::infrastructure::window_system::windows::WindowsWindowSystem;
    use syncscroll::infrastructure::window_system::WindowSystem;
    use syncscroll_core::WindowHandle;

    pub async fn run(config: &AppConfig, args: &[String]) -> anyhow::Result<()> {
        match args {
            [] => list_windows(),
            [source, target] => {
                let source = parse_handle(source)?;
                let target = parse_handle(target)?;
                sync(config, source, target).await
            }
            _ => bail!("usage: syncscroll [<source-hwnd> <target-hwnd>]"),
        }
    }

    fn list_windows() -> anyhow::Result<()> {
        let windows = WindowsWindowSystem::new()
            .list_windows()
            .context("failed to enumerate windows")?;
        for window in windows.iter() {
            println!("{}", window.display_name());
        }
        Ok(())
    }

    async fn sync(config: &AppConfig, source: WindowHandle, target: WindowHandle) -> anyhow::Result<()> {
        // Held until this function returns.
        let _instance = SingleInstance::acquire().context("cannot start scroll sync")?;

        let session = SyncSession::new(
            Arc::new(WindowsMouseHook::new()),
            Arc::new(WindowsWindowSystem::new()),
            Arc::new(WindowsInputEmitter::new()),
            SyncOptions::from(config),
        );

        session.initialize().context("failed to initialize scroll sync")?;

        let started = session
            .select_source(source)
            .and_then(|_| session.select_target(target))
            .and_then(|_| session.start());
        if let Err(e) = started {
            session.shutdown().await;
            return Err(e).context("failed to start scroll sync");
        }

        info!("SyncScroll ready.  Press Ctrl-C to exit.");

        let mut run_state = session.subscribe();
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                info!("shutdown signal received");
            }
            _ = run_state.wait_for(|state| !state.is_running()) => {
                info!("scroll sync stopped on its own");
            }
        }

        session.shutdown().await;
        info!("SyncScroll stopped");
        Ok(())
    }

    fn parse_handle(text: &str) -> anyhow::Result<WindowHandle> {
        let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => isize::from_str_radix(hex, 16),
            None => text.parse::<isize>(),
        }
        .with_context(|| format!("invalid window handle: {text}"))?;
        Ok(WindowHandle(value))
    }
}

#[cfg(not(target_os = "windows"))]
mod platform {
    use syncscroll::infrastructure::storage::config::AppConfig;

    pub async fn run(_config: &AppConfig, _args: &[String]) -> anyhow::Result<()> {
        anyhow::bail!("SyncScroll requires Windows: the low-level mouse hook is a Win32 facility")
    }
}
