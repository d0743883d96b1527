//! Windows `WH_MOUSE_LL` hook implementation.
//!
//! The hook is installed from a dedicated Win32 message-loop thread, because
//! Windows delivers low-level hook callbacks to the thread that registered
//! them and only while that thread pumps messages.  `uninstall` posts
//! `WM_QUIT` to the thread, which then unhooks and exits.
//!
//! `WH_MOUSE_LL` callbacks carry no user pointer, so the callback reaches the
//! [`HookState`] through the process-wide [`HOOK_STATE`] slot.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use arc_swap::ArcSwapOption;
use syncscroll_core::{MouseMessage, MouseRecord, Point};
use tracing::{debug, error, info, warn};
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, MSG, MSLLHOOKSTRUCT, WH_MOUSE_LL, WM_QUIT,
};

use super::{HookDecision, HookError, HookState, MouseHook};

/// State read by [`mouse_hook_proc`].  Set by `install`, cleared by
/// `uninstall`.
static HOOK_STATE: ArcSwapOption<HookState> = ArcSwapOption::const_empty();

/// Handle to the running hook thread.
struct HookThread {
    thread_id: u32,
    join: JoinHandle<()>,
}

/// Windows low-level mouse hook.
pub struct WindowsMouseHook {
    thread: Mutex<Option<HookThread>>,
}

impl WindowsMouseHook {
    /// Creates a new (uninstalled) hook.
    pub fn new() -> Self {
        Self {
            thread: Mutex::new(None),
        }
    }
}

impl Default for WindowsMouseHook {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseHook for WindowsMouseHook {
    fn install(&self, state: Arc<HookState>) -> Result<(), HookError> {
        let mut thread_slot = self
            .thread
            .lock()
            .map_err(|_| HookError::InstallFailed("hook thread lock poisoned".to_string()))?;

        if thread_slot.is_some() || HOOK_STATE.load().is_some() {
            return Err(HookError::AlreadyInstalled);
        }
        HOOK_STATE.store(Some(state));

        // The thread reports its id once the hook is registered, or the error
        // that stopped it.
        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, HookError>>();

        let join = thread::Builder::new()
            .name("syncscroll-hook".to_string())
            .spawn(move || run_hook_message_loop(ready_tx))
            .map_err(|e| {
                HOOK_STATE.store(None);
                HookError::InstallFailed(e.to_string())
            })?;

        let ready = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(HookError::InstallFailed("hook thread exited early".to_string())));

        match ready {
            Ok(thread_id) => {
                info!(thread_id, "low-level mouse hook installed");
                *thread_slot = Some(HookThread { thread_id, join });
                Ok(())
            }
            Err(e) => {
                HOOK_STATE.store(None);
                if join.join().is_err() {
                    error!("hook thread panicked during failed install");
                }
                Err(e)
            }
        }
    }

    fn uninstall(&self) -> Result<(), HookError> {
        // Held for the whole teardown so a concurrent install cannot slip in
        // between the quit message and the state release.
        let mut slot = match self.thread.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };

        let Some(hook_thread) = slot.take() else {
            debug!("uninstall called but no mouse hook is installed");
            return Ok(());
        };

        // SAFETY: PostThreadMessageW only enqueues a message; the id belongs
        // to the hook thread, which has a message queue.
        let posted =
            unsafe { PostThreadMessageW(hook_thread.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
        if let Err(e) = posted {
            // The thread is still pumping with the hook installed.  Keep the
            // handle and the state so a later uninstall can retry.
            error!("failed to post WM_QUIT to hook thread: {e}");
            *slot = Some(hook_thread);
            return Err(HookError::UninstallFailed(e.to_string()));
        }
        debug!("WM_QUIT posted to hook thread");

        let joined = hook_thread.join.join();

        match HOOK_STATE.swap(None) {
            Some(state) => {
                state.detach();
                debug!("hook state released and event channel closed");
            }
            None => warn!("hook state slot was already empty"),
        }

        if joined.is_err() {
            error!("hook thread panicked");
            return Err(HookError::UninstallFailed("hook thread panicked".to_string()));
        }
        info!("low-level mouse hook uninstalled");
        Ok(())
    }

    fn is_installed(&self) -> bool {
        self.thread.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop(ready: mpsc::Sender<Result<u32, HookError>>) {
    // SAFETY: GetModuleHandleW(None) returns the handle of the current
    // executable and does not transfer ownership.
    let module = match unsafe { GetModuleHandleW(None) } {
        Ok(module) => module,
        Err(e) => {
            let _ = ready.send(Err(HookError::ModuleHandle(e.to_string())));
            return;
        }
    };

    // SAFETY: SetWindowsHookExW requires the calling thread to pump messages,
    // which this thread does below until WM_QUIT.
    let hook = match unsafe {
        SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), Some(HINSTANCE(module.0)), 0)
    } {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(HookError::InstallFailed(e.to_string())));
            return;
        }
    };

    // SAFETY: always safe to call.
    let thread_id = unsafe { GetCurrentThreadId() };
    if ready.send(Ok(thread_id)).is_err() {
        warn!("installer stopped waiting for the hook thread");
    }

    // Win32 message loop – blocks until WM_QUIT is posted
    let mut msg = MSG::default();
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    // SAFETY: `hook` was returned by SetWindowsHookExW on this thread.
    match unsafe { UnhookWindowsHookEx(hook) } {
        Ok(()) => debug!("UnhookWindowsHookEx succeeded"),
        Err(e) => error!("UnhookWindowsHookEx failed: {e}"),
    }
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread; must return quickly
/// and must not unwind across the FFI boundary.
unsafe extern "system" fn mouse_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code >= 0 {
        // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code >= 0.
        let raw = &*(l_param.0 as *const MSLLHOOKSTRUCT);
        let record = MouseRecord {
            point: Point::new(raw.pt.x, raw.pt.y),
            mouse_data: raw.mouseData,
            flags: raw.flags,
            time: raw.time,
            extra_info: raw.dwExtraInfo,
        };
        let message = MouseMessage::from_id(w_param.0 as u32);

        let decision = panic::catch_unwind(AssertUnwindSafe(|| {
            HOOK_STATE
                .load()
                .as_deref()
                .map_or(HookDecision::PassThrough, |state| state.handle(n_code, message, &record))
        }))
        .unwrap_or_else(|_| {
            error!("panic in mouse hook callback, passing event through");
            HookDecision::PassThrough
        });

        if decision == HookDecision::Swallow {
            return LRESULT(1);
        }
    }

    // SAFETY: Forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
