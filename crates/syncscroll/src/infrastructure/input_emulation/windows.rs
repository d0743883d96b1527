//! Windows input injection via `SendInput` and `PostMessageW`.
//!
//! A forwarded scroll is handed to `SendInput` as a single array so the OS
//! inserts the three records into the input stream back to back.  The legacy
//! mode posts `WM_MOUSEWHEEL` / `WM_MOUSEHWHEEL` directly to a window's
//! message queue and never touches the cursor.

#![cfg(target_os = "windows")]

use std::ffi::c_void;

use syncscroll_core::{LegacyPost, SyntheticInput, WindowHandle};
use tracing::trace;
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEINPUT, MOUSE_EVENT_FLAGS,
};
use windows::Win32::UI::WindowsAndMessaging::PostMessageW;

use crate::application::process_events::{EmitError, InputEmitter};

/// Pre-computed size of `INPUT` for `SendInput` calls.
const INPUT_SIZE: i32 = std::mem::size_of::<INPUT>() as i32;

/// Windows implementation of [`InputEmitter`].
pub struct WindowsInputEmitter;

impl WindowsInputEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsInputEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl InputEmitter for WindowsInputEmitter {
    fn send_batch(&self, batch: &[SyntheticInput]) -> Result<(), EmitError> {
        let inputs: Vec<INPUT> = batch.iter().map(to_win32_input).collect();

        // SAFETY: `inputs` is a valid slice of INPUT structures and INPUT_SIZE
        // matches their layout.
        let inserted = unsafe { SendInput(&inputs, INPUT_SIZE) };

        if inserted as usize != inputs.len() {
            return Err(EmitError::Partial {
                sent: inserted as usize,
                expected: inputs.len(),
            });
        }
        trace!(count = inserted, "SendInput submitted batch");
        Ok(())
    }

    fn post_message(&self, window: WindowHandle, post: LegacyPost) -> Result<(), EmitError> {
        let hwnd = HWND(window.0 as *mut c_void);
        // SAFETY: PostMessageW only enqueues; an invalid handle yields an error.
        unsafe {
            PostMessageW(
                Some(hwnd),
                post.message,
                WPARAM(post.wparam),
                LPARAM(post.lparam),
            )
        }
        .map_err(|e| EmitError::Post {
            window,
            reason: e.to_string(),
        })
    }
}

fn to_win32_input(input: &SyntheticInput) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: input.dx,
                dy: input.dy,
                // Win32 treats mouseData as signed for WHEEL/HWHEEL events.
                mouseData: input.mouse_data,
                dwFlags: MOUSE_EVENT_FLAGS(input.flags.0),
                time: 0,
                dwExtraInfo: input.extra_info,
            },
        },
    }
}
