//! Synthetic input delivery.
//!
//! Implements [`InputEmitter`](crate::application::process_events::InputEmitter)
//! on top of `SendInput` / `PostMessageW`.  Only Windows is supported; other
//! targets get the recording mock alone.

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;
