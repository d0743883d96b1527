//! Mock input emitter for unit testing.
//!
//! # Why a mock emitter?
//!
//! The real emitter calls `SendInput`, which moves the cursor and scrolls
//! whatever window is under it on the test machine.  `MockInputEmitter`
//! instead records every batch and every posted message in a
//! `Mutex<Vec<...>>` so test assertions can inspect exactly what would have
//! been injected and in what order.
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` to make every call return
//! [`EmitError::Platform`].  This exercises the "log and drop, never retry"
//! path of the processing loop.

use std::sync::Mutex;

use syncscroll_core::{LegacyPost, SyntheticInput, WindowHandle};

use crate::application::process_events::{EmitError, InputEmitter};

/// A mock emitter that records all calls without performing OS API calls.
#[derive(Default)]
pub struct MockInputEmitter {
    /// Every batch passed to `send_batch`, in call order.
    pub batches: Mutex<Vec<Vec<SyntheticInput>>>,
    /// Every `(window, message)` pair passed to `post_message`.
    pub posts: Mutex<Vec<(WindowHandle, LegacyPost)>>,
    /// When `true`, every method returns an error after recording nothing.
    pub should_fail: bool,
}

impl MockInputEmitter {
    /// Creates a new `MockInputEmitter` with empty records and `should_fail = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an emitter whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Number of batches recorded so far.
    pub fn batch_count(&self) -> usize {
        self.batches.lock().expect("lock poisoned").len()
    }

    /// Number of posted messages recorded so far.
    pub fn post_count(&self) -> usize {
        self.posts.lock().expect("lock poisoned").len()
    }
}

impl InputEmitter for MockInputEmitter {
    fn send_batch(&self, batch: &[SyntheticInput]) -> Result<(), EmitError> {
        if self.should_fail {
            return Err(EmitError::Platform("injected failure".to_string()));
        }
        self.batches
            .lock()
            .expect("lock poisoned")
            .push(batch.to_vec());
        Ok(())
    }

    fn post_message(&self, window: WindowHandle, post: LegacyPost) -> Result<(), EmitError> {
        if self.should_fail {
            return Err(EmitError::Platform("injected failure".to_string()));
        }
        self.posts
            .lock()
            .expect("lock poisoned")
            .push((window, post));
        Ok(())
    }
}
