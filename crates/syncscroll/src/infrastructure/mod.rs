//! Infrastructure layer.
//!
//! Contains OS-facing adapters: the low-level mouse hook, synthetic input
//! delivery, window queries, config file storage, and (on Windows) the
//! single-instance guard.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `syncscroll_core`.  The `application` layer may import from here only:
//!
//! - the trait definitions and error types declared in each adapter module,
//! - [`mouse_hook::HookState`], the lock-free state the OS hook callback
//!   shares with the use cases (rect cache, guard, event channel sender).
//!
//! Concrete adapters (`windows` sub-modules, mocks) are wired in by `main.rs`
//! and the tests, never by a use case.

pub mod input_emulation;
pub mod mouse_hook;
#[cfg(target_os = "windows")]
pub mod single_instance;
pub mod storage;
pub mod window_system;
