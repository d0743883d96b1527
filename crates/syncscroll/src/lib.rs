//! syncscroll library entry point.
//!
//! The binary in `main.rs` and the integration tests in `tests/` both build a
//! [`application::session::SyncSession`] from this module tree; the tests
//! simply plug in the mock adapters from `infrastructure`.

pub mod application;
pub mod infrastructure;
