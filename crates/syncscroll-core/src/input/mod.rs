//! Mouse input records.
//!
//! - [`messages`] – what the low-level hook observes: the decoded message kind
//!   and a platform-neutral copy of `MSLLHOOKSTRUCT`.
//! - [`batch`] – what the emitter hands back to the OS: synthetic
//!   `MOUSEINPUT` records and legacy posted window messages.

pub mod batch;
pub mod messages;
