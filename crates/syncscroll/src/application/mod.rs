//! Application layer use cases for the scroll synchronizer.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules in `syncscroll-core`) and the infrastructure (hooks, Win32
//! window queries, `SendInput`, the config file).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "scroll the
//!   target at the same relative spot whenever the source is scrolled").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so every use case runs against mocks in tests.
//! - **Contain no OS calls**.
//!
//! # Sub-modules
//!
//! - **`process_events`** – Consumes captured scroll events, validates them
//!   against the current selection, remaps the point, and emits the synthetic
//!   batch.  Runs on every wheel notch over the source.
//!
//! - **`refresh_rects`** – Periodically re-reads both window rectangles into
//!   the hook's cache and stops the session when a window disappears.
//!
//! - **`manage_windows`** – Enumerates candidate windows and keeps the
//!   source/target selection consistent across refreshes.
//!
//! - **`sync_state`** – Selection and run state shared by all of the above.
//!
//! - **`session`** – Wires everything together behind `initialize`, `start`,
//!   `stop` and `shutdown`.

pub mod manage_windows;
pub mod process_events;
pub mod refresh_rects;
pub mod session;
pub mod sync_state;
