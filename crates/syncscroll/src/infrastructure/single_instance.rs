//! Single-instance guard backed by a named Win32 mutex.
//!
//! Two synchronizers running at once would each install a hook and each
//! replay every wheel event, so the target would scroll twice.  Sync mode
//! therefore claims a session-wide named mutex before it installs anything.
//!
//! # How the check works (for beginners)
//!
//! `CreateMutexW` with a name either creates the kernel object or opens the
//! one that already exists.  In the second case it still succeeds but sets
//! the thread's last error to `ERROR_ALREADY_EXISTS`.  The object lives as
//! long as any process holds a handle to it, so dropping [`SingleInstance`]
//! (or the process exiting) frees the name for the next run.

use thiserror::Error;
use tracing::debug;
use windows::core::HSTRING;
use windows::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, HANDLE};
use windows::Win32::System::Threading::CreateMutexW;

/// Mutex name used by the binary.  The `Local\` prefix scopes it to the
/// current logon session.
pub const APP_MUTEX_NAME: &str = "Local\\SyncScroll_5B0E7A53-2C4D-4E38-9F61-3A9D8C1B7E20";

/// Error type for [`SingleInstance::acquire`].
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("another instance is already running")]
    AlreadyRunning,
    #[error("platform error: {0}")]
    Platform(String),
}

/// Holds the named mutex for as long as it is alive.
#[derive(Debug)]
pub struct SingleInstance {
    handle: HANDLE,
}

impl SingleInstance {
    /// Claims [`APP_MUTEX_NAME`].
    pub fn acquire() -> Result<Self, InstanceError> {
        Self::acquire_named(APP_MUTEX_NAME)
    }

    /// Claims the named mutex `name`, failing if any process already holds it.
    pub fn acquire_named(name: &str) -> Result<Self, InstanceError> {
        // SAFETY: no security attributes; the name outlives the call.
        let handle = unsafe { CreateMutexW(None, false, &HSTRING::from(name)) }
            .map_err(|e| InstanceError::Platform(format!("CreateMutexW failed: {e}")))?;

        // SAFETY: reads the calling thread's last-error slot, which
        // CreateMutexW just set.
        if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
            // SAFETY: `handle` was opened above and is not used afterwards.
            unsafe {
                let _ = CloseHandle(handle);
            }
            return Err(InstanceError::AlreadyRunning);
        }

        debug!(name, "single-instance mutex acquired");
        Ok(Self { handle })
    }
}

impl Drop for SingleInstance {
    fn drop(&mut self) {
        // SAFETY: `handle` is owned by this value and closed exactly once.
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own name so parallel tests never collide.

    #[test]
    fn test_second_acquire_of_held_name_fails() {
        // Arrange
        let name = "Local\\SyncScroll_test_second_acquire";
        let _first = SingleInstance::acquire_named(name).expect("first acquire succeeds");

        // Act
        let second = SingleInstance::acquire_named(name);

        // Assert
        assert!(matches!(second, Err(InstanceError::AlreadyRunning)));
    }

    #[test]
    fn test_name_is_free_again_after_drop() {
        let name = "Local\\SyncScroll_test_free_after_drop";
        let first = SingleInstance::acquire_named(name).expect("first acquire succeeds");
        drop(first);

        assert!(SingleInstance::acquire_named(name).is_ok());
    }

    #[test]
    fn test_rejected_acquire_does_not_keep_the_name_alive() {
        let name = "Local\\SyncScroll_test_rejected_acquire";
        let first = SingleInstance::acquire_named(name).expect("first acquire succeeds");
        assert!(SingleInstance::acquire_named(name).is_err());

        drop(first);

        assert!(SingleInstance::acquire_named(name).is_ok());
    }
}
