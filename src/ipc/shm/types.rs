/*!
 * Shared Memory Types
 * Identity block layout and shared memory errors
 */

use crate::core::types::RawPid;
use miette::Diagnostic;
use nix::errno::Errno;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Shared memory error types
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ShmError {
    /// Name is not a valid POSIX shared memory object name
    #[error("Invalid shared memory name {0:?}: must start with '/' and contain no other '/'")]
    #[diagnostic(code(shm::invalid_name))]
    InvalidName(String),

    #[error("Failed to create shared memory {name}: {errno}")]
    #[diagnostic(
        code(shm::create_failed),
        help("Check /dev/shm permissions and that no stale segment is owned by another user.")
    )]
    Create { name: String, errno: Errno },

    #[error("Failed to open shared memory {name} after {attempts} attempts: {errno}")]
    #[diagnostic(
        code(shm::open_failed),
        help("The control tower creates the segment; start air_control first.")
    )]
    Open {
        name: String,
        attempts: u32,
        errno: Errno,
    },

    #[error("Failed to size shared memory {name}: {errno}")]
    #[diagnostic(code(shm::resize_failed))]
    Resize { name: String, errno: Errno },

    #[error("Failed to map shared memory {name}: {errno}")]
    #[diagnostic(code(shm::map_failed))]
    Map { name: String, errno: Errno },

    #[error("Failed to unlink shared memory {name}: {errno}")]
    #[diagnostic(code(shm::unlink_failed))]
    Unlink { name: String, errno: Errno },
}

/// Word index of each process in the identity block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum ProcessSlot {
    Tower = 0,
    Radio = 1,
    Ground = 2,
}

impl ProcessSlot {
    pub const ALL: [ProcessSlot; 3] = [ProcessSlot::Tower, ProcessSlot::Radio, ProcessSlot::Ground];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ProcessSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessSlot::Tower => "tower",
            ProcessSlot::Radio => "radio",
            ProcessSlot::Ground => "ground",
        };
        f.write_str(name)
    }
}

/// Snapshot of the identity block
///
/// `None` means the owning process has not published its pid yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SharedIdentity {
    pub tower_pid: Option<RawPid>,
    pub radio_pid: Option<RawPid>,
    pub ground_pid: Option<RawPid>,
}

impl SharedIdentity {
    /// Build from raw words, zero meaning unpublished
    pub fn from_words(words: [RawPid; 3]) -> Self {
        let published = |w: RawPid| (w > 0).then_some(w);
        Self {
            tower_pid: published(words[ProcessSlot::Tower.index()]),
            radio_pid: published(words[ProcessSlot::Radio.index()]),
            ground_pid: published(words[ProcessSlot::Ground.index()]),
        }
    }

    pub fn get(&self, slot: ProcessSlot) -> Option<RawPid> {
        match slot {
            ProcessSlot::Tower => self.tower_pid,
            ProcessSlot::Radio => self.radio_pid,
            ProcessSlot::Ground => self.ground_pid,
        }
    }

    /// Whether all three processes have published
    pub fn is_complete(&self) -> bool {
        ProcessSlot::ALL.iter().all(|slot| self.get(*slot).is_some())
    }
}

/// Validate a POSIX shared memory object name
pub(crate) fn validate_name(name: &str) -> Result<(), ShmError> {
    let valid = name.len() > 1 && name.starts_with('/') && !name[1..].contains('/');
    if valid {
        Ok(())
    } else {
        Err(ShmError::InvalidName(name.to_string()))
    }
}
