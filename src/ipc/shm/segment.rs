/*!
 * Shared Memory Segment
 * POSIX shared memory object holding the three-word identity block
 */

use super::types::{validate_name, ProcessSlot, SharedIdentity, ShmError};
use crate::core::limits::{SHM_LENGTH, SHM_WORDS};
use crate::core::types::RawPid;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd::{ftruncate, getpid};
use std::fs::File;
use std::num::NonZeroUsize;
use std::os::fd::OwnedFd;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const MAP_LENGTH: NonZeroUsize = match NonZeroUsize::new(SHM_LENGTH) {
    Some(length) => length,
    None => panic!("identity block cannot be empty"),
};

/// Who is responsible for the segment's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRole {
    /// Created the object; unlinks it on teardown
    Owner,
    /// Opened an existing object; only unmaps
    Attached,
}

/// Mapped identity block
///
/// Words are accessed as `AtomicI32`: writers publish with `Release`, readers
/// load with `Acquire`. The mapping holds only pids, never pointers.
pub struct SharedSegment {
    name: String,
    base: NonNull<AtomicI32>,
    role: SegmentRole,
    unlinked: AtomicBool,
    // Closed after the mapping is released
    _fd: OwnedFd,
}

// SAFETY: the mapping is MAP_SHARED memory that lives until Drop, and every
// access goes through the atomics.
unsafe impl Send for SharedSegment {}
unsafe impl Sync for SharedSegment {}

impl SharedSegment {
    /// Create (or take over) the named segment, size it and zero it
    pub fn create(name: &str) -> Result<Self, ShmError> {
        validate_name(name)?;

        let fd = shm_open(
            name,
            OFlag::O_CREAT | OFlag::O_RDWR,
            Mode::from_bits_truncate(0o666),
        )
        .map_err(|errno| ShmError::Create {
            name: name.to_string(),
            errno,
        })?;

        ftruncate(&fd, SHM_LENGTH as nix::libc::off_t).map_err(|errno| ShmError::Resize {
            name: name.to_string(),
            errno,
        })?;

        let segment = Self::map(name, fd, SegmentRole::Owner)?;
        for slot in ProcessSlot::ALL {
            segment.word(slot).store(0, Ordering::Release);
        }

        info!(name = name, bytes = SHM_LENGTH, "Shared memory segment created");
        Ok(segment)
    }

    /// Open a segment created by another process
    ///
    /// Retries while the object is missing or not yet sized, since the tower
    /// and ground control start in no particular order.
    pub fn open(name: &str, retries: u32, interval: Duration) -> Result<Self, ShmError> {
        validate_name(name)?;

        let retries = retries.max(1);
        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = shm_open(name, OFlag::O_RDWR, Mode::empty()).and_then(|fd| {
                let file = File::from(fd);
                match file.metadata() {
                    Ok(meta) if meta.len() >= SHM_LENGTH as u64 => Ok(OwnedFd::from(file)),
                    // Created but not resized yet
                    _ => Err(Errno::EAGAIN),
                }
            });

            match result {
                Ok(fd) => {
                    let segment = Self::map(name, fd, SegmentRole::Attached)?;
                    info!(name = name, attempts = attempts, "Shared memory segment opened");
                    return Ok(segment);
                }
                Err(errno) if attempts < retries => {
                    debug!(name = name, attempt = attempts, error = %errno, "Segment not ready, retrying");
                    thread::sleep(interval);
                }
                Err(errno) => {
                    return Err(ShmError::Open {
                        name: name.to_string(),
                        attempts,
                        errno,
                    })
                }
            }
        }
    }

    fn map(name: &str, fd: OwnedFd, role: SegmentRole) -> Result<Self, ShmError> {
        // SAFETY: fresh mapping of a descriptor we own, at a kernel-chosen address
        let ptr = unsafe {
            mmap(
                None,
                MAP_LENGTH,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &fd,
                0,
            )
        }
        .map_err(|errno| ShmError::Map {
            name: name.to_string(),
            errno,
        })?;

        Ok(Self {
            name: name.to_string(),
            base: ptr.cast::<AtomicI32>(),
            role,
            unlinked: AtomicBool::new(false),
            _fd: fd,
        })
    }

    #[inline]
    fn word(&self, slot: ProcessSlot) -> &AtomicI32 {
        debug_assert!(slot.index() < SHM_WORDS);
        // SAFETY: slot index is within the SHM_WORDS mapped words, and i32 and
        // AtomicI32 share layout. The page alignment of the mapping covers
        // AtomicI32 alignment.
        unsafe { &*self.base.as_ptr().add(slot.index()) }
    }

    /// Publish a pid into its slot
    pub fn publish(&self, slot: ProcessSlot, pid: RawPid) {
        self.word(slot).store(pid, Ordering::Release);
        debug!(slot = %slot, pid = pid, "Published pid");
    }

    /// Publish the calling process's pid
    pub fn publish_self(&self, slot: ProcessSlot) -> RawPid {
        let pid = getpid().as_raw();
        self.publish(slot, pid);
        pid
    }

    /// Pid in a slot, `None` while unpublished
    pub fn pid(&self, slot: ProcessSlot) -> Option<RawPid> {
        let pid = self.word(slot).load(Ordering::Acquire);
        (pid > 0).then_some(pid)
    }

    /// Snapshot of all three slots
    pub fn identity(&self) -> SharedIdentity {
        let mut words = [0; SHM_WORDS];
        for slot in ProcessSlot::ALL {
            words[slot.index()] = self.word(slot).load(Ordering::Acquire);
        }
        SharedIdentity::from_words(words)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> SegmentRole {
        self.role
    }

    /// Remove the segment name
    ///
    /// Only the owner unlinks; calling it again, or from an attached handle,
    /// is a no-op.
    pub fn unlink(&self) -> Result<(), ShmError> {
        if self.role != SegmentRole::Owner || self.unlinked.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if Self::unlink_name(&self.name)? {
            info!(name = %self.name, "Shared memory segment unlinked");
        }
        Ok(())
    }

    /// Unlink a segment by name
    ///
    /// Returns whether a segment was removed. A missing segment is not an error.
    pub fn unlink_name(name: &str) -> Result<bool, ShmError> {
        match shm_unlink(name) {
            Ok(()) => Ok(true),
            Err(Errno::ENOENT) => {
                debug!(name = name, "Shared memory segment already unlinked");
                Ok(false)
            }
            Err(errno) => Err(ShmError::Unlink {
                name: name.to_string(),
                errno,
            }),
        }
    }
}

impl Drop for SharedSegment {
    fn drop(&mut self) {
        // SAFETY: base came from mmap with MAP_LENGTH and no reference into the
        // mapping outlives &self
        if let Err(errno) = unsafe { munmap(self.base.cast(), SHM_LENGTH) } {
            warn!(name = %self.name, error = %errno, "Failed to unmap shared memory");
        }
        if let Err(e) = self.unlink() {
            warn!(error = %e, "Failed to unlink shared memory on drop");
        }
    }
}

impl std::fmt::Debug for SharedSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSegment")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("identity", &self.identity())
            .finish()
    }
}
