//! File-backed shared memory mapping.
//!
//! The writer creates the backing file and maps it shared read-write. Other
//! processes attach to an existing file, either read-only or for maintenance
//! (resetting counts). There is no lock between the two sides: every shared
//! word is accessed with aligned 8-byte atomics.

use std::ffi::c_void;
use std::fs::{File, OpenOptions};
use std::num::NonZeroUsize;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use nix::sys::mman::{MapFlags, ProtFlags, mmap, munmap};
use tracing::debug;

use crate::error::{Result, TableError};

/// Permission bits of a newly created backing file.
const FILE_MODE: u32 = 0o644;

/// How a process attaches to an existing table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AttachMode {
    /// Observe counts only; the mapping is not writable.
    #[default]
    ReadOnly,
    /// Allowed to modify counts in place (reset).
    Maintenance,
}

impl AttachMode {
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Maintenance)
    }
}

/// A shared mapping of a whole backing file.
pub struct SharedRegion {
    ptr: NonNull<c_void>,
    len: usize,
    writable: bool,
    path: PathBuf,
    /// Kept open for the lifetime of the mapping.
    _file: File,
}

impl SharedRegion {
    /// Create (or recreate) the backing file at `path` and map it read-write.
    ///
    /// The file is truncated to zero and then extended to `len` bytes, so the
    /// mapping starts out zero-filled.
    ///
    /// # Errors
    ///
    /// Returns `Open`, `Truncate` or `Map` depending on which step failed.
    pub fn create(path: &Path, len: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(FILE_MODE)
            .open(path)
            .map_err(|source| TableError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let size = len as u64;
        for step in [0, size] {
            file.set_len(step).map_err(|source| TableError::Truncate {
                path: path.to_path_buf(),
                size: step,
                source,
            })?;
        }

        Self::map(file, path, len, true)
    }

    /// Attach to an existing backing file. Never creates the file.
    ///
    /// # Errors
    ///
    /// Returns `Open` if the file does not exist or cannot be opened,
    /// `TooSmall` if it is shorter than `len`, and `Map` if mmap fails.
    pub fn attach(path: &Path, len: usize, mode: AttachMode) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(mode.is_writable())
            .open(path)
            .map_err(|source| TableError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let actual = file
            .metadata()
            .map_err(|source| TableError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        let expected = len as u64;
        if actual < expected {
            return Err(TableError::TooSmall {
                path: path.to_path_buf(),
                actual,
                expected,
            });
        }

        Self::map(file, path, len, mode.is_writable())
    }

    fn map(file: File, path: &Path, len: usize, writable: bool) -> Result<Self> {
        let len_nz = NonZeroUsize::new(len).ok_or(TableError::InvalidLayout("empty mapping"))?;
        let prot = if writable {
            ProtFlags::PROT_READ | ProtFlags::PROT_WRITE
        } else {
            ProtFlags::PROT_READ
        };

        let ptr = unsafe { mmap(None, len_nz, prot, MapFlags::MAP_SHARED, &file, 0) }.map_err(
            |source| TableError::Map {
                path: path.to_path_buf(),
                source,
            },
        )?;

        debug!(path = %path.display(), len, writable, "mapped counter table");

        Ok(Self {
            ptr,
            len,
            writable,
            path: path.to_path_buf(),
            _file: file,
        })
    }

    /// Base address of the mapping (page aligned).
    #[must_use]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr().cast::<u8>()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.writable
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// View `range` of the mapping as bytes.
    ///
    /// Returns `None` if the range is out of bounds.
    #[must_use]
    pub fn bytes(&self, start: usize, len: usize) -> Option<&[u8]> {
        let end = start.checked_add(len)?;
        if end > self.len {
            return None;
        }
        Some(unsafe { std::slice::from_raw_parts(self.as_ptr().add(start), len) })
    }

    /// Copy `data` into the mapping at `offset`.
    ///
    /// # Safety
    ///
    /// The region must be writable, `offset + data.len() <= self.len()`, and no
    /// other reference into the destination range may be live.
    pub unsafe fn copy_from(&mut self, offset: usize, data: &[u8]) {
        debug_assert!(self.writable);
        debug_assert!(offset + data.len() <= self.len);
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), self.as_ptr().add(offset), data.len());
        }
    }
}

impl Drop for SharedRegion {
    fn drop(&mut self) {
        unsafe {
            let _ = munmap(self.ptr, self.len);
        }
        debug!(path = %self.path.display(), "unmapped counter table");
    }
}

// The mapping is plain shared memory accessed through atomics.
unsafe impl Send for SharedRegion {}
