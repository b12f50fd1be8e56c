use crate::context::memory::AddrSpace;
use crate::syscall::error::{Error, Result, EFAULT, EINVAL};
use crate::syscall::flag::MapFlags;

/// A span of user memory, typed by the access the kernel needs to it.
///
/// Construction performs no validation. The address space is consulted when
/// the span is verified or copied through, which is what lets a zero-length
/// transfer carry a garbage pointer without tripping a fault.
#[derive(Clone, Copy)]
pub struct UserSlice<const READ: bool, const WRITE: bool> {
    base: usize,
    len: usize,
}

pub type UserSliceRo = UserSlice<true, false>;
pub type UserSliceWo = UserSlice<false, true>;

impl<const READ: bool, const WRITE: bool> UserSlice<READ, WRITE> {
    pub fn new(base: usize, len: usize) -> Self {
        Self { base, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Split [0, end) into [0, idx) and [idx, end)
    pub fn split_at(self, idx: usize) -> Option<(Self, Self)> {
        if idx > self.len {
            return None;
        }
        Some((
            Self {
                base: self.base,
                len: idx,
            },
            Self {
                base: self.base + idx,
                len: self.len - idx,
            },
        ))
    }

    pub fn limit(self, to: usize) -> Option<Self> {
        Some(self.split_at(to)?.0)
    }

    fn required_flags() -> MapFlags {
        let mut flags = MapFlags::empty();
        if READ {
            flags |= MapFlags::PROT_READ;
        }
        if WRITE {
            flags |= MapFlags::PROT_WRITE;
        }
        flags
    }

    /// Check the whole span is mapped with the access this slice's type
    /// requires, without moving any bytes.
    pub fn verify(self, space: &AddrSpace) -> Result<()> {
        if space.check(self.base, self.len, Self::required_flags()) {
            Ok(())
        } else {
            Err(Error::new(EFAULT))
        }
    }
}

impl<const WRITE: bool> UserSlice<true, WRITE> {
    pub fn copy_to_slice(self, space: &AddrSpace, slice: &mut [u8]) -> Result<()> {
        if self.len != slice.len() {
            return Err(Error::new(EINVAL));
        }
        space.read(self.base, slice)
    }
}

impl<const READ: bool> UserSlice<READ, true> {
    pub fn copy_from_slice(self, space: &mut AddrSpace, slice: &[u8]) -> Result<()> {
        if self.len != slice.len() {
            return Err(Error::new(EINVAL));
        }
        space.write(self.base, slice)
    }
}

impl UserSliceRo {
    pub fn ro(base: usize, size: usize) -> Self {
        Self::new(base, size)
    }
}

impl UserSliceWo {
    pub fn wo(base: usize, size: usize) -> Self {
        Self::new(base, size)
    }
}
