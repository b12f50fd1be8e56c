use core::cmp;

use crate::syscall::error::{Error, Result, EEXIST, EFAULT, EINVAL};
use crate::syscall::flag::MapFlags;

/// A contiguous mapped region of simulated user memory.
///
/// The grant owns its backing bytes; there is no paging underneath this
/// model, so granularity is the byte.
#[derive(Debug)]
pub struct Grant {
    start: usize,
    flags: MapFlags,
    bytes: Vec<u8>,
}

impl Grant {
    pub fn end_address(&self) -> usize {
        self.start + self.bytes.len()
    }

    fn contains(&self, address: usize) -> bool {
        address >= self.start && address < self.end_address()
    }
}

/// A context's address space: a sorted set of non-overlapping grants.
///
/// This is the collaborator the syscall layer consults before touching any
/// user buffer. [`AddrSpace::check`] answers whether a whole range is mapped
/// with the required access, and [`AddrSpace::read`]/[`AddrSpace::write`]
/// perform the actual copies.
#[derive(Debug, Default)]
pub struct AddrSpace {
    grants: Vec<Grant>,
}

impl AddrSpace {
    pub fn new() -> AddrSpace {
        AddrSpace { grants: Vec::new() }
    }

    /// Map a zero-filled region at `start`. The null page stays unmapped and
    /// regions may not overlap existing grants.
    pub fn mmap(&mut self, start: usize, size: usize, flags: MapFlags) -> Result<()> {
        if start == 0 || size == 0 || start.checked_add(size).is_none() {
            return Err(Error::new(EINVAL));
        }
        if self
            .grants
            .iter()
            .any(|grant| start < grant.end_address() && grant.start < start + size)
        {
            return Err(Error::new(EEXIST));
        }

        let i = self
            .grants
            .iter()
            .position(|grant| grant.start > start)
            .unwrap_or(self.grants.len());
        self.grants.insert(
            i,
            Grant {
                start,
                flags,
                bytes: vec![0; size],
            },
        );
        Ok(())
    }

    /// True if `[address, address + len)` is entirely mapped with `flags`
    /// access. A zero-length range is always valid.
    pub fn check(&self, address: usize, len: usize, flags: MapFlags) -> bool {
        if len == 0 {
            return true;
        }
        let Some(end) = address.checked_add(len) else {
            return false;
        };

        // Grants are sorted and disjoint, so a single pass can walk the range
        // grant by grant. Any gap fails the whole range.
        let mut at = address;
        for grant in &self.grants {
            if grant.end_address() <= at {
                continue;
            }
            if !grant.contains(at) || !grant.flags.contains(flags) {
                return false;
            }
            at = grant.end_address();
            if at >= end {
                return true;
            }
        }
        false
    }

    /// Copy bytes out of user memory. The whole source range must be mapped
    /// readable; nothing is copied otherwise.
    pub fn read(&self, address: usize, buf: &mut [u8]) -> Result<()> {
        if !self.check(address, buf.len(), MapFlags::PROT_READ) {
            return Err(Error::new(EFAULT));
        }

        let mut copied = 0;
        while copied < buf.len() {
            let at = address + copied;
            let grant = self.grant_at(at).expect("range checked mapped");
            let offset = at - grant.start;
            let len = cmp::min(buf.len() - copied, grant.bytes.len() - offset);
            buf[copied..copied + len].copy_from_slice(&grant.bytes[offset..offset + len]);
            copied += len;
        }
        Ok(())
    }

    /// Copy bytes into user memory. The whole target range must be mapped
    /// writable; nothing is copied otherwise.
    pub fn write(&mut self, address: usize, buf: &[u8]) -> Result<()> {
        if !self.check(address, buf.len(), MapFlags::PROT_WRITE) {
            return Err(Error::new(EFAULT));
        }

        let mut copied = 0;
        while copied < buf.len() {
            let at = address + copied;
            let grant = self.grant_at_mut(at).expect("range checked mapped");
            let offset = at - grant.start;
            let len = cmp::min(buf.len() - copied, grant.bytes.len() - offset);
            grant.bytes[offset..offset + len].copy_from_slice(&buf[copied..copied + len]);
            copied += len;
        }
        Ok(())
    }

    fn grant_at(&self, address: usize) -> Option<&Grant> {
        self.grants.iter().find(|grant| grant.contains(address))
    }

    fn grant_at_mut(&mut self, address: usize) -> Option<&mut Grant> {
        self.grants.iter_mut().find(|grant| grant.contains(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmap_rejects_overlap_and_null() {
        let mut space = AddrSpace::new();
        space.mmap(0x1000, 0x1000, MapFlags::PROT_READ).unwrap();
        assert_eq!(
            space.mmap(0x1800, 0x1000, MapFlags::PROT_READ),
            Err(Error::new(EEXIST))
        );
        assert_eq!(
            space.mmap(0, 0x1000, MapFlags::PROT_READ),
            Err(Error::new(EINVAL))
        );
        assert_eq!(
            space.mmap(0x3000, 0, MapFlags::PROT_READ),
            Err(Error::new(EINVAL))
        );
    }

    #[test]
    fn check_modes_and_gaps() {
        let mut space = AddrSpace::new();
        space.mmap(0x1000, 0x1000, MapFlags::PROT_READ).unwrap();
        space
            .mmap(0x2000, 0x1000, MapFlags::PROT_READ | MapFlags::PROT_WRITE)
            .unwrap();

        // Adjacent grants cover a spanning range for the common mode only.
        assert!(space.check(0x1800, 0x1000, MapFlags::PROT_READ));
        assert!(!space.check(0x1800, 0x1000, MapFlags::PROT_WRITE));
        assert!(space.check(0x2000, 0x1000, MapFlags::PROT_WRITE));

        // Ranges reaching past the last grant, or over unmapped memory, fail.
        assert!(!space.check(0x2800, 0x1000, MapFlags::PROT_READ));
        assert!(!space.check(0xdead_0000, 1, MapFlags::PROT_READ));
        assert!(!space.check(0, 1, MapFlags::PROT_READ));

        // Zero-length ranges are valid anywhere.
        assert!(space.check(0xdead_0000, 0, MapFlags::PROT_WRITE));
    }

    #[test]
    fn copies_span_grants() {
        let mut space = AddrSpace::new();
        space
            .mmap(0x1000, 0x10, MapFlags::PROT_READ | MapFlags::PROT_WRITE)
            .unwrap();
        space
            .mmap(0x1010, 0x10, MapFlags::PROT_READ | MapFlags::PROT_WRITE)
            .unwrap();

        space.write(0x100c, b"across the seam").unwrap();
        let mut buf = [0; 15];
        space.read(0x100c, &mut buf).unwrap();
        assert_eq!(&buf, b"across the seam");
    }

    #[test]
    fn faulting_copy_has_no_effect() {
        let mut space = AddrSpace::new();
        space
            .mmap(0x1000, 0x10, MapFlags::PROT_READ | MapFlags::PROT_WRITE)
            .unwrap();
        space.write(0x1000, b"untouched").unwrap();

        // Runs off the end of the grant, so not a single byte may move.
        assert_eq!(
            space.write(0x1008, &[b'x'; 16]),
            Err(Error::new(EFAULT))
        );
        let mut buf = [0; 9];
        space.read(0x1000, &mut buf).unwrap();
        assert_eq!(&buf, b"untouched");
    }
}
