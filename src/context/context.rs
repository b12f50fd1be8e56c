use spin::{Mutex, RwLock, RwLockReadGuard};
use std::array;
use std::sync::Arc;

use crate::context::file::FileDescriptor;
use crate::context::memory::AddrSpace;
use crate::context::CONTEXT_MAX_FILES;
use crate::scheme::{FileHandle, SchemeList};
use crate::syscall::error::{Error, Result, EBUSY, ENODEV};
use crate::syscall::flag::OpenFlags;

/// Unique identifier for a context (i.e. `pid`).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContextId(usize);

impl ContextId {
    pub const fn new(inner: usize) -> Self {
        ContextId(inner)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

/// A context, which identifies a process
///
/// The descriptor table is a fixed array of [`CONTEXT_MAX_FILES`] slots
/// behind one mutex; every table operation holds the lock for its whole
/// duration, so concurrent syscalls from threads sharing a context never
/// observe a torn table.
pub struct Context {
    /// The ID of this context
    pub id: ContextId,
    /// The simulated address space of this context
    addr_space: Arc<RwLock<AddrSpace>>,
    /// The schemes visible to this context
    schemes: Arc<RwLock<SchemeList>>,
    /// The open files in the scheme
    files: Mutex<[Option<FileDescriptor>; CONTEXT_MAX_FILES]>,
}

impl Context {
    pub fn new(id: ContextId, schemes: Arc<RwLock<SchemeList>>) -> Context {
        Context {
            id,
            addr_space: Arc::new(RwLock::new(AddrSpace::new())),
            schemes,
            files: Mutex::new(array::from_fn(|_| None)),
        }
    }

    pub fn addr_space(&self) -> &Arc<RwLock<AddrSpace>> {
        &self.addr_space
    }

    pub fn schemes(&self) -> RwLockReadGuard<'_, SchemeList> {
        self.schemes.read()
    }

    /// Bind console handles to descriptors 0 and 1, the layout user
    /// programs expect before their first `open`. Fails with `EBUSY` if
    /// either slot is already taken.
    pub fn open_stdio(&self) -> Result<()> {
        let (scheme_id, scheme) = {
            let schemes = self.schemes();
            let (scheme_id, scheme) = schemes.get_name("console").ok_or(Error::new(ENODEV))?;
            (scheme_id, scheme.clone())
        };

        for slot in 0..2 {
            let number = scheme.open("", OpenFlags::empty())?;
            let file = FileDescriptor::new(scheme_id, number);
            if self.insert_file(FileHandle::new(slot), file).is_none() {
                let _ = scheme.close(number);
                return Err(Error::new(EBUSY));
            }
        }
        Ok(())
    }

    /// Add a file to the lowest available slot.
    /// Return the file descriptor number or None if no slot was found
    pub fn add_file(&self, file: FileDescriptor) -> Option<FileHandle> {
        let mut files = self.files.lock();
        for (i, slot) in files.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(file);
                return Some(FileHandle::new(i));
            }
        }
        None
    }

    /// Insert a file with a specific handle number.
    /// Return the file descriptor number or None if the slot was not empty,
    /// or i was out of range
    pub fn insert_file(&self, i: FileHandle, file: FileDescriptor) -> Option<FileHandle> {
        let mut files = self.files.lock();
        let slot = files.get_mut(i.get())?;
        if slot.is_none() {
            *slot = Some(file);
            Some(i)
        } else {
            None
        }
    }

    /// Get a file
    pub fn get_file(&self, i: FileHandle) -> Option<FileDescriptor> {
        let files = self.files.lock();
        files.get(i.get())?.clone()
    }

    /// Remove a file
    pub fn remove_file(&self, i: FileHandle) -> Option<FileDescriptor> {
        let mut files = self.files.lock();
        files.get_mut(i.get())?.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::SchemeId;

    fn context() -> Context {
        Context::new(
            ContextId::new(1),
            Arc::new(RwLock::new(SchemeList::new())),
        )
    }

    fn file() -> FileDescriptor {
        FileDescriptor::new(SchemeId::new(1), 0)
    }

    #[test]
    fn add_file_picks_lowest_free_slot() {
        let context = context();
        assert_eq!(context.add_file(file()), Some(FileHandle::new(0)));
        assert_eq!(context.add_file(file()), Some(FileHandle::new(1)));

        context.remove_file(FileHandle::new(0)).unwrap();
        assert_eq!(context.add_file(file()), Some(FileHandle::new(0)));
    }

    #[test]
    fn table_capacity_is_fixed() {
        let context = context();
        for i in 0..CONTEXT_MAX_FILES {
            assert_eq!(context.add_file(file()), Some(FileHandle::new(i)));
        }
        assert!(context.add_file(file()).is_none());

        context.remove_file(FileHandle::new(7)).unwrap();
        assert_eq!(context.add_file(file()), Some(FileHandle::new(7)));
    }

    #[test]
    fn out_of_range_slots_do_not_exist() {
        let context = context();
        assert!(context.get_file(FileHandle::new(CONTEXT_MAX_FILES)).is_none());
        assert!(context.remove_file(FileHandle::new(CONTEXT_MAX_FILES)).is_none());
        assert!(context
            .insert_file(FileHandle::new(usize::MAX), file())
            .is_none());
    }

    #[test]
    fn insert_file_refuses_taken_slot() {
        let context = context();
        assert!(context.insert_file(FileHandle::new(3), file()).is_some());
        assert!(context.insert_file(FileHandle::new(3), file()).is_none());
    }

    #[test]
    fn stdio_reserves_the_low_descriptors() {
        let context = context();
        context.open_stdio().unwrap();
        assert!(context.get_file(FileHandle::new(0)).is_some());
        assert!(context.get_file(FileHandle::new(1)).is_some());
        assert_eq!(context.add_file(file()), Some(FileHandle::new(2)));

        assert_eq!(context.open_stdio(), Err(Error::new(EBUSY)));
    }
}
