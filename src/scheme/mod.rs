//! # Schemes
//! A scheme is a primitive for handling filesystem syscalls. Schemes accept
//! paths from the kernel for `open`, and the handle numbers they hand back
//! are then passed for operations like `read_at`, `write_at` and `close`.
//!
//! The kernel validates descriptors and buffers before anything reaches a
//! scheme, so scheme implementations only deal with their own handle space.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::syscall::error::{Error, Result, EEXIST, ENOENT};
use crate::syscall::flag::OpenFlags;

pub use self::console::ConsoleScheme;
pub use self::ram::RamScheme;

/// `console` - the endpoints bound to the reserved low descriptors
pub mod console;

/// `file` - the RAM-backed named file store
pub mod ram;

/// Unique identifier for a scheme.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SchemeId(usize);

impl SchemeId {
    pub const fn new(inner: usize) -> Self {
        SchemeId(inner)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

/// Unique identifier for a file descriptor.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FileHandle(usize);

impl FileHandle {
    pub const fn new(inner: usize) -> Self {
        FileHandle(inner)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for FileHandle {
    fn from(inner: usize) -> Self {
        FileHandle::new(inner)
    }
}

impl From<FileHandle> for usize {
    fn from(handle: FileHandle) -> usize {
        handle.get()
    }
}

/// The operations a file backend serves. Transfers are offset-addressed; the
/// cursor belongs to the open-file description, not to the scheme.
pub trait Scheme {
    fn open(&self, path: &str, flags: OpenFlags) -> Result<usize>;

    fn read_at(&self, id: usize, offset: usize, buf: &mut [u8]) -> Result<usize>;

    fn write_at(&self, id: usize, offset: usize, buf: &[u8]) -> Result<usize>;

    fn unlink(&self, _path: &str) -> Result<usize> {
        Err(Error::new(ENOENT))
    }

    fn close(&self, id: usize) -> Result<usize>;
}

/// Scheme list type
pub struct SchemeList {
    map: BTreeMap<SchemeId, Arc<dyn Scheme + Send + Sync>>,
    names: BTreeMap<Box<str>, SchemeId>,
    next_id: usize,
}

impl SchemeList {
    /// Create a scheme list with the standard endpoints registered.
    pub fn new() -> Self {
        let mut list = SchemeList {
            map: BTreeMap::new(),
            names: BTreeMap::new(),
            // Scheme ids always start at 1. 0 is reserved as a niche for
            // uninitialized descriptions.
            next_id: 1,
        };
        list.insert("file", |_| Arc::new(RamScheme::new())).unwrap();
        list.insert("console", |_| Arc::new(ConsoleScheme::new()))
            .unwrap();
        list
    }

    /// Register a new scheme.
    pub fn insert<F>(&mut self, name: &str, scheme_fn: F) -> Result<SchemeId>
    where
        F: FnOnce(SchemeId) -> Arc<dyn Scheme + Send + Sync>,
    {
        if self.names.contains_key(name) {
            return Err(Error::new(EEXIST));
        }

        let id = SchemeId::new(self.next_id);
        self.next_id += 1;

        let scheme = scheme_fn(id);
        assert!(self.map.insert(id, scheme).is_none());
        self.names.insert(name.into(), id);
        Ok(id)
    }

    /// Get the nth scheme.
    pub fn get(&self, id: SchemeId) -> Option<&Arc<dyn Scheme + Send + Sync>> {
        self.map.get(&id)
    }

    pub fn get_name(&self, name: &str) -> Option<(SchemeId, &Arc<dyn Scheme + Send + Sync>)> {
        let &id = self.names.get(name)?;
        self.get(id).map(|scheme| (id, scheme))
    }
}

impl Default for SchemeList {
    fn default() -> Self {
        Self::new()
    }
}
