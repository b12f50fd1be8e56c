use core::cmp;

use hashbrown::HashMap;
use slab::Slab;
use spin::RwLock;
use std::sync::Arc;

use crate::scheme::Scheme;
use crate::syscall::error::{Error, Result, EBADF, EINVAL, ENOENT};
use crate::syscall::flag::OpenFlags;

/// The bytes of one named file, shared by every handle open on it.
type FileData = Arc<RwLock<Vec<u8>>>;

struct Handle {
    file: FileData,
}

/// A RAM-backed named file store.
///
/// Each `open` produces a fresh handle; handles on the same name share one
/// byte vector, so content written through one handle is immediately visible
/// through every other. Unlinking removes the name only - live handles keep
/// the bytes alive.
pub struct RamScheme {
    files: RwLock<HashMap<Box<str>, FileData>>,
    handles: RwLock<Slab<Handle>>,
}

impl RamScheme {
    pub fn new() -> RamScheme {
        RamScheme {
            files: RwLock::new(HashMap::new()),
            handles: RwLock::new(Slab::new()),
        }
    }
}

impl Scheme for RamScheme {
    fn open(&self, path: &str, flags: OpenFlags) -> Result<usize> {
        let mut files = self.files.write();
        let file = match files.get(path) {
            Some(file) => {
                if flags.contains(OpenFlags::TRUNC) {
                    file.write().clear();
                }
                Arc::clone(file)
            }
            None if flags.contains(OpenFlags::CREAT) => {
                let file = Arc::new(RwLock::new(Vec::new()));
                files.insert(path.into(), Arc::clone(&file));
                file
            }
            None => return Err(Error::new(ENOENT)),
        };

        Ok(self.handles.write().insert(Handle { file }))
    }

    fn read_at(&self, id: usize, offset: usize, buf: &mut [u8]) -> Result<usize> {
        let handles = self.handles.read();
        let handle = handles.get(id).ok_or(Error::new(EBADF))?;

        let data = handle.file.read();
        if offset >= data.len() {
            return Ok(0);
        }
        let count = cmp::min(buf.len(), data.len() - offset);
        buf[..count].copy_from_slice(&data[offset..offset + count]);
        Ok(count)
    }

    fn write_at(&self, id: usize, offset: usize, buf: &[u8]) -> Result<usize> {
        let handles = self.handles.read();
        let handle = handles.get(id).ok_or(Error::new(EBADF))?;

        let end = offset.checked_add(buf.len()).ok_or(Error::new(EINVAL))?;
        let mut data = handle.file.write();
        if data.len() < end {
            // A cursor stranded past the end (the file was truncated under
            // it) zero-fills the gap, as a sparse write would.
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn unlink(&self, path: &str) -> Result<usize> {
        let mut files = self.files.write();
        files.remove(path).map(|_| 0).ok_or(Error::new(ENOENT))
    }

    fn close(&self, id: usize) -> Result<usize> {
        let mut handles = self.handles.write();
        handles.try_remove(id).map(|_| 0).ok_or(Error::new(EBADF))
    }
}
