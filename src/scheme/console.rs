use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::{BTreeSet, VecDeque};

use spin::{Mutex, RwLock};

use crate::scheme::Scheme;
use crate::syscall::error::{Error, Result, EBADF};
use crate::syscall::flag::OpenFlags;

/// The console endpoints user processes find on their reserved low
/// descriptors.
///
/// Output drains to the log under the `console` target. Input is whatever
/// was queued with [`ConsoleScheme::feed_input`]; reads never block, an
/// empty queue reads as zero bytes. Offsets are ignored - the console is
/// not seekable storage.
pub struct ConsoleScheme {
    next_id: AtomicUsize,
    handles: RwLock<BTreeSet<usize>>,
    input: Mutex<VecDeque<u8>>,
}

impl ConsoleScheme {
    pub fn new() -> ConsoleScheme {
        ConsoleScheme {
            next_id: AtomicUsize::new(0),
            handles: RwLock::new(BTreeSet::new()),
            input: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue bytes for subsequent console reads.
    pub fn feed_input(&self, data: &[u8]) {
        self.input.lock().extend(data.iter().copied());
    }
}

impl Default for ConsoleScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheme for ConsoleScheme {
    fn open(&self, _path: &str, _flags: OpenFlags) -> Result<usize> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handles.write().insert(id);
        Ok(id)
    }

    fn read_at(&self, id: usize, _offset: usize, buf: &mut [u8]) -> Result<usize> {
        if !self.handles.read().contains(&id) {
            return Err(Error::new(EBADF));
        }

        let mut input = self.input.lock();
        let mut i = 0;
        while i < buf.len() {
            match input.pop_front() {
                Some(byte) => {
                    buf[i] = byte;
                    i += 1;
                }
                None => break,
            }
        }
        Ok(i)
    }

    fn write_at(&self, id: usize, _offset: usize, buf: &[u8]) -> Result<usize> {
        if !self.handles.read().contains(&id) {
            return Err(Error::new(EBADF));
        }

        log::info!(target: "console", "{}", String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn close(&self, id: usize) -> Result<usize> {
        if self.handles.write().remove(&id) {
            Ok(0)
        } else {
            Err(Error::new(EBADF))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_drains_in_order() {
        let scheme = ConsoleScheme::new();
        let id = scheme.open("", OpenFlags::empty()).unwrap();

        scheme.feed_input(b"abc");
        let mut buf = [0; 2];
        assert_eq!(scheme.read_at(id, 0, &mut buf), Ok(2));
        assert_eq!(&buf, b"ab");
        assert_eq!(scheme.read_at(id, 0, &mut buf), Ok(1));
        assert_eq!(buf[0], b'c');
        assert_eq!(scheme.read_at(id, 0, &mut buf), Ok(0));
    }

    #[test]
    fn write_counts_all_bytes() {
        let scheme = ConsoleScheme::new();
        let id = scheme.open("", OpenFlags::empty()).unwrap();
        assert_eq!(scheme.write_at(id, 0, b"hello console"), Ok(13));

        scheme.close(id).unwrap();
        assert_eq!(scheme.write_at(id, 0, b"x"), Err(Error::new(EBADF)));
    }
}
