//! File structs

use spin::RwLock;
use std::sync::Arc;

use crate::scheme::{SchemeId, SchemeList};
use crate::syscall::error::{Error, Result, EBADF};

/// A file description
///
/// One per `open`: two opens of the same name get distinct descriptions with
/// independent offsets, even though the scheme backs them with shared bytes.
#[derive(Debug)]
pub struct FileDescription {
    /// The scheme that this file refers to
    pub scheme: SchemeId,
    /// The number the scheme uses to refer to this file
    pub number: usize,
    /// Byte offset the next transfer starts at
    pub offset: usize,
}

/// A file descriptor
#[derive(Clone, Debug)]
pub struct FileDescriptor {
    /// Corresponding file description
    pub description: Arc<RwLock<FileDescription>>,
}

impl FileDescriptor {
    /// A fresh descriptor on `number` within `scheme`, cursor at zero.
    pub fn new(scheme: SchemeId, number: usize) -> FileDescriptor {
        FileDescriptor {
            description: Arc::new(RwLock::new(FileDescription {
                scheme,
                number,
                offset: 0,
            })),
        }
    }

    /// Drop this reference to the description. The scheme handle is closed
    /// exactly when the last reference goes away.
    pub fn close(self, schemes: &SchemeList) -> Result<usize> {
        if let Ok(description) = Arc::try_unwrap(self.description) {
            let description = description.into_inner();

            let scheme = schemes
                .get(description.scheme)
                .ok_or(Error::new(EBADF))?
                .clone();
            scheme.close(description.number)
        } else {
            Ok(0)
        }
    }
}
