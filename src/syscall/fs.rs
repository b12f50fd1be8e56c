//! Filesystem syscalls

use std::sync::Arc;

use crate::context::file::FileDescriptor;
use crate::context::{Context, CONTEXT_MAX_FILES};
use crate::scheme::{FileHandle, Scheme, SchemeId};
use crate::syscall::error::{Error, Result, EBADF, EINVAL, EMFILE, ENAMETOOLONG, ENODEV};
use crate::syscall::flag::OpenFlags;
use crate::syscall::usercopy::{UserSliceRo, UserSliceWo};

/// Longest name a process may pass to `open`/`creat`/`unlink`.
pub const PATH_MAX: usize = 256;

/// The scheme flat file names resolve to.
const FILE_SCHEME: &str = "file";

fn copy_path_to_buf(context: &Context, raw_path: UserSliceRo) -> Result<String> {
    if raw_path.len() > PATH_MAX {
        return Err(Error::new(ENAMETOOLONG));
    }

    let mut path_buf = vec![0_u8; raw_path.len()];
    raw_path.copy_to_slice(&context.addr_space().read(), &mut path_buf)?;
    String::from_utf8(path_buf).map_err(|_| Error::new(EINVAL))
}

/// Translate a raw descriptor argument into a table index. Negative and
/// out-of-range values are rejected here, before any table lookup; in-range
/// values still miss if the slot is empty.
fn file_handle(fd: isize) -> Result<FileHandle> {
    match usize::try_from(fd) {
        Ok(i) if i < CONTEXT_MAX_FILES => Ok(FileHandle::new(i)),
        _ => Err(Error::new(EBADF)),
    }
}

fn get_file(context: &Context, fd: isize) -> Result<FileDescriptor> {
    context
        .get_file(file_handle(fd)?)
        .ok_or(Error::new(EBADF))
}

fn file_scheme(context: &Context) -> Result<(SchemeId, Arc<dyn Scheme + Send + Sync>)> {
    let schemes = context.schemes();
    let (scheme_id, scheme) = schemes.get_name(FILE_SCHEME).ok_or(Error::new(ENODEV))?;
    Ok((scheme_id, scheme.clone()))
}

fn open_inner(context: &Context, raw_path: UserSliceRo, flags: OpenFlags) -> Result<FileHandle> {
    let path = copy_path_to_buf(context, raw_path)?;
    let (scheme_id, scheme) = file_scheme(context)?;

    let number = scheme.open(&path, flags)?;

    match context.add_file(FileDescriptor::new(scheme_id, number)) {
        Some(fd) => Ok(fd),
        None => {
            // The table is full; the store handle must not outlive the
            // failed call.
            let _ = scheme.close(number);
            Err(Error::new(EMFILE))
        }
    }
}

/// Open syscall
pub fn open(context: &Context, raw_path: UserSliceRo) -> Result<FileHandle> {
    open_inner(context, raw_path, OpenFlags::empty())
}

/// Creat syscall: create the name if absent, truncate it if present.
pub fn creat(context: &Context, raw_path: UserSliceRo) -> Result<FileHandle> {
    open_inner(context, raw_path, OpenFlags::CREAT | OpenFlags::TRUNC)
}

/// Read syscall
pub fn read(context: &Context, fd: isize, buf: usize, count: isize) -> Result<usize> {
    let file = get_file(context, fd)?;
    let count = usize::try_from(count).map_err(|_| Error::new(EINVAL))?;
    if count == 0 {
        // A zero-length transfer never touches memory, so the buffer is not
        // validated at all.
        return Ok(0);
    }

    let user_buf = UserSliceWo::wo(buf, count);
    user_buf.verify(&context.addr_space().read())?;

    let mut description = file.description.write();
    let scheme = context
        .schemes()
        .get(description.scheme)
        .ok_or(Error::new(EBADF))?
        .clone();

    let mut bytes = vec![0_u8; count];
    let bytes_read = scheme.read_at(description.number, description.offset, &mut bytes)?;

    user_buf
        .limit(bytes_read)
        .ok_or(Error::new(EINVAL))?
        .copy_from_slice(&mut context.addr_space().write(), &bytes[..bytes_read])?;

    description.offset += bytes_read;
    Ok(bytes_read)
}

/// Write syscall
pub fn write(context: &Context, fd: isize, buf: usize, count: isize) -> Result<usize> {
    let file = get_file(context, fd)?;
    let count = usize::try_from(count).map_err(|_| Error::new(EINVAL))?;
    if count == 0 {
        return Ok(0);
    }

    let user_buf = UserSliceRo::ro(buf, count);
    let mut bytes = vec![0_u8; count];
    user_buf.copy_to_slice(&context.addr_space().read(), &mut bytes)?;

    let mut description = file.description.write();
    let scheme = context
        .schemes()
        .get(description.scheme)
        .ok_or(Error::new(EBADF))?
        .clone();

    let bytes_written = scheme.write_at(description.number, description.offset, &bytes)?;
    description.offset += bytes_written;
    Ok(bytes_written)
}

/// Close syscall
pub fn close(context: &Context, fd: isize) -> Result<usize> {
    let file = context
        .remove_file(file_handle(fd)?)
        .ok_or(Error::new(EBADF))?;

    file.close(&context.schemes())?;
    Ok(0)
}

/// Unlink syscall
pub fn unlink(context: &Context, raw_path: UserSliceRo) -> Result<usize> {
    let path = copy_path_to_buf(context, raw_path)?;
    let (_scheme_id, scheme) = file_scheme(context)?;
    scheme.unlink(&path)
}
