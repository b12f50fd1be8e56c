//! # System calls
//!
//! This module provides the syscall numbers user programs encode, argument
//! decoding, and dispatch into the filesystem handlers.

use crate::context::Context;
use crate::scheme::FileHandle;

use self::error::{Error, Result, ENOSYS};
use self::usercopy::UserSliceRo;

pub use self::fs::*;

/// Errno values and the syscall result type
pub mod error;

/// Flags shared between the syscall surface and the schemes
pub mod flag;

/// Filesystem syscalls
pub mod fs;

/// Copying and validating memory between user and kernel space
pub mod usercopy;

pub const SYS_CREAT: usize = 4;
pub const SYS_OPEN: usize = 5;
pub const SYS_READ: usize = 6;
pub const SYS_WRITE: usize = 7;
pub const SYS_CLOSE: usize = 8;
pub const SYS_UNLINK: usize = 9;

/// The raw syscall entry point: `a` is the syscall number, `b`..`d` the
/// arguments as a user program's trap would deliver them. The inner function
/// returns a `Result<usize>`; [`Error::mux`] then collapses it to the value
/// userland sees, `-1` on every failure.
#[must_use]
pub fn syscall(context: &Context, a: usize, b: usize, c: usize, d: usize) -> isize {
    #[inline(always)]
    fn inner(context: &Context, a: usize, b: usize, c: usize, d: usize) -> Result<usize> {
        match a {
            SYS_CREAT => fs::creat(context, UserSliceRo::ro(b, c)).map(FileHandle::into),
            SYS_OPEN => fs::open(context, UserSliceRo::ro(b, c)).map(FileHandle::into),
            SYS_READ => fs::read(context, b as isize, c, d as isize),
            SYS_WRITE => fs::write(context, b as isize, c, d as isize),
            SYS_CLOSE => fs::close(context, b as isize),
            SYS_UNLINK => fs::unlink(context, UserSliceRo::ro(b, c)),
            _ => {
                log::warn!("context {}: unknown syscall {}", context.id.get(), a);
                Err(Error::new(ENOSYS))
            }
        }
    }

    let result = inner(context, a, b, c, d);
    log::trace!(
        "context {}: syscall {} ({:#x}, {:#x}, {:#x}) = {:?}",
        context.id.get(),
        a,
        b,
        c,
        d,
        result
    );
    Error::mux(result)
}
