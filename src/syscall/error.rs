use core::{fmt, result};

/// A syscall error, carrying the errno that names what went wrong.
///
/// The raw syscall surface never exposes the errno; [`Error::mux`] collapses
/// every failure to the `-1` sentinel user programs test against.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Error {
    pub errno: i32,
}

pub type Result<T, E = Error> = result::Result<T, E>;

impl Error {
    pub const fn new(errno: i32) -> Error {
        Error { errno }
    }

    /// Flatten a syscall result into the value userland sees: the payload on
    /// success, `-1` on any error.
    pub fn mux(result: Result<usize>) -> isize {
        match result {
            Ok(value) => value as isize,
            Err(_) => -1,
        }
    }

    pub fn text(self) -> &'static str {
        match self.errno {
            ENOENT => "No such file or directory",
            EBADF => "Bad file number",
            EFAULT => "Bad address",
            EBUSY => "Device or resource busy",
            EEXIST => "File exists",
            ENODEV => "No such device",
            EINVAL => "Invalid argument",
            EMFILE => "Too many open files",
            ENAMETOOLONG => "File name too long",
            ENOSYS => "Function not implemented",
            _ => "Unknown error",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Error")
            .field("errno", &self.errno)
            .field("text", &self.text())
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.text())
    }
}

pub const ENOENT: i32 = 2;
pub const EBADF: i32 = 9;
pub const EFAULT: i32 = 14;
pub const EBUSY: i32 = 16;
pub const EEXIST: i32 = 17;
pub const ENODEV: i32 = 19;
pub const EINVAL: i32 = 22;
pub const EMFILE: i32 = 24;
pub const ENAMETOOLONG: i32 = 36;
pub const ENOSYS: i32 = 38;
