use bitflags::bitflags;

bitflags! {
    /// Flags passed to [`crate::scheme::Scheme::open`].
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct OpenFlags: usize {
        /// Create the file if the name is not present
        const CREAT = 0x1;
        /// Truncate the file to zero length if the name is present
        const TRUNC = 0x2;
    }
}

bitflags! {
    /// Access permissions of a mapped region of user memory.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct MapFlags: usize {
        const PROT_READ = 0x1;
        const PROT_WRITE = 0x2;
    }
}
