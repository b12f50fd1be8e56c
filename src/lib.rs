//! # ukern
//!
//! A user-mode model of the file I/O half of a small kernel: contexts with a
//! bounded descriptor table, refcounted open-file descriptions, schemes that
//! back them with bytes, and the raw syscall surface user programs drive.
//!
//! User memory is simulated. Buffers and path arguments are passed as raw
//! (address, length) pairs and validated against the context's address space
//! before any transfer touches them, so the adversarial inputs a real kernel
//! must survive (bad descriptors, null or unmapped buffers, negative counts)
//! can be exercised from ordinary tests.
//!
//! No syscall blocks. Every operation is a bounded computation against
//! in-memory state, and every failure surfaces as `-1` at the raw dispatch
//! layer, never as a distinct error code.

/// Context management
pub mod context;

/// Schemes, filesystem handlers
pub mod scheme;

/// Syscall handlers
pub mod syscall;
