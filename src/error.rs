//! Unified error types for the plantnode firmware core.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level bootstrap's error handling uniform.
//! Store-level failures carry their own enum so callers inside the dispatch
//! loop can match on them without allocation.

use core::fmt;

use crate::store::ValueKind;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Network bring-up failed. Fatal: the process exits.
    NetworkUnavailable(String),
    /// The device-management client failed to initialize. Fatal.
    ClientInitFailed(String),
    /// A resource store operation was rejected.
    Store(StoreError),
    /// The registration state machine was asked to move backwards
    /// or re-enter a state it already passed.
    Registration(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkUnavailable(msg) => write!(f, "network unavailable: {msg}"),
            Self::ClientInitFailed(msg) => write!(f, "client init failed: {msg}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Registration(msg) => write!(f, "registration: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Resource store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// A `set` carried a value variant incompatible with the type fixed at
    /// creation. The stored value is left intact; never silently coerced.
    TypeMismatch {
        expected: ValueKind,
        got: ValueKind,
    },
    /// A resource path string did not parse as `object/instance/resource`.
    InvalidPath,
    /// A resource already exists at the given path.
    DuplicatePath,
    /// A callback kind does not match the resource's access mask or
    /// observable flag.
    CallbackMismatch(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: resource holds {expected}, got {got}")
            }
            Self::InvalidPath => write!(f, "invalid resource path"),
            Self::DuplicatePath => write!(f, "resource path already registered"),
            Self::CallbackMismatch(msg) => write!(f, "callback mismatch: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
