//! Common error type for shell operations

use core::fmt;

/// A common error type for every shell component.
///
/// This enum is deliberately small and `Copy` so it can travel through
/// command handlers and transport callbacks in `no_std` environments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An argument was empty, zero-sized or otherwise unusable.
    InvalidArguments,
    /// The operation was attempted on a session that is not initialized.
    NotInitialized,
    /// The transport or a caller-supplied write primitive reported a failure.
    Port,
    /// The command descriptor is already linked into the registry.
    AlreadyExists,
    /// The command descriptor is not linked into the registry.
    NotFound,
    /// The caller's buffer is too small to hold the requested data.
    Size,
    /// A fixed-capacity container has no free slot left.
    Full,
    /// A configuration document could not be parsed.
    Config,
    /// A command handler reported a failure.
    Command,
}

impl Error {
    /// Short lowercase description, suitable for printing to the terminal.
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::InvalidArguments => "invalid arguments",
            Error::NotInitialized => "not initialized",
            Error::Port => "port error",
            Error::AlreadyExists => "already exists",
            Error::NotFound => "not found",
            Error::Size => "buffer too small",
            Error::Full => "no free slot",
            Error::Config => "invalid configuration",
            Error::Command => "command failed",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::InvalidArguments => defmt::write!(f, "InvalidArguments"),
            Error::NotInitialized => defmt::write!(f, "NotInitialized"),
            Error::Port => defmt::write!(f, "Port"),
            Error::AlreadyExists => defmt::write!(f, "AlreadyExists"),
            Error::NotFound => defmt::write!(f, "NotFound"),
            Error::Size => defmt::write!(f, "Size"),
            Error::Full => defmt::write!(f, "Full"),
            Error::Config => defmt::write!(f, "Config"),
            Error::Command => defmt::write!(f, "Command"),
        }
    }
}
