//! Transport and OS abstraction seams.
//!
//! The shell never touches hardware directly. A board support crate provides a
//! [`Transport`] for the serial line or virtual COM port and a [`Delay`] for
//! the cooperative pause between polls.
//!
//! ```rust
//! use ushell::transport::Transport;
//!
//! struct Loopback {
//!     pending: Option<u8>,
//! }
//!
//! impl Transport for Loopback {
//!     type Error = ();
//!
//!     fn scan_char(&mut self) -> Result<Option<u8>, Self::Error> {
//!         Ok(self.pending.take())
//!     }
//!
//!     fn print(&mut self, _text: &str) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//! ```

#![deny(unsafe_code)]

/// Character transport consumed by the session.
pub trait Transport {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Poll one byte without blocking.
    ///
    /// Returns `Ok(None)` when no data is pending.
    fn scan_char(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Print a string to the terminal.
    fn print(&mut self, text: &str) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn scan_char(&mut self) -> Result<Option<u8>, Self::Error> {
        (**self).scan_char()
    }

    fn print(&mut self, text: &str) -> Result<(), Self::Error> {
        (**self).print(text)
    }
}

/// Blocking delay provided by the OS abstraction layer.
pub trait Delay {
    /// Pause the calling thread for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Delay backed by `std::thread::sleep`.
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
