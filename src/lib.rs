//! # ushell - embedded command shell
//!
//! An interactive, line-oriented command shell for resource-constrained
//! targets that talk to a terminal one character at a time over a serial line
//! or virtual COM port. This library is designed for embedded systems and
//! supports `no_std` environments; nothing is allocated after construction.
//!
//! ## Features
//!
//! - **Session state machine**: banner, optional password gate, line editing
//!   with echo, command dispatch
//! - **VT100 codec**: arrow/home/end/page/delete keys in, cursor, erase and
//!   color sequences out
//! - **Command registry**: insertion-ordered, lock-protected, shareable
//!   between sessions, with word-boundary resolution and TAB completion
//! - **History**: fixed ring of recent lines with up/down recall
//!
//! ## Usage
//!
//! ```rust
//! use ushell::error::Error;
//! use ushell::registry::{Command, Registry, SpinLock};
//! use ushell::session::{Config, Session, State};
//! # use ushell::transport::Transport;
//! # struct Uart;
//! # impl Transport for Uart {
//! #     type Error = ();
//! #     fn scan_char(&mut self) -> Result<Option<u8>, ()> { Ok(None) }
//! #     fn print(&mut self, _text: &str) -> Result<(), ()> { Ok(()) }
//! # }
//!
//! fn status(_argc: usize, _argv: &[&str]) -> Result<(), Error> {
//!     Ok(())
//! }
//!
//! static STATUS: Command = Command::new("status", "Show device status", &status);
//!
//! let registry: Registry<'_, SpinLock, 16> = Registry::new(SpinLock::new());
//! registry.add(&STATUS).unwrap();
//!
//! let mut session: Session<'_, Uart, 64, 8> = Session::new(Uart, &registry, Config::default());
//! for &byte in b"\rsta\t" {
//!     session.feed(byte).unwrap();
//! }
//! assert_eq!(session.line(), "status");
//! assert_eq!(session.state(), State::ProcInput);
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt formatting of errors and states for embedded debugging

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![doc(html_root_url = "https://shishir-dey.github.io/ushell/")]

/// Common error type shared by every component.
pub mod error;

/// Character transport and OS delay seams.
pub mod transport;

/// VT100 escape-sequence decoding and encoding.
pub mod escape;

/// Fixed-capacity command history with up/down navigation.
pub mod history;

/// Lock-protected command registry and the injected lock capability.
///
/// Commands are declared by the caller and linked into a registry that any
/// number of sessions can share.
pub mod registry;

/// The interactive session state machine.
pub mod session;

pub use error::Error;
