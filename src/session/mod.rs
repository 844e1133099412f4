//! # Interactive shell session
//!
//! A [`Session`] owns the input line and drives everything else from a
//! single worker: it polls one byte per iteration from the [`Transport`],
//! edits the line, recalls history, decodes escape sequences and resolves and
//! executes commands from a shared [`CommandSet`].
//!
//! # State machine
//!
//! ```text
//!            CR/LF                    CR/LF (granted)
//!   ┌──────┐ ─────▶ ┌──────┐ ───────────────────────▶ ┌────────────┐
//!   │ Init │        │ Auth │                          │ ProcInput  │◀──┐
//!   └──────┘ ─────────────────── CR/LF (no auth) ───▶ └────────────┘   │
//!      ▲                                               │ ESC    │ CR/LF│
//!      │ unknown sequence          ┌────────────┐◀─────┘        ▼      │
//!      └───────────────────────────│ ProcEscSeq │         ┌─────────┐  │
//!      │                           └────────────┘ ──────▶ │ ProcCmd │──┘
//!      │ recover   ┌───────┐           arrow keys         └─────────┘
//!      └───────────│ Error │        (back to ProcInput)
//!                  └───────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use core::sync::atomic::AtomicBool;
//! use ushell::error::Error;
//! use ushell::registry::{Command, Registry, SpinLock};
//! use ushell::session::{Config, Session};
//! use ushell::transport::{Delay, Transport};
//!
//! struct Uart;
//!
//! impl Transport for Uart {
//!     type Error = ();
//!     fn scan_char(&mut self) -> Result<Option<u8>, ()> {
//!         Ok(None)
//!     }
//!     fn print(&mut self, _text: &str) -> Result<(), ()> {
//!         Ok(())
//!     }
//! }
//!
//! struct NoDelay;
//!
//! impl Delay for NoDelay {
//!     fn delay_ms(&mut self, _ms: u32) {}
//! }
//!
//! fn led(_argc: usize, _argv: &[&str]) -> Result<(), Error> {
//!     Ok(())
//! }
//!
//! static LED: Command = Command::new("led", "Toggle the status LED", &led);
//!
//! let registry: Registry<'_, SpinLock, 8> = Registry::new(SpinLock::new());
//! registry.add(&LED).unwrap();
//!
//! let mut session: Session<'_, Uart, 64, 8> = Session::new(Uart, &registry, Config::default());
//! session.feed(b'\r').unwrap();
//! for &byte in b"led\r" {
//!     session.feed(byte).unwrap();
//! }
//!
//! let stop = AtomicBool::new(true);
//! session.run(&stop, &mut NoDelay).unwrap();
//! ```

#![deny(unsafe_code)]

use core::fmt;
use core::str;
use core::sync::atomic::{AtomicBool, Ordering};

use heapless::{String, Vec};
use log::{debug, error, info, trace, warn};

use crate::error::Error;
use crate::escape::{self, Action, Color, ESC, EscapeCodec, KeyCode, SequenceMatch};
use crate::history::History;
use crate::registry::{Command, CommandSet};
use crate::transport::{Delay, Transport};

mod config;

pub use config::Config;

/// Maximum number of arguments per command, command name included.
///
/// Tokens beyond this limit are dropped.
pub const MAX_ARGS: usize = 16;

// ASCII control character constants for input processing
/// ASCII backspace character (0x08).
pub const ASCII_BACKSPACE: u8 = 0x08;
/// ASCII horizontal tab character (0x09).
pub const ASCII_TAB: u8 = 0x09;
/// ASCII line feed character (0x0A).
pub const ASCII_LF: u8 = 0x0A;
/// ASCII carriage return character (0x0D).
pub const ASCII_CR: u8 = 0x0D;
/// ASCII delete character (0x7F).
pub const ASCII_DEL: u8 = 0x7F;
/// ASCII space character (0x20).
pub const ASCII_SPACE: u8 = 0x20;

const HELP_COMMAND: &str = "help";

/// Session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the user to press Enter after the banner.
    Init,
    /// Collecting the password.
    Auth,
    /// Editing the command line.
    ProcInput,
    /// A command was resolved and runs on the next step.
    ProcCmd,
    /// Collecting the bytes of an escape sequence.
    ProcEscSeq,
    /// An internal fault occurred; the next step resets the session.
    Error,
}

/// Password check used by the authentication gate.
pub trait Authenticator {
    /// Whether `input` unlocks the session.
    fn verify(&self, input: &str) -> bool;
}

/// A plain secret compared byte for byte.
impl Authenticator for &str {
    fn verify(&self, input: &str) -> bool {
        *self == input
    }
}

/// One interactive shell over one transport.
///
/// `N` is the line capacity in bytes and also the width of each history slot;
/// `K` is the number of history slots.
pub struct Session<'a, T: Transport, const N: usize, const K: usize> {
    state: State,
    line: String<N>,
    current: Option<&'a Command<'a>>,
    config: Config<'a>,
    history: History<K, N>,
    registry: &'a dyn CommandSet<'a>,
    auth: Option<&'a dyn Authenticator>,
    transport: T,
    codec: EscapeCodec,
    escape: Vec<u8, { escape::MAX_SEQUENCE_LEN }>,
    banner_shown: bool,
    // last byte was CR; a following LF completes the same Enter
    after_cr: bool,
    initialized: bool,
}

impl<'a, T: Transport, const N: usize, const K: usize> Session<'a, T, N, K> {
    /// Create an initialized session in [`State::Init`].
    pub fn new(transport: T, registry: &'a dyn CommandSet<'a>, config: Config<'a>) -> Self {
        Self {
            state: State::Init,
            line: String::new(),
            current: None,
            config,
            history: History::new(),
            registry,
            auth: None,
            transport,
            codec: EscapeCodec::new(),
            escape: Vec::new(),
            banner_shown: false,
            after_cr: false,
            initialized: true,
        }
    }

    /// Install the password check used when [`Config::auth`] is set.
    ///
    /// Without one, every password is rejected.
    pub fn set_authenticator(&mut self, auth: &'a dyn Authenticator) {
        self.auth = Some(auth);
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Current content of the line buffer.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Command waiting to run in [`State::ProcCmd`].
    pub fn current_command(&self) -> Option<&'a Command<'a>> {
        self.current
    }

    /// Active configuration.
    pub fn config(&self) -> &Config<'a> {
        &self.config
    }

    /// Entered lines.
    pub fn history(&self) -> &History<K, N> {
        &self.history
    }

    /// Escape codec, e.g. to query the colors in use.
    pub fn codec(&self) -> &EscapeCodec {
        &self.codec
    }

    /// Escape codec, e.g. to attach key callbacks.
    pub fn codec_mut(&mut self) -> &mut EscapeCodec {
        &mut self.codec
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Whether the session accepts input.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// (Re)start the session from [`State::Init`].
    pub fn init(&mut self) {
        self.reset_input();
        self.state = State::Init;
        self.banner_shown = false;
        self.after_cr = false;
        self.initialized = true;
        info!("session initialized");
    }

    /// Stop accepting input and forget the line and history.
    ///
    /// [`poll`](Self::poll), [`feed`](Self::feed) and [`run`](Self::run)
    /// return [`Error::NotInitialized`] until [`init`](Self::init) is called.
    pub fn deinit(&mut self) {
        self.reset_input();
        self.history.clear();
        self.state = State::Init;
        self.initialized = false;
        info!("session deinitialized");
    }

    /// Run [`poll`](Self::poll) until `stop` is set, pausing between polls.
    pub fn run<D: Delay>(&mut self, stop: &AtomicBool, delay: &mut D) -> Result<(), Error> {
        self.ensure_initialized()?;
        info!("session loop started");
        while !stop.load(Ordering::Acquire) {
            self.poll()?;
            delay.delay_ms(self.config.poll_interval_ms);
        }
        info!("session loop stopped");
        Ok(())
    }

    /// One step of the state machine.
    ///
    /// A pending command or fault is handled without reading input; otherwise
    /// at most one byte is taken from the transport. Never blocks.
    pub fn poll(&mut self) -> Result<(), Error> {
        self.ensure_initialized()?;
        match self.state {
            State::ProcCmd => {
                self.execute_current();
                return Ok(());
            }
            State::Error => {
                self.recover();
                return Ok(());
            }
            State::Init => self.show_banner(),
            State::Auth | State::ProcInput | State::ProcEscSeq => {}
        }

        match self.transport.scan_char() {
            Ok(Some(byte)) => self.process(byte),
            Ok(None) => {}
            Err(err) => warn!("transport scan failed: {:?}", err),
        }
        Ok(())
    }

    /// Process one byte pushed by the caller, e.g. from a receive interrupt.
    ///
    /// A command completed by this byte runs before `feed` returns.
    pub fn feed(&mut self, byte: u8) -> Result<(), Error> {
        self.ensure_initialized()?;
        if self.state == State::Init {
            self.show_banner();
        }
        self.process(byte);
        loop {
            match self.state {
                State::ProcCmd => self.execute_current(),
                State::Error => self.recover(),
                _ => break,
            }
        }
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), Error> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn process(&mut self, byte: u8) {
        trace!("state {:?} byte {:#04x}", self.state, byte);
        let after_cr = core::mem::replace(&mut self.after_cr, byte == ASCII_CR);
        if byte == ASCII_LF && after_cr {
            return;
        }
        match self.state {
            State::Init => self.process_init(byte),
            State::Auth => self.process_auth(byte),
            State::ProcInput => self.process_input(byte),
            State::ProcEscSeq => self.process_escape(byte),
            State::ProcCmd | State::Error => {}
        }
    }

    fn process_init(&mut self, byte: u8) {
        if !matches!(byte, ASCII_CR | ASCII_LF) {
            return;
        }
        self.line.clear();
        if self.config.auth {
            self.state = State::Auth;
            self.print("\r\nPassword: ");
        } else {
            self.state = State::ProcInput;
            self.print("\r\n");
            self.print_prompt();
        }
    }

    fn process_auth(&mut self, byte: u8) {
        match byte {
            ASCII_CR | ASCII_LF => {
                let granted = self.auth.is_some_and(|auth| auth.verify(&self.line));
                self.line.clear();
                if granted {
                    info!("authentication succeeded");
                    self.state = State::ProcInput;
                    self.print("\r\n");
                    self.print_prompt();
                } else {
                    warn!("authentication failed");
                    self.print("\r\nWrong password\r\nPassword: ");
                }
            }
            ASCII_BACKSPACE | ASCII_DEL => self.pop_char(),
            0x20..=0x7E => {
                if self.line.push(char::from(byte)).is_ok() && self.config.echo {
                    self.print("*");
                }
            }
            _ => {}
        }
    }

    fn process_input(&mut self, byte: u8) {
        match byte {
            ASCII_CR | ASCII_LF => self.submit_line(),
            ESC => {
                self.escape.clear();
                // capacity is at least one
                let _ = self.escape.push(ESC);
                self.state = State::ProcEscSeq;
            }
            ASCII_BACKSPACE | ASCII_DEL => self.pop_char(),
            ASCII_TAB => {
                if self.config.autocomplete {
                    self.autocomplete();
                }
            }
            0x20..=0x7E => self.push_char(byte),
            _ => {}
        }
    }

    fn process_escape(&mut self, byte: u8) {
        let matched = if self.escape.push(byte).is_ok() {
            escape::match_sequence(&self.escape)
        } else {
            SequenceMatch::Unknown
        };

        match matched {
            SequenceMatch::Partial => {}
            SequenceMatch::Complete(_) => {
                let decoded = self.codec.decode(&self.escape);
                self.escape.clear();
                self.state = State::ProcInput;
                match decoded {
                    Ok(Some(KeyCode::Up)) => self.recall(true),
                    Ok(Some(KeyCode::Down)) => self.recall(false),
                    Ok(_) => {}
                    Err(err) => self.fault(err),
                }
            }
            SequenceMatch::Unknown => {
                debug!("unrecognized escape sequence, resyncing terminal");
                self.escape.clear();
                self.line.clear();
                self.emit(Action::ClearScreen);
                self.state = State::Init;
                self.banner_shown = false;
            }
        }
    }

    fn push_char(&mut self, byte: u8) {
        // a full line silently drops the byte
        if self.line.push(char::from(byte)).is_err() {
            return;
        }
        if self.config.echo {
            let ch = [byte];
            if let Ok(s) = str::from_utf8(&ch) {
                self.print(s);
            }
        }
    }

    fn pop_char(&mut self) {
        if self.line.pop().is_some() && self.config.echo {
            self.emit(Action::DeleteChar);
        }
    }

    fn submit_line(&mut self) {
        if self.config.echo {
            self.print("\r\n");
        }
        if self.line.is_empty() {
            self.print_prompt();
            return;
        }
        if self.config.history {
            self.history.add(&self.line);
        }

        match self.registry.resolve(&self.line) {
            Some(cmd) => {
                debug!("resolved command '{}'", cmd.name());
                self.current = Some(cmd);
                self.state = State::ProcCmd;
            }
            None if self.is_help_line() => {
                self.current = None;
                self.state = State::ProcCmd;
            }
            None => {
                let name = self.line.split(char::from(ASCII_SPACE)).next().unwrap_or_default();
                debug!("command '{}' not found", name);
                print_to(&mut self.transport, name);
                self.print(": command not found\r\n");
                self.line.clear();
                self.print_prompt();
            }
        }
    }

    fn is_help_line(&self) -> bool {
        self.config.help
            && self
                .line
                .strip_prefix(HELP_COMMAND)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::from(ASCII_SPACE)))
    }

    fn execute_current(&mut self) {
        let line = self.line.clone();
        let mut argv: Vec<&str, MAX_ARGS> = Vec::new();
        for token in line.split(char::from(ASCII_SPACE)).filter(|token| !token.is_empty()) {
            if argv.push(token).is_err() {
                break;
            }
        }

        match self.current.take() {
            Some(cmd) if self.config.help && is_help_request(&argv) => {
                self.print(cmd.help());
                self.print("\r\n");
            }
            Some(cmd) => {
                debug!("executing '{}' with {} argument(s)", cmd.name(), argv.len());
                if let Err(err) = cmd.execute(&argv) {
                    warn!("command '{}' failed: {}", cmd.name(), err);
                    self.print(cmd.name());
                    self.print(": ");
                    self.print(err.as_str());
                    self.print("\r\n");
                }
            }
            None => self.list_commands(),
        }

        self.line.clear();
        self.state = State::ProcInput;
        self.print_prompt();
    }

    fn list_commands(&mut self) {
        self.print("Available commands:\r\n");
        let registry = self.registry;
        registry.visit(&mut |cmd| {
            self.print(cmd.name());
            self.print("\t\t");
            self.print(cmd.help());
            self.print("\r\n");
        });
    }

    fn autocomplete(&mut self) {
        let registry = self.registry;
        let mut count = 0usize;
        let mut only = None;
        registry.visit_prefixed(&self.line, &mut |cmd| {
            count += 1;
            only = Some(cmd);
        });

        match (count, only) {
            (0, _) | (_, None) => debug!("no completion for '{}'", self.line.as_str()),
            (1, Some(cmd)) => {
                self.line.clear();
                for ch in cmd.name().chars() {
                    if self.line.push(ch).is_err() {
                        break;
                    }
                }
                self.redraw_line();
            }
            (_, Some(_)) => {
                debug!("{} completions for '{}'", count, self.line.as_str());
                let partial = self.line.clone();
                self.print("\r\n");
                registry.visit_prefixed(&partial, &mut |cmd| {
                    self.print(cmd.name());
                    self.print("\r\n");
                });
                self.print_prompt();
                print_to(&mut self.transport, &self.line);
            }
        }
    }

    fn recall(&mut self, older: bool) {
        if !self.config.history {
            return;
        }
        let mut recalled: String<N> = String::new();
        let result = if older {
            self.history.previous(&mut recalled)
        } else {
            self.history.next(&mut recalled)
        };
        match result {
            Ok(()) => {
                self.line = recalled;
                self.redraw_line();
            }
            Err(err) => self.fault(err),
        }
    }

    fn redraw_line(&mut self) {
        if !self.config.echo {
            return;
        }
        self.emit(Action::ClearLine);
        self.print_prompt();
        print_to(&mut self.transport, &self.line);
    }

    fn show_banner(&mut self) {
        if self.banner_shown {
            return;
        }
        self.banner_shown = true;
        self.print(self.config.banner);
    }

    fn print_prompt(&mut self) {
        if !self.config.prompt {
            return;
        }
        if self.config.color {
            self.set_color(Color::Green);
            self.print(self.config.prompt_text);
            self.set_color(Color::Default);
        } else {
            self.print(self.config.prompt_text);
        }
    }

    fn set_color(&mut self, color: Color) {
        let transport = &mut self.transport;
        if let Err(err) = self.codec.set_font_color(color, |seq| transport.print(seq)) {
            warn!("failed to set color: {}", err);
        }
    }

    fn emit(&mut self, action: Action) {
        let transport = &mut self.transport;
        if let Err(err) = self.codec.action(action, |seq| transport.print(seq)) {
            warn!("failed to emit {:?}: {}", action, err);
        }
    }

    fn print(&mut self, text: &str) {
        print_to(&mut self.transport, text);
    }

    fn fault(&mut self, err: Error) {
        error!("session fault in {:?}: {}", self.state, err);
        self.state = State::Error;
    }

    fn recover(&mut self) {
        self.emit(Action::ClearScreen);
        self.reset_input();
        self.state = State::Init;
        self.banner_shown = false;
    }

    fn reset_input(&mut self) {
        self.line.clear();
        self.escape.clear();
        self.current = None;
    }
}

fn is_help_request(argv: &[&str]) -> bool {
    argv.len() == 2 && matches!(argv[1], "-h" | "--help")
}

fn print_to<T: Transport>(transport: &mut T, text: &str) {
    if let Err(err) = transport.print(text) {
        warn!("transport print failed: {:?}", err);
    }
}

impl<T: Transport, const N: usize, const K: usize> fmt::Debug for Session<'_, T, N, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("line", &self.line.as_str())
            .field("current", &self.current.map(|cmd| cmd.name()))
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for State {
    fn format(&self, f: defmt::Formatter) {
        match self {
            State::Init => defmt::write!(f, "Init"),
            State::Auth => defmt::write!(f, "Auth"),
            State::ProcInput => defmt::write!(f, "ProcInput"),
            State::ProcCmd => defmt::write!(f, "ProcCmd"),
            State::ProcEscSeq => defmt::write!(f, "ProcEscSeq"),
            State::Error => defmt::write!(f, "Error"),
        }
    }
}
