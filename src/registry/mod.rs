//! # Command registry
//!
//! A [`Registry`] holds references to caller-declared [`Command`] descriptors
//! in insertion order. Every access is serialized through an injected
//! [`Lock`], so commands can be attached and detached from other contexts
//! while a session is running.
//!
//! Descriptors are usually `static`s. A command can carry its own lock, which
//! [`Command::execute`] holds for the duration of the handler so that two
//! sessions sharing one descriptor never run it concurrently.
//!
//! ```rust
//! use ushell::error::Error;
//! use ushell::registry::{Command, Registry, SpinLock};
//!
//! fn reboot(_argc: usize, _argv: &[&str]) -> Result<(), Error> {
//!     Ok(())
//! }
//!
//! static REBOOT_LOCK: SpinLock = SpinLock::new();
//! static REBOOT: Command = Command::new("reboot", "Restart the device", &reboot)
//!     .with_lock(&REBOOT_LOCK);
//!
//! let registry: Registry<'_, SpinLock, 8> = Registry::new(SpinLock::new());
//! registry.add(&REBOOT).unwrap();
//! assert_eq!(registry.add(&REBOOT), Err(Error::AlreadyExists));
//! assert!(registry.resolve("reboot now").is_some());
//! assert!(registry.resolve("rebooting").is_none());
//! ```

use core::cell::UnsafeCell;
use core::fmt;
use core::ptr;

use heapless::Vec;

use crate::error::Error;

mod lock;

pub use lock::{Lock, LockGuard, SpinLock};

/// Command body.
///
/// Implemented for every `Fn(usize, &[&str]) -> Result<(), Error>` that is
/// `Sync`, so plain functions work as handlers. `argv[0]` is the command name.
pub trait Handler: Sync {
    /// Run the command.
    fn call(&self, argc: usize, argv: &[&str]) -> Result<(), Error>;
}

impl<F> Handler for F
where
    F: Fn(usize, &[&str]) -> Result<(), Error> + Sync,
{
    fn call(&self, argc: usize, argv: &[&str]) -> Result<(), Error> {
        self(argc, argv)
    }
}

/// Command descriptor.
#[derive(Clone, Copy)]
pub struct Command<'a> {
    name: &'a str,
    help: &'a str,
    handler: &'a dyn Handler,
    lock: Option<&'a dyn Lock>,
}

impl<'a> Command<'a> {
    /// Describe a command without a per-command lock.
    pub const fn new(name: &'a str, help: &'a str, handler: &'a dyn Handler) -> Self {
        Self {
            name,
            help,
            handler,
            lock: None,
        }
    }

    /// Guard every execution of this command with `lock`.
    pub const fn with_lock(mut self, lock: &'a dyn Lock) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Name as typed by the user.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// One-line help text.
    pub fn help(&self) -> &'a str {
        self.help
    }

    /// Run the handler with `argv`, holding the command's own lock if it has one.
    pub fn execute(&self, argv: &[&str]) -> Result<(), Error> {
        let _guard = self.lock.map(LockGuard::new);
        self.handler.call(argv.len(), argv)
    }

    /// Whether `line` invokes this command: the name followed by a space or
    /// the end of the line.
    pub fn matches(&self, line: &str) -> bool {
        !self.name.is_empty()
            && line
                .strip_prefix(self.name)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
    }
}

impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("locked", &self.lock.is_some())
            .finish()
    }
}

/// Read access to a set of commands, as seen by a session.
pub trait CommandSet<'a> {
    /// First command, in insertion order, that `line` invokes.
    fn resolve(&self, line: &str) -> Option<&'a Command<'a>>;

    /// Call `f` with every command in insertion order.
    fn visit(&self, f: &mut dyn FnMut(&'a Command<'a>));

    /// Call `f` with every command whose name starts with `partial`.
    fn visit_prefixed(&self, partial: &str, f: &mut dyn FnMut(&'a Command<'a>)) {
        self.visit(&mut |cmd| {
            if cmd.name().starts_with(partial) {
                f(cmd);
            }
        });
    }
}

/// Fixed-capacity, lock-protected list of up to `N` commands.
pub struct Registry<'a, L: Lock, const N: usize> {
    lock: L,
    commands: UnsafeCell<Vec<&'a Command<'a>, N>>,
}

// SAFETY: `commands` is only reached through `with`, which holds `lock` for
// the whole access, and `Lock` guarantees exclusion across contexts.
unsafe impl<L: Lock, const N: usize> Sync for Registry<'_, L, N> {}

impl<'a, L: Lock, const N: usize> Registry<'a, L, N> {
    /// Create an empty registry guarded by `lock`.
    pub const fn new(lock: L) -> Self {
        Self {
            lock,
            commands: UnsafeCell::new(Vec::new()),
        }
    }

    /// Append `cmd` at the tail.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - the command is linked
    /// * `Err(Error::InvalidArguments)` - the command has an empty name
    /// * `Err(Error::AlreadyExists)` - this very descriptor is already linked
    /// * `Err(Error::Full)` - all `N` slots are taken
    pub fn add(&self, cmd: &'a Command<'a>) -> Result<(), Error> {
        if cmd.name().is_empty() {
            return Err(Error::InvalidArguments);
        }
        self.with(|commands| {
            if commands.iter().any(|linked| ptr::eq(*linked, cmd)) {
                return Err(Error::AlreadyExists);
            }
            commands.push(cmd).map_err(|_| Error::Full)
        })
    }

    /// Unlink `cmd`, compared by identity.
    pub fn remove(&self, cmd: &'a Command<'a>) -> Result<(), Error> {
        self.with(|commands| {
            let index = commands
                .iter()
                .position(|linked| ptr::eq(*linked, cmd))
                .ok_or(Error::NotFound)?;
            commands.remove(index);
            Ok(())
        })
    }

    /// Whether this very descriptor is linked.
    pub fn contains(&self, cmd: &Command<'_>) -> bool {
        self.with(|commands| commands.iter().any(|linked| ptr::eq(*linked, cmd)))
    }

    /// First command in the list.
    pub fn head(&self) -> Option<&'a Command<'a>> {
        self.with(|commands| commands.first().copied())
    }

    /// Number of linked commands.
    pub fn len(&self) -> usize {
        self.with(|commands| commands.len())
    }

    /// Whether no command is linked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First command, in insertion order, that `line` invokes.
    ///
    /// A command named `ls` resolves `ls` and `ls -l`, never `lsblk`.
    pub fn resolve(&self, line: &str) -> Option<&'a Command<'a>> {
        self.with(|commands| commands.iter().copied().find(|cmd| cmd.matches(line)))
    }

    /// Every command whose name starts with `partial`, in insertion order.
    pub fn candidates(&self, partial: &str) -> Vec<&'a Command<'a>, N> {
        self.with(|commands| {
            commands
                .iter()
                .copied()
                .filter(|cmd| cmd.name().starts_with(partial))
                .collect()
        })
    }

    /// Copy of the current list.
    ///
    /// The lock is released before the copy is returned, so callers may
    /// modify the registry while walking it.
    pub fn snapshot(&self) -> Vec<&'a Command<'a>, N> {
        self.with(|commands| commands.clone())
    }

    /// Call `f` with every command in insertion order.
    pub fn for_each(&self, mut f: impl FnMut(&'a Command<'a>)) {
        for cmd in self.snapshot() {
            f(cmd);
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Vec<&'a Command<'a>, N>) -> R) -> R {
        let _guard = LockGuard::new(&self.lock);
        // SAFETY: the guard gives exclusive access, and `f` is always a
        // closure from this impl that never re-enters the registry.
        let commands = unsafe { &mut *self.commands.get() };
        f(commands)
    }
}

// Commands outlive any shorter borrow of the registry, so a registry of
// `'static` descriptors can be viewed through a local reference.
impl<'b, 'a: 'b, L: Lock, const N: usize> CommandSet<'b> for Registry<'a, L, N> {
    fn resolve(&self, line: &str) -> Option<&'b Command<'b>> {
        Registry::resolve(self, line)
    }

    fn visit(&self, f: &mut dyn FnMut(&'b Command<'b>)) {
        self.for_each(|cmd| f(cmd));
    }
}

impl<L: Lock, const N: usize> fmt::Debug for Registry<'_, L, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let commands = self.snapshot();
        f.debug_list()
            .entries(commands.iter().map(|cmd| cmd.name()))
            .finish()
    }
}
