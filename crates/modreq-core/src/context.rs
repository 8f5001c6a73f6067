//! Execution context of top-level requests.
//!
//! Until the host marks initialization complete, a failed top-level request
//! aborts the process: exit hooks run once, then the terminator is called.
//! Afterwards failures are returned to the caller.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

type Hook = Box<dyn FnOnce() + Send>;

/// Handlers to run before the process exits.
///
/// Hooks run in reverse registration order, and only the first call to
/// [`ExitHooks::run_all`] runs anything.
#[derive(Default)]
pub struct ExitHooks {
    hooks: Mutex<Vec<Hook>>,
    ran: AtomicBool,
}

impl ExitHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.hooks.lock().push(Box::new(hook));
    }

    /// Run all hooks. Returns `false` if they had already been run.
    pub fn run_all(&self) -> bool {
        if self.ran.swap(true, Ordering::SeqCst) {
            return false;
        }
        let hooks = std::mem::take(&mut *self.hooks.lock());
        for hook in hooks.into_iter().rev() {
            hook();
        }
        true
    }

    pub fn has_run(&self) -> bool {
        self.ran.load(Ordering::SeqCst)
    }
}

/// Ends the process with an exit status.
pub type Terminator = Box<dyn Fn(i32) + Send + Sync>;

/// Whether the host has finished initializing, plus what to do when a startup
/// request fails.
pub struct Context {
    initialized: AtomicBool,
    exit_hooks: ExitHooks,
    terminate: Terminator,
}

impl Context {
    /// Context that exits the process on a startup failure.
    pub fn new() -> Self {
        Self::with_terminator(Box::new(|status| std::process::exit(status)))
    }

    pub fn with_terminator(terminate: Terminator) -> Self {
        Self {
            initialized: AtomicBool::new(false),
            exit_hooks: ExitHooks::new(),
            terminate,
        }
    }

    /// Record that initialization finished. Returns `false` if it already had.
    pub fn mark_initialized(&self) -> bool {
        !self.initialized.swap(true, Ordering::SeqCst)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn exit_hooks(&self) -> &ExitHooks {
        &self.exit_hooks
    }

    /// Abort startup: run exit hooks, then terminate with `status`.
    pub fn abort(&self, status: i32) {
        tracing::error!("Aborting startup script");
        self.exit_hooks.run_all();
        (self.terminate)(status);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
