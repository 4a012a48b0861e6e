//! Cooperative interruption of a run.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use crate::probe::format_secs;

static SIGNALLED: AtomicI32 = AtomicI32::new(0);
static INSTALL: Once = Once::new();

/// Shared flag checked between checks, during readiness polling, and while
/// external commands run.
///
/// Trips when [`trigger`](Self::trigger) is called, when an armed
/// [`deadline`](Self::set_deadline) passes, or, when created with
/// [`with_signal_handlers`](Self::with_signal_handlers), on SIGINT/SIGTERM.
/// Clones share all three.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    inner: Arc<Inner>,
    watch_signals: bool,
}

#[derive(Debug, Default)]
struct Inner {
    triggered: AtomicBool,
    deadline: Mutex<Option<Deadline>>,
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

impl InterruptFlag {
    /// A flag that only trips when triggered explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that also trips on SIGINT or SIGTERM.
    ///
    /// Handlers are installed once per process with `SA_RESTART` and stay
    /// installed for the life of the process. They only record the signal;
    /// whoever polls the flag shuts down in order.
    pub fn with_signal_handlers() -> Self {
        INSTALL.call_once(install_handlers);
        Self {
            inner: Arc::default(),
            watch_signals: true,
        }
    }

    /// Trip the flag.
    pub fn trigger(&self) {
        self.inner.triggered.store(true, Ordering::SeqCst);
    }

    /// Trip the flag once `budget` has elapsed from now.
    pub fn set_deadline(&self, budget: Duration) {
        let deadline = Deadline {
            at: Instant::now() + budget,
            budget,
        };
        *self
            .inner
            .deadline
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(deadline);
    }

    /// Whether the flag has tripped.
    pub fn is_set(&self) -> bool {
        self.reason().is_some()
    }

    /// Why the flag tripped, if it did.
    pub fn reason(&self) -> Option<String> {
        if self.watch_signals {
            match SIGNALLED.load(Ordering::SeqCst) {
                0 => {}
                sig => return Some(format!("received {}", signal_name(sig))),
            }
        }
        if self.inner.triggered.load(Ordering::SeqCst) {
            return Some("interrupted".to_string());
        }
        let deadline = *self
            .inner
            .deadline
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match deadline {
            Some(deadline) if Instant::now() >= deadline.at => Some(format!(
                "run timeout of {} exceeded",
                format_secs(deadline.budget)
            )),
            _ => None,
        }
    }
}

#[cfg(unix)]
extern "C" fn on_signal(sig: libc::c_int) {
    SIGNALLED.store(sig, Ordering::SeqCst);
}

#[cfg(unix)]
fn install_handlers() {
    // SAFETY: `action` is fully initialized before use and the handler only
    // performs an atomic store, which is async-signal-safe.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        for sig in [libc::SIGINT, libc::SIGTERM] {
            if libc::sigaction(sig, &action, std::ptr::null_mut()) != 0 {
                tracing::warn!("Could not install handler for {}", signal_name(sig));
            }
        }
    }
}

#[cfg(not(unix))]
fn install_handlers() {}

fn signal_name(sig: i32) -> String {
    #[cfg(unix)]
    {
        match sig {
            libc::SIGINT => return "SIGINT".to_string(),
            libc::SIGTERM => return "SIGTERM".to_string(),
            _ => {}
        }
    }
    format!("signal {}", sig)
}
