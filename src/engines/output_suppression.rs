//! Suppression of native solver output.
//!
//! CBC prints progress straight to stdout. The `gag` crate redirects a
//! stream, but allows only one live redirection per stream per process, so
//! handles here share a single [`Gag`] through a weak-reference registry:
//! concurrent solves reuse the live instance, and the redirection ends when
//! the last handle drops.

use std::sync::{Arc, Mutex, Weak};

use gag::Gag;

/// A shared handle keeping one output stream muted.
pub struct MuteHandle {
    _gag: Arc<Gag>,
}

impl MuteHandle {
    /// Mute stdout until the last outstanding handle drops.
    pub fn stdout() -> std::io::Result<Self> {
        STDOUT_REGISTRY.acquire()
    }

    /// Mute stderr until the last outstanding handle drops.
    pub fn stderr() -> std::io::Result<Self> {
        STDERR_REGISTRY.acquire()
    }
}

struct MuteRegistry {
    live: Mutex<Weak<Gag>>,
    create: fn() -> std::io::Result<Gag>,
}

impl MuteRegistry {
    const fn new(create: fn() -> std::io::Result<Gag>) -> Self {
        Self {
            live: Mutex::new(Weak::new()),
            create,
        }
    }

    fn acquire(&self) -> std::io::Result<MuteHandle> {
        let mut live = self.live.lock().unwrap();
        if let Some(gag) = live.upgrade() {
            return Ok(MuteHandle { _gag: gag });
        }
        let gag = Arc::new((self.create)()?);
        *live = Arc::downgrade(&gag);
        Ok(MuteHandle { _gag: gag })
    }
}

static STDOUT_REGISTRY: MuteRegistry = MuteRegistry::new(Gag::stdout);
static STDERR_REGISTRY: MuteRegistry = MuteRegistry::new(Gag::stderr);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_share_one_gag() {
        let first = match MuteHandle::stdout() {
            Ok(handle) => handle,
            // Another test may already hold the process-wide gag.
            Err(_) => return,
        };
        let second = MuteHandle::stdout().unwrap();
        assert_eq!(Arc::as_ptr(&first._gag), Arc::as_ptr(&second._gag));
    }

    #[test]
    fn stdout_and_stderr_are_independent() {
        let (out, err) = match (MuteHandle::stdout(), MuteHandle::stderr()) {
            (Ok(out), Ok(err)) => (out, err),
            _ => return,
        };
        assert_ne!(
            Arc::as_ptr(&out._gag) as *const (),
            Arc::as_ptr(&err._gag) as *const ()
        );
    }
}
