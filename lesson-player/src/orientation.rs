//! Fullscreen to orientation-lock coupling
//!
//! Landscape is locked when the player enters fullscreen and unlocked when it
//! leaves. The subscription reacts to transitions of the fullscreen flag only,
//! so repeated observations of the same value issue nothing.

use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Platform screen-orientation control
pub trait OrientationLock: Send + Sync {
    fn lock_landscape(&self) -> Result<()>;
    fn unlock(&self) -> Result<()>;
}

/// Orientation lock for platforms without one
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOrientationLock;

impl OrientationLock for NoopOrientationLock {
    fn lock_landscape(&self) -> Result<()> {
        Ok(())
    }

    fn unlock(&self) -> Result<()> {
        Ok(())
    }
}

/// Side-effect subscription on the fullscreen flag
pub struct FullscreenSubscription {
    lock: Arc<dyn OrientationLock>,
    fullscreen: bool,
}

impl FullscreenSubscription {
    pub fn new(lock: Arc<dyn OrientationLock>) -> Self {
        Self {
            lock,
            fullscreen: false,
        }
    }

    /// Observe the current flag; returns `true` if it was a transition
    pub fn observe(&mut self, fullscreen: bool) -> bool {
        if fullscreen == self.fullscreen {
            return false;
        }
        self.fullscreen = fullscreen;

        let result = if fullscreen {
            debug!("Entering fullscreen, locking landscape");
            self.lock.lock_landscape()
        } else {
            debug!("Leaving fullscreen, unlocking orientation");
            self.lock.unlock()
        };
        if let Err(e) = result {
            warn!("Orientation lock change failed: {}", e);
        }
        true
    }

    /// Leave fullscreen on teardown so the screen is never left locked
    pub fn release(&mut self) {
        self.observe(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLock {
        calls: Mutex<Vec<&'static str>>,
        fail: bool,
    }

    impl OrientationLock for RecordingLock {
        fn lock_landscape(&self) -> Result<()> {
            self.calls.lock().unwrap().push("lock");
            if self.fail {
                return Err(Error::InvalidState("no orientation service".into()));
            }
            Ok(())
        }

        fn unlock(&self) -> Result<()> {
            self.calls.lock().unwrap().push("unlock");
            Ok(())
        }
    }

    #[test]
    fn test_acts_on_transitions_only() {
        let lock = Arc::new(RecordingLock::default());
        let mut sub = FullscreenSubscription::new(lock.clone());

        assert!(!sub.observe(false));
        assert!(sub.observe(true));
        assert!(!sub.observe(true));
        assert!(sub.observe(false));

        assert_eq!(*lock.calls.lock().unwrap(), vec!["lock", "unlock"]);
    }

    #[test]
    fn test_release_unlocks_only_when_locked() {
        let lock = Arc::new(RecordingLock::default());
        let mut sub = FullscreenSubscription::new(lock.clone());
        sub.release();
        assert!(lock.calls.lock().unwrap().is_empty());

        sub.observe(true);
        sub.release();
        assert_eq!(*lock.calls.lock().unwrap(), vec!["lock", "unlock"]);
    }

    #[test]
    fn test_lock_failure_is_contained() {
        let lock = Arc::new(RecordingLock {
            fail: true,
            ..Default::default()
        });
        let mut sub = FullscreenSubscription::new(lock.clone());
        assert!(sub.observe(true));
        assert!(!sub.observe(true));
    }
}
