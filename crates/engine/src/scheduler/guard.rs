//! In-progress flag for report sends.

use std::sync::{Arc, Mutex, PoisonError};

/// The scheduler's `{idle, sending}` flag.
///
/// [`try_acquire`](InFlight::try_acquire) is the only way to set it and the
/// returned guard is the only way to clear it, so every started cycle
/// releases the flag exactly once, whether its send succeeds, fails, or
/// panics.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    sending: Arc<Mutex<bool>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test-and-set under the lock. `None` means a send is already running.
    pub fn try_acquire(&self) -> Option<InFlightGuard> {
        let mut sending = self.lock();
        if *sending {
            return None;
        }
        *sending = true;
        Some(InFlightGuard {
            sending: Arc::clone(&self.sending),
        })
    }

    pub fn is_sending(&self) -> bool {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, bool> {
        self.sending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held for the duration of one send; clears the flag on drop.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    sending: Arc<Mutex<bool>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        *self.sending.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let flag = InFlight::new();
        let guard = flag.try_acquire().expect("idle flag");
        assert!(flag.is_sending());
        assert!(flag.try_acquire().is_none());

        drop(guard);
        assert!(!flag.is_sending());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn release_survives_panic() {
        let flag = InFlight::new();
        let cloned = flag.clone();
        let result = std::thread::spawn(move || {
            let _guard = cloned.try_acquire().unwrap();
            panic!("send blew up");
        })
        .join();

        assert!(result.is_err());
        assert!(!flag.is_sending());
    }
}
