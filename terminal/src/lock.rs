//! Attempt lock: the single concurrency guard of the scan loop.

use crate::error::TransitionError;
use std::fmt;

/// Identifies one capture-submit-classify cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Guarantees at most one outstanding attempt.
///
/// Semantically a boolean; it also remembers which attempt holds it so a
/// release from the wrong attempt is caught instead of silently freeing the
/// lock under a live request.
#[derive(Debug, Default)]
pub struct AttemptLock {
    holder: Option<AttemptId>,
}

impl AttemptLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.holder.is_some()
    }

    pub fn holder(&self) -> Option<AttemptId> {
        self.holder
    }

    pub fn acquire(&mut self, attempt: AttemptId) -> Result<(), TransitionError> {
        match self.holder {
            Some(held_by) => Err(TransitionError::LockHeld { held_by }),
            None => {
                self.holder = Some(attempt);
                Ok(())
            }
        }
    }

    pub fn release(&mut self, attempt: AttemptId) -> Result<(), TransitionError> {
        match self.holder {
            Some(held_by) if held_by == attempt => {
                self.holder = None;
                Ok(())
            }
            held_by => Err(TransitionError::LockNotHeld { attempt, held_by }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_refused() {
        let mut lock = AttemptLock::new();
        lock.acquire(AttemptId::new(1)).unwrap();
        assert_eq!(
            lock.acquire(AttemptId::new(2)),
            Err(TransitionError::LockHeld {
                held_by: AttemptId::new(1)
            })
        );
        assert_eq!(lock.holder(), Some(AttemptId::new(1)));
    }

    #[test]
    fn only_the_holder_can_release() {
        let mut lock = AttemptLock::new();
        lock.acquire(AttemptId::new(1)).unwrap();
        assert!(lock.release(AttemptId::new(2)).is_err());
        assert!(lock.is_held());
        lock.release(AttemptId::new(1)).unwrap();
        assert!(!lock.is_held());
    }

    #[test]
    fn releasing_a_free_lock_is_an_error() {
        let mut lock = AttemptLock::new();
        assert_eq!(
            lock.release(AttemptId::new(7)),
            Err(TransitionError::LockNotHeld {
                attempt: AttemptId::new(7),
                held_by: None,
            })
        );
    }
}
