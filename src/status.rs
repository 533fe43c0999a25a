use crate::error::{TaskError, TaskResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cooperative cancellation signal polled by stage code.
pub trait TaskStatus: Send + Sync {
    fn is_cancelled(&self) -> bool;

    fn throw_if_cancelled(&self) -> TaskResult<()> {
        if self.is_cancelled() {
            Err(TaskError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Status that never cancels, for one-off runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl TaskStatus for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Shared cancellation token: an explicit flag plus an optional deadline.
///
/// Clones share the flag, so one handle can be given to every run of a job
/// and cancelled from anywhere.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that reports cancelled once `timeout` has elapsed.
    /// A zero timeout means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        // Too far out to represent is the same as no deadline.
        let deadline = if timeout.is_zero() {
            None
        } else {
            Instant::now().checked_add(timeout)
        };
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl TaskStatus for CancellationToken {
    fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::SeqCst) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(other.throw_if_cancelled().is_ok());
        token.cancel();
        assert!(matches!(other.throw_if_cancelled(), Err(TaskError::Cancelled)));
    }

    #[test]
    fn zero_timeout_never_expires() {
        let token = CancellationToken::with_timeout(Duration::ZERO);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn huge_timeout_never_expires() {
        let token = CancellationToken::with_timeout(Duration::from_secs(u64::MAX));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn elapsed_deadline_cancels() {
        let token = CancellationToken::with_timeout(Duration::from_nanos(1));
        std::thread::sleep(Duration::from_millis(2));
        assert!(token.is_cancelled());
    }
}
