//! Re-layout scheduling. The interactive editor defers layout until after
//! the host has committed a render (so label measurement sees the latest
//! text), and rapid successive edits must collapse into a single pass.
//! This is the host-agnostic form of that contract: a single pending slot
//! driven by whatever tick primitive the host has.

#[derive(Debug, Default)]
pub struct LayoutScheduler {
    requested: u64,
    executed: u64,
}

impl LayoutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks for a layout pass. A request made while one is already pending
    /// supersedes it; only the most recent request will execute.
    pub fn request(&mut self) {
        self.requested += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.requested > self.executed
    }

    /// Claims the pending pass. Returns true at most once per batch of
    /// requests; the caller runs the pass exactly when this yields true.
    pub fn take(&mut self) -> bool {
        if self.requested > self.executed {
            self.executed = self.requested;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_requests_coalesce_into_one_pass() {
        let mut scheduler = LayoutScheduler::new();
        scheduler.request();
        scheduler.request();
        scheduler.request();
        assert!(scheduler.take());
        assert!(!scheduler.take());
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn request_after_take_pends_again() {
        let mut scheduler = LayoutScheduler::new();
        scheduler.request();
        assert!(scheduler.take());
        scheduler.request();
        assert!(scheduler.is_pending());
        assert!(scheduler.take());
    }

    #[test]
    fn take_without_request_is_idle() {
        let mut scheduler = LayoutScheduler::new();
        assert!(!scheduler.take());
    }
}
