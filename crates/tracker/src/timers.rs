//! Generation-scoped cancellation for a tracker's timers.
//!
//! Every submission opens a new [`JobScope`]: a generation number plus a
//! [`CancellationToken`] that is a child of the tracker's root token.
//! Spawned poll and progress tasks hold a copy of their scope. Opening a
//! new scope or invalidating the current one cancels the old token (so
//! sleeping timers wake and exit) and bumps the generation (so a network
//! call that was already in flight can tell its answer is stale).

use tokio_util::sync::CancellationToken;

/// The timers and in-flight calls belonging to one submission.
#[derive(Debug, Clone)]
pub struct JobScope {
    pub generation: u64,
    pub cancel: CancellationToken,
}

/// Tracks which [`JobScope`] is live.
#[derive(Debug, Default)]
pub struct TimerArena {
    generation: u64,
    current: Option<CancellationToken>,
}

impl TimerArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate whatever scope is live and open a fresh one.
    pub fn begin(&mut self, root: &CancellationToken) -> JobScope {
        self.invalidate();
        let cancel = root.child_token();
        self.current = Some(cancel.clone());
        JobScope {
            generation: self.generation,
            cancel,
        }
    }

    /// Cancel the live scope's timers and retire its generation.
    pub fn invalidate(&mut self) {
        if let Some(cancel) = self.current.take() {
            cancel.cancel();
        }
        self.generation += 1;
    }

    /// Whether `scope` is still the live one.
    pub fn is_current(&self, scope: &JobScope) -> bool {
        self.current.is_some() && scope.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_scope_is_current() {
        let root = CancellationToken::new();
        let mut arena = TimerArena::new();

        let scope = arena.begin(&root);

        assert!(arena.is_current(&scope));
        assert!(!scope.cancel.is_cancelled());
    }

    #[test]
    fn begin_retires_previous_scope() {
        let root = CancellationToken::new();
        let mut arena = TimerArena::new();

        let old = arena.begin(&root);
        let new = arena.begin(&root);

        assert!(!arena.is_current(&old));
        assert!(old.cancel.is_cancelled());
        assert!(arena.is_current(&new));
        assert!(new.generation > old.generation);
    }

    #[test]
    fn invalidate_leaves_no_current_scope() {
        let root = CancellationToken::new();
        let mut arena = TimerArena::new();

        let scope = arena.begin(&root);
        arena.invalidate();

        assert!(!arena.is_current(&scope));
        assert!(scope.cancel.is_cancelled());
    }

    #[test]
    fn cancelling_root_cancels_scope() {
        let root = CancellationToken::new();
        let mut arena = TimerArena::new();

        let scope = arena.begin(&root);
        root.cancel();

        assert!(scope.cancel.is_cancelled());
    }
}
