//! Watch sessions and the table that owns them

use std::collections::HashMap;

use ojwatch_core::domain::submission::{SubmissionHandle, SubmissionId, Verdict};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::WatchConfig;
use crate::error::{Result, WatchError};

/// What a poll loop does after recording a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Sleep one interval and poll again
    Continue,
    /// Judging finished with this verdict
    Resolved(Verdict),
    /// Budget exhausted after this many attempts
    TimedOut(u32),
}

/// Apply one poll answer to a handle and decide how to proceed
pub(crate) fn advance(handle: &mut SubmissionHandle, verdict: Verdict, max_attempts: u32) -> Step {
    handle.attempts += 1;
    handle.status = Some(verdict);

    if verdict.is_terminal() {
        Step::Resolved(verdict)
    } else if handle.attempts >= max_attempts {
        Step::TimedOut(handle.attempts)
    } else {
        Step::Continue
    }
}

/// Bookkeeping for one live watch
///
/// The session owns the result sender. Whoever removes the session from the
/// table decides how the watch settles: `finish` sends an outcome, `cancel`
/// drops the sender so the caller sees `Cancelled` right away.
pub(crate) struct WatchSession {
    pub generation: u64,
    pub config: WatchConfig,
    pub progress: watch::Sender<SubmissionHandle>,
    pub result: oneshot::Sender<Result<Verdict>>,
    pub task: JoinHandle<()>,
}

impl WatchSession {
    pub fn snapshot(&self) -> SubmissionHandle {
        *self.progress.borrow()
    }

    /// Record a verdict on the observable handle
    pub fn record(&self, verdict: Verdict) -> Step {
        let mut step = Step::Continue;
        let max_attempts = self.config.max_attempts();
        self.progress
            .send_modify(|handle| step = advance(handle, verdict, max_attempts));
        step
    }

    /// Settle the watch; called by the poll loop on itself
    pub fn finish(self, outcome: Result<Verdict>) {
        // The caller may have dropped its `Watch` already.
        let _ = self.result.send(outcome);
    }

    /// Stop the poll loop; the pending result settles as `Cancelled`
    ///
    /// Aborting drops an in-flight status request along with the task.
    pub fn cancel(self) {
        self.task.abort();
    }
}

/// Live sessions keyed by submission id
#[derive(Default)]
pub(crate) struct SessionTable {
    sessions: HashMap<SubmissionId, WatchSession>,
    generation: u64,
}

impl SessionTable {
    /// Generation tag for the next session
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Insert a session, returning the one it replaces
    pub fn insert(&mut self, id: SubmissionId, session: WatchSession) -> Option<WatchSession> {
        self.sessions.insert(id, session)
    }

    pub fn remove(&mut self, id: SubmissionId) -> Option<WatchSession> {
        self.sessions.remove(&id)
    }

    pub fn get(&self, id: SubmissionId) -> Option<&WatchSession> {
        self.sessions.get(&id)
    }

    /// The session for `id`, only if it is still the one tagged `generation`
    pub fn live(&self, id: SubmissionId, generation: u64) -> Option<&WatchSession> {
        self.sessions
            .get(&id)
            .filter(|session| session.generation == generation)
    }

    pub fn contains(&self, id: SubmissionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn ids(&self) -> Vec<SubmissionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn drain(&mut self) -> Vec<WatchSession> {
        self.sessions.drain().map(|(_, session)| session).collect()
    }
}

/// Outcome for a step that ends the watch
pub(crate) fn outcome_of(step: Step) -> Option<Result<Verdict>> {
    match step {
        Step::Continue => None,
        Step::Resolved(verdict) => Some(Ok(verdict)),
        Step::TimedOut(attempts) => Some(Err(WatchError::PollTimeout { attempts })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_terminal_continues_within_budget() {
        let mut handle = SubmissionHandle::new(1);
        assert_eq!(advance(&mut handle, Verdict::Pending, 3), Step::Continue);
        assert_eq!(advance(&mut handle, Verdict::Judging, 3), Step::Continue);
        assert_eq!(handle.attempts, 2);
        assert_eq!(handle.status, Some(Verdict::Judging));
    }

    #[test]
    fn test_budget_exhaustion_times_out() {
        let mut handle = SubmissionHandle::new(1);
        assert_eq!(advance(&mut handle, Verdict::Judging, 1), Step::TimedOut(1));
    }

    #[test]
    fn test_terminal_wins_over_budget() {
        let mut handle = SubmissionHandle::new(1);
        advance(&mut handle, Verdict::Judging, 2);
        assert_eq!(
            advance(&mut handle, Verdict::RuntimeError, 2),
            Step::Resolved(Verdict::RuntimeError)
        );
        assert!(handle.is_terminal());
    }

    #[test]
    fn test_outcome_of_steps() {
        assert!(outcome_of(Step::Continue).is_none());
        assert!(matches!(
            outcome_of(Step::Resolved(Verdict::Accepted)),
            Some(Ok(Verdict::Accepted))
        ));
        assert!(matches!(
            outcome_of(Step::TimedOut(4)),
            Some(Err(WatchError::PollTimeout { attempts: 4 }))
        ));
    }

    #[tokio::test]
    async fn test_table_generations() {
        let mut table = SessionTable::default();
        let first = table.next_generation();
        let second = table.next_generation();
        assert!(second > first);

        let (progress, _) = watch::channel(SubmissionHandle::new(9));
        let (result, _) = oneshot::channel();
        let task = tokio::spawn(async {});
        table.insert(
            9,
            WatchSession {
                generation: second,
                config: WatchConfig::default(),
                progress,
                result,
                task,
            },
        );

        assert!(table.live(9, second).is_some());
        assert!(table.live(9, first).is_none());
        assert_eq!(table.ids(), vec![9]);
        assert_eq!(table.drain().len(), 1);
        assert!(!table.contains(9));
    }
}
