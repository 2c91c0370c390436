//! Submission watcher
//!
//! Polls a [`StatusSource`] for each watched submission until a terminal
//! verdict arrives or the attempt budget runs out. Each watch runs as its own
//! task: poll, record, sleep one interval, repeat. The first poll is issued
//! as soon as the task runs, without waiting an interval.
//!
//! The session table is the only shared state. The lock is taken only for
//! the synchronous step between the two suspension points (the fetch and the
//! sleep), so a loop always sees a consistent table. Cancelling a session
//! aborts its task, in-flight fetch included; a fetch that completes anyway
//! fails the generation check and is dropped unread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ojwatch_core::domain::submission::{SubmissionHandle, SubmissionId, Verdict};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use super::session::{SessionTable, Step, WatchSession, outcome_of};
use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::source::StatusSource;

type SharedTable = Arc<Mutex<SessionTable>>;

fn lock(table: &SharedTable) -> MutexGuard<'_, SessionTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Caller side of one watch
///
/// Settles exactly once. Dropping it does not stop polling; use
/// [`SubmissionWatcher::cancel_watch`] for that.
pub struct Watch {
    submission_id: SubmissionId,
    progress: watch::Receiver<SubmissionHandle>,
    outcome: oneshot::Receiver<Result<Verdict>>,
}

impl Watch {
    pub fn submission_id(&self) -> SubmissionId {
        self.submission_id
    }

    /// Latest status and attempt count
    pub fn handle(&self) -> SubmissionHandle {
        *self.progress.borrow()
    }

    /// Receiver notified after every answered poll
    pub fn subscribe(&self) -> watch::Receiver<SubmissionHandle> {
        self.progress.clone()
    }

    /// Wait for the watch to settle
    ///
    /// # Returns
    /// The terminal verdict, or
    /// - `PollTimeout` when the budget ran out while still judging
    /// - `Transport` when a status fetch failed
    /// - `Cancelled` when the watch was cancelled, replaced or torn down
    pub async fn outcome(self) -> Result<Verdict> {
        self.outcome.await.unwrap_or(Err(WatchError::Cancelled))
    }
}

/// Watches submissions until they are judged
///
/// Starting a watch for a submission that is already being watched cancels
/// the earlier watch. Dropping the watcher tears down every watch it owns.
pub struct SubmissionWatcher {
    source: Arc<dyn StatusSource>,
    sessions: SharedTable,
}

impl SubmissionWatcher {
    /// Creates a watcher polling `source`
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self {
            source,
            sessions: Arc::new(Mutex::new(SessionTable::default())),
        }
    }

    /// Starts watching with the default interval and budget
    pub fn watch(&self, submission_id: SubmissionId) -> Watch {
        self.start_watch(submission_id, WatchConfig::default())
    }

    /// Starts watching a submission
    ///
    /// Any existing watch for the same id is cancelled first. Must be called
    /// from within a tokio runtime.
    pub fn start_watch(&self, submission_id: SubmissionId, config: WatchConfig) -> Watch {
        let (progress, progress_rx) = watch::channel(SubmissionHandle::new(submission_id));
        let (result, outcome) = oneshot::channel();

        let mut table = lock(&self.sessions);
        let generation = table.next_generation();

        if let Some(previous) = table.remove(submission_id) {
            info!(
                "Replacing active watch for submission {} (after {} attempt(s))",
                submission_id,
                previous.snapshot().attempts
            );
            previous.cancel();
        }

        // The loop blocks on the table lock before acting on its first answer,
        // so it cannot observe the table before its session is inserted.
        let task = tokio::spawn(poll_loop(
            submission_id,
            generation,
            config,
            Arc::clone(&self.source),
            Arc::clone(&self.sessions),
        ));

        table.insert(
            submission_id,
            WatchSession {
                generation,
                config,
                progress,
                result,
                task,
            },
        );

        debug!(
            "Watching submission {} (interval: {:?}, max attempts: {})",
            submission_id,
            config.interval(),
            config.max_attempts()
        );

        Watch {
            submission_id,
            progress: progress_rx,
            outcome,
        }
    }

    /// Stops watching a submission
    ///
    /// No-op when the submission is not being watched.
    pub fn cancel_watch(&self, submission_id: SubmissionId) {
        let session = lock(&self.sessions).remove(submission_id);

        if let Some(session) = session {
            info!("Cancelled watch for submission {}", submission_id);
            session.cancel();
        }
    }

    /// Whether a live watch exists for the submission
    pub fn is_watching(&self, submission_id: SubmissionId) -> bool {
        lock(&self.sessions).contains(submission_id)
    }

    /// Progress of a live watch
    pub fn snapshot(&self, submission_id: SubmissionId) -> Option<SubmissionHandle> {
        lock(&self.sessions)
            .get(submission_id)
            .map(WatchSession::snapshot)
    }

    /// Number of live watches
    pub fn active_count(&self) -> usize {
        lock(&self.sessions).len()
    }

    /// Ids of every live watch
    pub fn watched_ids(&self) -> Vec<SubmissionId> {
        lock(&self.sessions).ids()
    }

    /// Cancels every live watch
    pub fn teardown(&self) {
        let sessions = lock(&self.sessions).drain();

        if !sessions.is_empty() {
            info!("Tearing down {} active watch(es)", sessions.len());
        }

        for session in sessions {
            session.cancel();
        }
    }
}

impl Drop for SubmissionWatcher {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Poll loop of one session
///
/// Exits as soon as its session is no longer the live one for the id.
async fn poll_loop(
    submission_id: SubmissionId,
    generation: u64,
    config: WatchConfig,
    source: Arc<dyn StatusSource>,
    sessions: SharedTable,
) {
    loop {
        debug!("Polling status of submission {}", submission_id);
        let fetched = source.fetch_status(submission_id).await;

        {
            let mut table = lock(&sessions);

            let Some(session) = table.live(submission_id, generation) else {
                debug!(
                    "Discarding stale status response for submission {}",
                    submission_id
                );
                return;
            };

            let outcome = match fetched {
                Ok(verdict) => {
                    let step = session.record(verdict);
                    if step == Step::Continue {
                        debug!(
                            "Submission {} is {} (attempt {}/{})",
                            submission_id,
                            verdict,
                            session.snapshot().attempts,
                            config.max_attempts()
                        );
                    }
                    outcome_of(step)
                }
                Err(e) => {
                    warn!(
                        "Failed to fetch status of submission {}: {}",
                        submission_id, e
                    );
                    Some(Err(WatchError::Transport(e)))
                }
            };

            if let Some(outcome) = outcome {
                match &outcome {
                    Ok(verdict) => info!("Submission {} judged: {}", submission_id, verdict),
                    Err(WatchError::PollTimeout { attempts }) => warn!(
                        "Submission {} still judging after {} attempt(s), giving up",
                        submission_id, attempts
                    ),
                    Err(_) => {}
                }

                if let Some(session) = table.remove(submission_id) {
                    session.finish(outcome);
                }
                return;
            }
        }

        tokio::time::sleep(config.interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ojwatch_client::ClientError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    const INTERVAL: Duration = Duration::from_millis(10);

    /// Answers from a script, then a fallback verdict forever
    struct ScriptedSource {
        script: Mutex<VecDeque<std::result::Result<Verdict, ClientError>>>,
        fallback: Verdict,
        latency: Duration,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(
            script: Vec<std::result::Result<Verdict, ClientError>>,
            fallback: Verdict,
        ) -> Arc<Self> {
            Self::with_latency(script, fallback, Duration::ZERO)
        }

        fn with_latency(
            script: Vec<std::result::Result<Verdict, ClientError>>,
            fallback: Verdict,
            latency: Duration,
        ) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                latency,
                calls: AtomicU32::new(0),
            })
        }

        fn always(verdict: Verdict) -> Arc<Self> {
            Self::new(Vec::new(), verdict)
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(
            &self,
            _submission_id: SubmissionId,
        ) -> std::result::Result<Verdict, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // The answer is fixed when the call is issued, as a server would.
            let answer = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(self.fallback));
            if !self.latency.is_zero() {
                sleep(self.latency).await;
            }
            answer
        }
    }

    fn config(max_attempts: u32) -> WatchConfig {
        WatchConfig::new(INTERVAL, max_attempts).unwrap()
    }

    fn watcher(source: &Arc<ScriptedSource>) -> SubmissionWatcher {
        SubmissionWatcher::new(Arc::clone(source) as Arc<dyn StatusSource>)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_is_immediate() {
        let source = ScriptedSource::always(Verdict::Accepted);
        let watcher = watcher(&source);
        let started = Instant::now();

        let verdict = watcher.start_watch(1, config(60)).outcome().await.unwrap();

        assert_eq!(verdict, Verdict::Accepted);
        assert_eq!(source.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_terminal_verdict() {
        let source = ScriptedSource::new(
            vec![Ok(Verdict::Pending), Ok(Verdict::Accepted)],
            Verdict::Judging,
        );
        let watcher = watcher(&source);

        let watch = watcher.start_watch(7, config(60));
        let progress = watch.subscribe();
        let verdict = watch.outcome().await.unwrap();

        assert_eq!(verdict, Verdict::Accepted);
        assert_eq!(source.calls(), 2);

        let handle = *progress.borrow();
        assert_eq!(handle.status, Some(Verdict::Accepted));
        assert_eq!(handle.attempts, 2);

        sleep(INTERVAL * 5).await;
        assert_eq!(source.calls(), 2);
        assert!(!watcher.is_watching(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_budget() {
        let source = ScriptedSource::always(Verdict::Judging);
        let watcher = watcher(&source);
        let started = Instant::now();

        let err = watcher.start_watch(3, config(3)).outcome().await.unwrap_err();

        assert!(matches!(err, WatchError::PollTimeout { attempts: 3 }));
        assert_eq!(source.calls(), 3);
        assert!(started.elapsed() >= INTERVAL * 2);
        assert!(started.elapsed() < INTERVAL * 3);

        sleep(INTERVAL * 5).await;
        assert_eq!(source.calls(), 3);
        assert!(!watcher.is_watching(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_not_retried() {
        let source = ScriptedSource::new(
            vec![
                Ok(Verdict::Judging),
                Err(ClientError::api_error(503, "unavailable")),
            ],
            Verdict::Judging,
        );
        let watcher = watcher(&source);

        let watch = watcher.start_watch(5, config(60));
        let progress = watch.subscribe();
        let err = watch.outcome().await.unwrap_err();

        assert!(matches!(err, WatchError::Transport(ClientError::ApiError { status: 503, .. })));
        assert_eq!(source.calls(), 2);
        // The failed poll is not an answer; the handle keeps the last verdict.
        assert_eq!(progress.borrow().attempts, 1);

        sleep(INTERVAL * 5).await;
        assert_eq!(source.calls(), 2);
        assert!(!watcher.is_watching(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_silences_future_polls() {
        let source = ScriptedSource::always(Verdict::Judging);
        let watcher = watcher(&source);

        let watch = watcher.start_watch(11, config(60));
        sleep(INTERVAL / 2).await;
        assert_eq!(source.calls(), 1);
        assert!(watcher.is_watching(11));
        assert_eq!(
            watcher.snapshot(11).map(|h| h.status),
            Some(Some(Verdict::Judging))
        );

        watcher.cancel_watch(11);
        assert!(!watcher.is_watching(11));
        assert_eq!(watcher.snapshot(11), None);

        sleep(INTERVAL * 5).await;
        assert_eq!(source.calls(), 1);
        assert!(watch.outcome().await.unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unknown_id_is_noop() {
        let source = ScriptedSource::always(Verdict::Judging);
        let watcher = watcher(&source);

        watcher.cancel_watch(404);
        watcher.cancel_watch(404);
        assert!(!watcher.is_watching(404));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_response_discarded_after_cancel() {
        let source = ScriptedSource::with_latency(
            vec![Ok(Verdict::Accepted)],
            Verdict::Judging,
            Duration::from_millis(20),
        );
        let watcher = watcher(&source);

        let watch = watcher.start_watch(2, config(60));
        let progress = watch.subscribe();
        sleep(Duration::from_millis(5)).await;
        assert_eq!(source.calls(), 1);

        watcher.cancel_watch(2);
        sleep(Duration::from_millis(50)).await;

        assert_eq!(progress.borrow().status, None);
        assert_eq!(progress.borrow().attempts, 0);
        assert!(watch.outcome().await.unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_existing_session() {
        let source = ScriptedSource::with_latency(
            vec![Ok(Verdict::Accepted)],
            Verdict::Judging,
            Duration::from_millis(20),
        );
        let watcher = watcher(&source);

        let first = watcher.start_watch(8, config(60));
        sleep(Duration::from_millis(5)).await;
        let second = watcher.start_watch(8, config(60));

        assert_eq!(watcher.active_count(), 1);
        assert!(first.outcome().await.unwrap_err().is_cancelled());

        // The stale Accepted answer belonged to the first session.
        sleep(Duration::from_millis(25)).await;
        let handle = second.handle();
        assert_eq!(handle.status, Some(Verdict::Judging));
        assert_eq!(handle.attempts, 1);
        assert!(watcher.is_watching(8));
        assert_eq!(watcher.watched_ids(), vec![8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_watch_after_settling_starts_fresh() {
        let source = ScriptedSource::new(
            vec![Ok(Verdict::Judging), Ok(Verdict::WrongAnswer)],
            Verdict::WrongAnswer,
        );
        let watcher = watcher(&source);

        let first = watcher.start_watch(4, config(1)).outcome().await;
        assert!(first.unwrap_err().is_timeout());

        let watch = watcher.start_watch(4, config(60));
        assert_eq!(watch.handle().attempts, 0);

        let progress = watch.subscribe();
        assert_eq!(watch.outcome().await.unwrap(), Verdict::WrongAnswer);
        assert_eq!(progress.borrow().attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_all() {
        let source = ScriptedSource::always(Verdict::Pending);
        let watcher = watcher(&source);

        let one = watcher.start_watch(1, config(60));
        let two = watcher.start_watch(2, config(60));
        sleep(INTERVAL / 2).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(watcher.active_count(), 2);

        watcher.teardown();

        assert!(!watcher.is_watching(1));
        assert!(!watcher.is_watching(2));
        sleep(INTERVAL * 5).await;
        assert_eq!(source.calls(), 2);
        assert!(one.outcome().await.unwrap_err().is_cancelled());
        assert!(two.outcome().await.unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_watcher_tears_down() {
        let source = ScriptedSource::always(Verdict::Judging);
        let watcher = watcher(&source);

        let watch = watcher.start_watch(6, config(60));
        sleep(INTERVAL / 2).await;
        drop(watcher);

        sleep(INTERVAL * 5).await;
        assert_eq!(source.calls(), 1);
        assert!(watch.outcome().await.unwrap_err().is_cancelled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_restart_and_cancel_across_worker_threads() {
        let source = ScriptedSource::with_latency(
            vec![Ok(Verdict::Accepted)],
            Verdict::Judging,
            Duration::from_millis(20),
        );
        let watcher = Arc::new(watcher(&source));
        let slow = WatchConfig::new(Duration::from_secs(5), 60).unwrap();

        let first = watcher.start_watch(8, slow);
        while !source.script.lock().unwrap().is_empty() {
            sleep(Duration::from_millis(1)).await;
        }
        let second = watcher.start_watch(8, slow);
        assert!(first.outcome().await.unwrap_err().is_cancelled());

        // The first loop's Accepted answer was in flight when it got replaced.
        sleep(Duration::from_millis(100)).await;
        let handle = second.handle();
        assert_eq!(handle.status, Some(Verdict::Judging));
        assert_eq!(handle.attempts, 1);
        assert_eq!(source.calls(), 2);

        let starters: Vec<_> = (0..8)
            .map(|_| {
                let watcher = Arc::clone(&watcher);
                tokio::spawn(async move { watcher.start_watch(9, slow) })
            })
            .collect();
        let mut watches = Vec::new();
        for starter in starters {
            watches.push(starter.await.unwrap());
        }
        assert_eq!(watcher.active_count(), 2);

        let mut unsettled = 0;
        for watch in watches {
            match tokio::time::timeout(Duration::from_millis(50), watch.outcome()).await {
                Ok(outcome) => assert!(outcome.unwrap_err().is_cancelled()),
                Err(_) => unsettled += 1,
            }
        }
        assert_eq!(unsettled, 1);

        watcher.cancel_watch(8);
        watcher.teardown();
        assert_eq!(watcher.active_count(), 0);
        assert!(second.outcome().await.unwrap_err().is_cancelled());

        sleep(Duration::from_millis(20)).await;
        let calls = source.calls();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls(), calls);
    }

    /// Odd ids compile-fail at once, even ids stay in judging
    struct ParitySource {
        calls: AtomicU32,
    }

    #[async_trait]
    impl StatusSource for ParitySource {
        async fn fetch_status(
            &self,
            submission_id: SubmissionId,
        ) -> std::result::Result<Verdict, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if submission_id % 2 == 1 {
                Ok(Verdict::CompileError)
            } else {
                Ok(Verdict::Judging)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_ids_poll_independently() {
        let source = Arc::new(ParitySource {
            calls: AtomicU32::new(0),
        });
        let watcher = SubmissionWatcher::new(Arc::clone(&source) as Arc<dyn StatusSource>);

        let odd = watcher.start_watch(1, config(60));
        let even = watcher.start_watch(2, config(2));

        assert_eq!(odd.outcome().await.unwrap(), Verdict::CompileError);
        assert!(even.outcome().await.unwrap_err().is_timeout());
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(watcher.active_count(), 0);
    }
}
