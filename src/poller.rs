//! Progress Poller
//!
//! Once a submission is accepted, a poll task queries the status endpoint on
//! a fixed period and translates each `ServerStatus` into job state and
//! presentation events. The task owns its own termination: it stops itself
//! exactly once when a terminal status is observed, and a cancelled handle
//! guarantees no further queries and no late mutation of the job record.

use crate::consts::poller::{MAX_CONSECUTIVE_TRANSPORT_FAILURES, POLL_INTERVAL_MS};
use crate::events::{Event, EventKind, TerminalOutcome};
use crate::grader::{Grader, ServerStatus};
use crate::job::{format_elapsed, Job, JobPhase};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Tunables for the poll loop. The cadence is a constant of convenience, not
/// a correctness property.
#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub interval: Duration,
    /// Consecutive failed status queries tolerated before the loop gives up
    /// and fails the job.
    pub max_consecutive_transport_failures: u32,
}

impl Default for PollerSettings {
    fn default() -> Self {
        PollerSettings {
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            max_consecutive_transport_failures: MAX_CONSECUTIVE_TRANSPORT_FAILURES,
        }
    }
}

/// Cancellable handle to the recurring poll task. At most one live handle
/// exists per job.
///
/// The liveness flag doubles as the terminal-delivery claim: whoever swaps
/// it to `false` first (the loop on a terminal status, or a canceller) is
/// the only party allowed to surface a terminal signal, so a straggling
/// response from a cancelled loop can never fire a second one.
#[derive(Debug)]
pub struct PollHandle {
    live: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stops the poll loop. Idempotent: cancelling an already-cancelled
    /// handle is a no-op. No queries are issued after this returns, and an
    /// in-flight response is discarded without touching the job.
    pub fn cancel(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Waits for the poll task to finish. Test and shutdown convenience.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

/// Spawns the poll loop for an accepted job.
///
/// Callers must only invoke this after the submission response classified as
/// accepted; the runner enforces that gating.
pub fn start_polling(
    grader: Arc<dyn Grader>,
    job: Arc<Mutex<Job>>,
    event_sender: mpsc::Sender<Event>,
    settings: PollerSettings,
) -> PollHandle {
    let live = Arc::new(AtomicBool::new(true));
    let flag = live.clone();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(settings.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately; consume
        // it so the first query lands one full period after acceptance.
        interval.tick().await;

        let mut consecutive_failures: u32 = 0;

        loop {
            interval.tick().await;
            if !flag.load(Ordering::SeqCst) {
                break;
            }

            let result = grader.progress().await;

            // The handle may have been cancelled while the query was in
            // flight; a straggling response must not mutate the job.
            if !flag.load(Ordering::SeqCst) {
                break;
            }

            match result {
                Ok(ServerStatus::Processing {
                    step,
                    total_steps,
                    message,
                }) => {
                    consecutive_failures = 0;
                    let line = {
                        let mut job = job.lock().unwrap();
                        job.record_progress(step, total_steps, message);
                        progress_line(&job)
                    };
                    debug!("{}", line);
                    let _ = event_sender.send(Event::poller(line, EventKind::Status)).await;
                }
                Ok(ServerStatus::Done) => {
                    if claim_terminal(&flag) {
                        job.lock().unwrap().advance(JobPhase::Done);
                        let _ = event_sender
                            .send(Event::poller(
                                "grading complete".to_string(),
                                EventKind::PhaseChange(JobPhase::Done),
                            ))
                            .await;
                        let _ = event_sender
                            .send(Event::poller(
                                "grading complete, loading results".to_string(),
                                EventKind::Terminal(TerminalOutcome::Success),
                            ))
                            .await;
                    }
                    break;
                }
                Ok(ServerStatus::Error { message }) => {
                    if claim_terminal(&flag) {
                        let reason =
                            message.unwrap_or_else(|| "grading failed on the server".to_string());
                        fail_job(&job, &event_sender, reason).await;
                    }
                    break;
                }
                Ok(ServerStatus::Queued) | Ok(ServerStatus::Unknown) => {
                    // Nothing to apply; the next tick will know more.
                    consecutive_failures = 0;
                    debug!("status not actionable yet, continuing to poll");
                }
                Err(e) => {
                    // A single flaky poll is never surfaced; the next tick
                    // will likely succeed.
                    consecutive_failures += 1;
                    debug!(
                        "status query failed ({}/{}): {}",
                        consecutive_failures, settings.max_consecutive_transport_failures, e
                    );
                    if consecutive_failures >= settings.max_consecutive_transport_failures {
                        warn!(
                            "giving up after {} consecutive failed status queries",
                            consecutive_failures
                        );
                        if claim_terminal(&flag) {
                            fail_job(
                                &job,
                                &event_sender,
                                "lost contact with the grading server".to_string(),
                            )
                            .await;
                        }
                        break;
                    }
                }
            }
        }
    });

    PollHandle { live, task }
}

/// Atomically takes the right to deliver the terminal signal. Returns false
/// if the handle was already cancelled or the terminal already claimed.
fn claim_terminal(live: &AtomicBool) -> bool {
    live.swap(false, Ordering::SeqCst)
}

async fn fail_job(job: &Arc<Mutex<Job>>, event_sender: &mpsc::Sender<Event>, reason: String) {
    {
        let mut job = job.lock().unwrap();
        job.advance(JobPhase::Failed);
        job.last_message = Some(reason.clone());
    }
    let _ = event_sender
        .send(Event::poller(
            reason.clone(),
            EventKind::PhaseChange(JobPhase::Failed),
        ))
        .await;
    let _ = event_sender
        .send(Event::poller(
            reason.clone(),
            EventKind::Terminal(TerminalOutcome::Failure(reason)),
        ))
        .await;
}

/// The user-facing progress line, mirroring what the status overlay shows:
/// `Step 2/3: Scoring answers (1m 12s)`. Elapsed time is display-only.
fn progress_line(job: &Job) -> String {
    let elapsed = job
        .elapsed()
        .map(format_elapsed)
        .unwrap_or_else(|| "0s".to_string());
    match (job.last_step, job.total_steps, job.last_message.as_deref()) {
        (Some(step), Some(total), Some(msg)) => {
            format!("Step {}/{}: {} ({})", step, total, msg, elapsed)
        }
        (_, _, Some(msg)) => format!("{} ({})", msg, elapsed),
        _ => format!("processing ({})", elapsed),
    }
}
