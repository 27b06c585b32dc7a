//! Job Runtime
//!
//! Owns the `Job` record, the event channel, and the single `PollHandle`
//! slot. Serializes the submitter and poller: polling starts strictly after
//! the submission response classifies as accepted, and a rejection that
//! surfaces while a poll loop is live cancels that loop before delivering
//! its own terminal signal.

use crate::consts::poller::EVENT_QUEUE_SIZE;
use crate::events::{Event, EventKind, TerminalOutcome};
use crate::grader::Grader;
use crate::job::{Job, JobPhase};
use crate::poller::{self, PollHandle, PollerSettings};
use crate::submission::{Submission, ValidationError};
use crate::submitter::{self, SubmitOutcome};
use log::info;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::mpsc;

pub struct JobRunner {
    grader: Arc<dyn Grader>,
    job: Arc<Mutex<Job>>,
    event_sender: mpsc::Sender<Event>,
    poll: Option<PollHandle>,
    settings: PollerSettings,
}

impl JobRunner {
    /// Creates a runner and the event stream the presentation layer reads.
    pub fn new(
        grader: Arc<dyn Grader>,
        settings: PollerSettings,
    ) -> (Self, mpsc::Receiver<Event>) {
        let (event_sender, event_receiver) = mpsc::channel(EVENT_QUEUE_SIZE);
        let runner = JobRunner {
            grader,
            job: Arc::new(Mutex::new(Job::new())),
            event_sender,
            poll: None,
            settings,
        };
        (runner, event_receiver)
    }

    /// Submits the artifacts and, on acceptance, starts the poll loop.
    ///
    /// Validation failures return `Err` before any network call. Otherwise
    /// the result is exactly one of `Accepted` or `Rejected`; a rejection
    /// has already moved the job to `Failed` and delivered the terminal
    /// event by the time this returns.
    pub async fn submit(&mut self, submission: Submission) -> Result<SubmitOutcome, ValidationError> {
        submission.validate()?;

        {
            let mut job = self.job.lock().unwrap();
            if job.phase.is_terminal() {
                job.reset();
            }
            job.advance(JobPhase::Submitting);
            job.started_at = Some(Instant::now());
        }
        self.emit_phase(JobPhase::Submitting, "uploading files".to_string())
            .await;

        match submitter::submit_once(self.grader.as_ref(), &submission).await {
            SubmitOutcome::Accepted => {
                self.job.lock().unwrap().advance(JobPhase::Processing);
                self.emit_phase(JobPhase::Processing, "processing has begun".to_string())
                    .await;
                self.start_polling();
                Ok(SubmitOutcome::Accepted)
            }
            SubmitOutcome::Rejected(reason) => {
                self.fail(reason.clone()).await;
                Ok(SubmitOutcome::Rejected(reason))
            }
        }
    }

    /// Snapshot of the job record, for callers that want more than events.
    pub fn job(&self) -> Arc<Mutex<Job>> {
        self.job.clone()
    }

    /// True while a poll loop is running for the current job.
    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().map(PollHandle::is_live).unwrap_or(false)
    }

    /// Hands control to the progress poller. Only reachable once the
    /// submission classified as accepted; a second live loop for the same
    /// job is a programming error, not a runtime condition.
    fn start_polling(&mut self) {
        if let Some(handle) = &self.poll {
            assert!(!handle.is_live(), "poll loop already running for this job");
        }
        info!("starting progress polling");
        self.poll = Some(poller::start_polling(
            self.grader.clone(),
            self.job.clone(),
            self.event_sender.clone(),
            self.settings.clone(),
        ));
    }

    /// Resolves the job as failed with `reason`, cancelling any live poll
    /// loop first so only this failure's terminal signal is delivered.
    async fn fail(&mut self, reason: String) {
        if let Some(handle) = self.poll.take() {
            handle.cancel();
        }
        {
            let mut job = self.job.lock().unwrap();
            job.advance(JobPhase::Failed);
            job.last_message = Some(reason.clone());
        }
        self.emit_phase(JobPhase::Failed, reason.clone()).await;
        let _ = self
            .event_sender
            .send(Event::submitter(
                reason.clone(),
                EventKind::Terminal(TerminalOutcome::Failure(reason)),
            ))
            .await;
    }

    async fn emit_phase(&self, phase: JobPhase, msg: String) {
        let _ = self
            .event_sender
            .send(Event::submitter(msg, EventKind::PhaseChange(phase)))
            .await;
    }
}
