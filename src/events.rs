//! Presentation events emitted by the submitter and poller.
//!
//! The UI layer consumes these from an mpsc channel; it never reads the
//! `Job` record directly.

use crate::job::JobPhase;
use std::fmt::{Display, Formatter};

/// Which component produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Submitter,
    Poller,
}

/// Final outcome of a job. Delivered exactly once per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOutcome {
    /// Grading finished; the caller should fetch the results view.
    Success,
    /// Grading failed with a human-readable reason.
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// The job entered a new phase.
    PhaseChange(JobPhase),
    /// Informational progress update; no phase change.
    Status,
    /// The job reached its terminal outcome.
    Terminal(TerminalOutcome),
}

#[derive(Debug, Clone)]
pub struct Event {
    pub origin: Origin,
    pub kind: EventKind,
    pub msg: String,
    pub timestamp: String,
}

impl Event {
    pub fn submitter(msg: String, kind: EventKind) -> Self {
        Self::new(Origin::Submitter, msg, kind)
    }

    pub fn poller(msg: String, kind: EventKind) -> Self {
        Self::new(Origin::Poller, msg, kind)
    }

    fn new(origin: Origin, msg: String, kind: EventKind) -> Self {
        Event {
            origin,
            kind,
            msg,
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }

    /// The terminal outcome, if this is a terminal event.
    pub fn terminal(&self) -> Option<&TerminalOutcome> {
        match &self.kind {
            EventKind::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let origin = match self.origin {
            Origin::Submitter => "submitter",
            Origin::Poller => "poller",
        };
        write!(f, "[{}] {}: {}", self.timestamp, origin, self.msg)
    }
}
