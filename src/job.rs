//! The single unit of grading work tracked by the client.

use std::time::{Duration, Instant};

/// Lifecycle phase of a grading job. Phases only ever move forward:
/// `Idle → Submitting → Processing → {Done | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Submitting,
    Processing,
    Done,
    Failed,
}

impl JobPhase {
    /// Position in the forward-only phase order. `Done` and `Failed` share a
    /// rank: neither may follow the other.
    fn rank(&self) -> u8 {
        match self {
            JobPhase::Idle => 0,
            JobPhase::Submitting => 1,
            JobPhase::Processing => 2,
            JobPhase::Done | JobPhase::Failed => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Done | JobPhase::Failed)
    }
}

/// Client-side record of one grading job. Created when the user triggers a
/// submission, reset to `Idle` when a new submission begins.
#[derive(Debug)]
pub struct Job {
    pub phase: JobPhase,
    /// Instant of submission. `None` until the first submission.
    pub started_at: Option<Instant>,
    /// Most recent human-readable status text from the server.
    pub last_message: Option<String>,
    /// Progress counters; the server may omit them.
    pub last_step: Option<u32>,
    pub total_steps: Option<u32>,
}

impl Job {
    pub fn new() -> Self {
        Job {
            phase: JobPhase::Idle,
            started_at: None,
            last_message: None,
            last_step: None,
            total_steps: None,
        }
    }

    /// Moves the job to `next` if that is a forward transition. Returns
    /// whether the transition was applied; a terminal phase can be entered
    /// at most once and nothing follows it.
    pub fn advance(&mut self, next: JobPhase) -> bool {
        if next.rank() > self.phase.rank() {
            self.phase = next;
            true
        } else {
            false
        }
    }

    /// Records a processing update. Does not change the phase.
    pub fn record_progress(
        &mut self,
        step: Option<u32>,
        total_steps: Option<u32>,
        message: Option<String>,
    ) {
        if step.is_some() {
            self.last_step = step;
        }
        if total_steps.is_some() {
            self.total_steps = total_steps;
        }
        if message.is_some() {
            self.last_message = message;
        }
    }

    /// Wall-clock time since submission. Display-only; never gates a
    /// transition.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    /// Discards the previous job so a new submission can begin.
    pub fn reset(&mut self) {
        *self = Job::new();
    }
}

impl Default for Job {
    fn default() -> Self {
        Job::new()
    }
}

/// Renders elapsed time the way the progress line shows it: `"2m 5s"`, or
/// `"41s"` under a minute.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let mins = secs / 60;
    if mins > 0 {
        format!("{}m {}s", mins, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_only_move_forward() {
        let mut job = Job::new();
        assert!(job.advance(JobPhase::Submitting));
        assert!(job.advance(JobPhase::Processing));
        assert!(!job.advance(JobPhase::Submitting));
        assert!(!job.advance(JobPhase::Idle));
        assert_eq!(job.phase, JobPhase::Processing);
    }

    #[test]
    fn terminal_phase_is_entered_at_most_once() {
        let mut job = Job::new();
        job.advance(JobPhase::Submitting);
        job.advance(JobPhase::Processing);
        assert!(job.advance(JobPhase::Done));
        assert!(!job.advance(JobPhase::Failed));
        assert!(!job.advance(JobPhase::Done));
        assert_eq!(job.phase, JobPhase::Done);
    }

    #[test]
    fn failure_can_skip_processing() {
        // A rejected submission goes Submitting → Failed directly.
        let mut job = Job::new();
        job.advance(JobPhase::Submitting);
        assert!(job.advance(JobPhase::Failed));
        assert!(job.phase.is_terminal());
    }

    #[test]
    fn progress_updates_keep_previous_values_when_omitted() {
        let mut job = Job::new();
        job.record_progress(Some(1), Some(3), Some("OCR".to_string()));
        job.record_progress(Some(2), None, None);
        assert_eq!(job.last_step, Some(2));
        assert_eq!(job.total_steps, Some(3));
        assert_eq!(job.last_message.as_deref(), Some("OCR"));
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::from_secs(41)), "41s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_elapsed(Duration::from_secs(60)), "1m 0s");
    }
}
