mod config;
mod consts;
mod environment;
mod events;
mod grader;
mod job;
mod poller;
mod runtime;
mod submission;
mod submitter;

use crate::config::{get_config_path, Config};
use crate::environment::Environment;
use crate::events::{EventKind, TerminalOutcome};
use crate::grader::GraderClient;
use crate::job::JobPhase;
use crate::poller::PollerSettings;
use crate::runtime::JobRunner;
use crate::submission::{Artifact, Submission};
use crate::submitter::SubmitOutcome;
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit an exam for grading and follow progress until it completes.
    Submit {
        /// Path to the student's answer sheet (PDF or image scan).
        #[arg(long, value_name = "FILE")]
        student: PathBuf,

        /// Path to the model answer file.
        #[arg(long = "model", value_name = "FILE")]
        model: PathBuf,

        /// Optional path to the question paper.
        #[arg(long, value_name = "FILE")]
        question: Option<PathBuf>,

        /// Environment to submit to.
        #[arg(long, value_enum)]
        env: Option<Environment>,

        /// Period between status queries, in milliseconds.
        #[arg(long, value_name = "MILLIS")]
        poll_interval: Option<u64>,

        /// Consecutive failed status queries tolerated before giving up.
        #[arg(long, value_name = "COUNT")]
        max_poll_failures: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Submit {
            student,
            model,
            question,
            env,
            poll_interval,
            max_poll_failures,
        } => {
            run_submit(
                &student,
                &model,
                question.as_deref(),
                env,
                poll_interval,
                max_poll_failures,
            )
            .await
        }
    }
}

async fn run_submit(
    student: &Path,
    model: &Path,
    question: Option<&Path>,
    env: Option<Environment>,
    poll_interval: Option<u64>,
    max_poll_failures: Option<u32>,
) -> ExitCode {
    let config = load_config();
    let environment = env
        .or_else(|| config.environment.parse().ok())
        .unwrap_or_default();
    let settings = PollerSettings {
        interval: Duration::from_millis(poll_interval.unwrap_or(config.poll_interval_ms)),
        max_consecutive_transport_failures: max_poll_failures
            .unwrap_or(config.max_consecutive_poll_failures),
    };

    let submission = match read_submission(student, model, question).await {
        Ok(submission) => submission,
        Err(e) => {
            eprintln!("could not read input files: {}", e);
            return ExitCode::from(2);
        }
    };

    info!("submitting to {} ({})", environment, environment.grader_url());
    let grader = Arc::new(GraderClient::new(environment.grader_url()));
    let (mut runner, mut events) = JobRunner::new(grader, settings);

    match runner.submit(submission).await {
        Err(validation) => {
            eprintln!("invalid submission: {}", validation);
            ExitCode::from(2)
        }
        Ok(SubmitOutcome::Rejected(reason)) => {
            // The terminal event is already in the channel; the reason says
            // it all for a CLI user.
            eprintln!("submission rejected: {}", reason);
            ExitCode::from(1)
        }
        Ok(SubmitOutcome::Accepted) => {
            println!("submission accepted, grading in progress...");
            follow_events(&mut events).await
        }
    }
}

/// Prints progress as it arrives and resolves the exit code from the single
/// terminal event.
async fn follow_events(events: &mut tokio::sync::mpsc::Receiver<crate::events::Event>) -> ExitCode {
    while let Some(event) = events.recv().await {
        match &event.kind {
            EventKind::Status => println!("{}", event.msg),
            EventKind::PhaseChange(phase) => {
                debug!("phase: {:?} ({})", phase, event.msg);
                if *phase == JobPhase::Done {
                    println!("{}", event.msg);
                }
            }
            EventKind::Terminal(TerminalOutcome::Success) => {
                println!("grading finished; results are ready on the server");
                return ExitCode::SUCCESS;
            }
            EventKind::Terminal(TerminalOutcome::Failure(reason)) => {
                eprintln!("grading failed: {}", reason);
                return ExitCode::from(1);
            }
        }
    }
    // Channel closed without a terminal event; treat as failure.
    eprintln!("lost track of the job before it finished");
    ExitCode::from(1)
}

fn load_config() -> Config {
    match get_config_path() {
        Ok(path) if path.exists() => match Config::load_from_file(&path) {
            Ok(config) => {
                debug!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                eprintln!("warning: ignoring invalid config file: {}", e);
                Config::default()
            }
        },
        _ => Config::default(),
    }
}

async fn read_submission(
    student: &Path,
    model: &Path,
    question: Option<&Path>,
) -> std::io::Result<Submission> {
    let student_answer = Artifact::from_path(student).await?;
    let model_answer = Artifact::from_path(model).await?;
    let question_paper = match question {
        Some(path) => Some(Artifact::from_path(path).await?),
        None => None,
    };
    Ok(Submission {
        student_answer,
        model_answer,
        question_paper,
    })
}
