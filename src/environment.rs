use clap::ValueEnum;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Which deployment of the grading service to talk to.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    /// Local development server.
    Local,
    /// Staging deployment for pre-production testing.
    Staging,
    /// Production deployment.
    #[default]
    Production,
}

impl Environment {
    /// Base URL of the grading service for this environment.
    pub fn grader_url(&self) -> String {
        match self {
            Environment::Local => "http://localhost:5000".to_string(),
            Environment::Staging => "https://staging.grader.exams.dev".to_string(),
            Environment::Production => "https://grader.exams.dev".to_string(),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "Local"),
            Environment::Staging => write!(f, "Staging"),
            Environment::Production => write!(f, "Production"),
        }
    }
}
