//! Prompt port - operator confirmation before each batch

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Answers accepted as "go ahead", compared case-insensitively
pub const AFFIRMATIVE: &[&str] = &[
    "true", "1", "t", "y", "yes", "yeah", "yup", "certainly", "uh-huh",
];

/// Check an operator answer against [`AFFIRMATIVE`]
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

/// What the operator is asked to confirm
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmRequest {
    /// 1-based batch number
    pub batch: usize,
    pub batches: usize,
    /// Number of keys in the batch
    pub keys: usize,
    pub dry_run: bool,
    /// How long to wait for an answer; `None` waits forever
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

/// Raw outcome of a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A line of input, unparsed
    Text(String),
    /// No answer before the timeout
    TimedOut,
    /// Input closed or unreadable
    Closed,
}

/// Prompt asks the operator about one batch
#[async_trait]
pub trait Prompt: Send + Sync {
    async fn ask(&self, request: &ConfirmRequest) -> Answer;
}

/// Prompt replaying canned answers, for tests and scripted runs
///
/// Once the script runs out every further question gets [`Answer::Closed`].
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<ConfirmRequest>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Script of plain text answers
    pub fn replying<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self::new(answers.into_iter().map(|a| Answer::Text(a.into())))
    }

    /// Every request seen so far
    pub fn asked(&self) -> Vec<ConfirmRequest> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn ask(&self, request: &ConfirmRequest) -> Answer {
        self.asked.lock().push(request.clone());
        self.answers.lock().pop_front().unwrap_or(Answer::Closed)
    }
}
