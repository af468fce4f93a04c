//! Terminal confirmation prompt

use async_trait::async_trait;
use retention::{is_affirmative, Answer, ConfirmRequest, Prompt};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::Mutex;

/// Asks on one stream and reads answers line by line from another
///
/// The question goes to stderr by default so it never mixes with `--json`
/// output.
pub struct LinePrompt<R, W> {
    lines: Mutex<Lines<BufReader<R>>>,
    out: Mutex<W>,
}

pub type StdinPrompt = LinePrompt<tokio::io::Stdin, tokio::io::Stderr>;

impl StdinPrompt {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stderr())
    }
}

impl<R, W> LinePrompt<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: Mutex::new(BufReader::new(input).lines()),
            out: Mutex::new(out),
        }
    }

    async fn say(&self, text: &str) -> std::io::Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.flush().await
    }

    async fn read_answer(&self, request: &ConfirmRequest) -> Answer {
        let mut lines = self.lines.lock().await;
        let line = match request.timeout {
            Some(limit) => match tokio::time::timeout(limit, lines.next_line()).await {
                Ok(line) => line,
                Err(_) => return Answer::TimedOut,
            },
            None => lines.next_line().await,
        };

        match line {
            Ok(Some(text)) => Answer::Text(text),
            Ok(None) | Err(_) => Answer::Closed,
        }
    }
}

/// Question shown before a batch
pub fn question(request: &ConfirmRequest) -> String {
    let mode = if request.dry_run { "fake" } else { "really" };
    format!(
        "About to {mode} delete {} objects (batch {} of {}). Proceed?\n> ",
        request.keys, request.batch, request.batches
    )
}

#[async_trait]
impl<R, W> Prompt for LinePrompt<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn ask(&self, request: &ConfirmRequest) -> Answer {
        if self.say(&question(request)).await.is_err() {
            return Answer::Closed;
        }

        let answer = self.read_answer(request).await;
        let note = match &answer {
            Answer::Text(text) if is_affirmative(text) => None,
            Answer::Text(_) => Some("Batch skipped\n"),
            Answer::TimedOut => Some("\nNo answer in time, batch skipped\n"),
            Answer::Closed => Some("\nInput closed, batch skipped\n"),
        };
        if let Some(note) = note {
            let _ = self.say(note).await;
        }
        answer
    }
}
