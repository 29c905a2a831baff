use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Source of user lines for the conversation loop.
#[async_trait]
pub trait UserInput: Send {
    /// Next line without its newline, or `None` at end of input.
    async fn next_line(&mut self) -> anyhow::Result<Option<String>>;
}

/// Reads lines from standard input, printing a prompt first.
pub struct ConsoleInput {
    lines: Lines<BufReader<Stdin>>,
    prompt: String,
}

impl ConsoleInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl UserInput for ConsoleInput {
    async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        print!("{}", self.prompt);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}

/// Replays a fixed list of lines, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl UserInput for ScriptedInput {
    async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
