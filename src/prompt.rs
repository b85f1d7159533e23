//! Interactive input.
//!
//! All user input goes through the [`Prompter`] trait so that the workflow
//! can be driven by a real terminal or by a scripted sequence of answers.
//! Selection loops take an explicit [`RetryPolicy`].

use crate::error::{PilotError, Result};
use crate::output;
use console::{Term, style};
use std::collections::VecDeque;
use std::io::BufRead;
use tracing::debug;

/// Source of line-oriented answers to prompts.
pub trait Prompter {
    /// Show `prompt` and return the next line of input without its line ending.
    ///
    /// End of input is an error: a closed input stream can never produce a
    /// valid answer.
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// How many times an invalid selection is re-prompted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Re-prompt until a valid answer is given.
    Unbounded,
    /// Give up after this many invalid answers.
    Limited(u32),
}

impl RetryPolicy {
    fn allows(self, attempts: u32) -> bool {
        match self {
            RetryPolicy::Unbounded => true,
            RetryPolicy::Limited(limit) => attempts < limit,
        }
    }
}

/// Prompter backed by the process's stdin/stdout.
pub struct TerminalPrompter {
    term: Term,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        let io_error = |e: std::io::Error| PilotError::UserError(format!("failed to read input: {}", e));

        self.term
            .write_str(&format!("{} ", style(prompt).cyan().bold()))
            .map_err(io_error)?;
        self.term.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Err(input_closed());
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Prompter that replays a fixed list of answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(input_closed)
    }
}

fn input_closed() -> PilotError {
    PilotError::UserError("input closed before a valid answer was given".to_string())
}

/// Ask for a free-form line, trimmed of surrounding whitespace.
pub fn ask_line(prompter: &mut dyn Prompter, prompt: &str) -> Result<String> {
    Ok(prompter.ask(prompt)?.trim().to_string())
}

/// Ask for a 1-based choice among `count` numbered options.
///
/// Blank, non-numeric and out-of-range answers re-prompt as long as the
/// retry policy allows. Returns the zero-based index of the choice.
pub fn select_index(
    prompter: &mut dyn Prompter,
    prompt: &str,
    count: usize,
    policy: RetryPolicy,
) -> Result<usize> {
    let mut attempts = 0u32;

    loop {
        let answer = ask_line(prompter, prompt)?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(n - 1),
            _ => {
                attempts += 1;
                debug!(answer = %answer, attempts, "invalid selection");
                if !policy.allows(attempts) {
                    return Err(PilotError::UserError(format!(
                        "no valid selection after {} attempts",
                        attempts
                    )));
                }
                output::print_warning(&format!(
                    "Invalid selection '{}'. Enter a number between 1 and {}.",
                    answer, count
                ));
            }
        }
    }
}

/// Ask a yes/no question. Only `y` or `yes` (any case) counts as yes.
pub fn confirm(prompter: &mut dyn Prompter, question: &str) -> Result<bool> {
    let answer = ask_line(prompter, &format!("{} (y/n):", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}
