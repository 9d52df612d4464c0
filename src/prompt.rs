//! Operator prompts

use inquire::{Confirm, CustomType, InquireError, Text};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{PurgeError, Result};

/// Source of the operator's answers during a run
pub trait Prompter: Send + Sync {
    /// Free-form text, trimmed
    fn ask_text(&self, message: &str) -> Result<String>;

    /// A non-negative whole number
    fn ask_count(&self, message: &str) -> Result<usize>;

    /// Yes/no; `false` means the operator declined
    fn ask_confirm(&self, message: &str) -> Result<bool>;
}

/// Interactive prompts on the terminal via `inquire`
///
/// Esc or Ctrl-C at any prompt surfaces as [`PurgeError::OperationCancelled`].
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

fn map_inquire_error(error: InquireError) -> PurgeError {
    match error {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            PurgeError::OperationCancelled("prompt dismissed".to_string())
        }
        InquireError::IO(err) => PurgeError::IoError(err),
        other => PurgeError::PromptError(other.to_string()),
    }
}

impl Prompter for TerminalPrompter {
    fn ask_text(&self, message: &str) -> Result<String> {
        Text::new(message)
            .prompt()
            .map(|answer| answer.trim().to_string())
            .map_err(map_inquire_error)
    }

    fn ask_count(&self, message: &str) -> Result<usize> {
        CustomType::<usize>::new(message)
            .with_error_message("Please enter a non-negative whole number")
            .prompt()
            .map_err(map_inquire_error)
    }

    fn ask_confirm(&self, message: &str) -> Result<bool> {
        Confirm::new(message)
            .with_default(false)
            .prompt()
            .map_err(map_inquire_error)
    }
}

/// Answers fed from a fixed script, for driving a run without a terminal
///
/// Each prompt consumes the next answer in order. Prompts asked are recorded
/// so callers can check what the operator would have seen.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Prompts asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }

    /// Answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or_default()
    }

    fn next_answer(&self, message: &str) -> Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        self.answers
            .lock()
            .map_err(|_| PurgeError::PromptError("answer script poisoned".to_string()))?
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or_else(|| PurgeError::PromptError(format!("no scripted answer for {:?}", message)))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_text(&self, message: &str) -> Result<String> {
        self.next_answer(message)
    }

    fn ask_count(&self, message: &str) -> Result<usize> {
        let answer = self.next_answer(message)?;
        answer
            .parse()
            .map_err(|_| PurgeError::PromptError(format!("{:?} is not a whole number", answer)))
    }

    fn ask_confirm(&self, message: &str) -> Result<bool> {
        let answer = self.next_answer(message)?;
        match answer.to_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" | "" => Ok(false),
            other => Err(PurgeError::PromptError(format!(
                "{:?} is not a yes/no answer",
                other
            ))),
        }
    }
}
