//! Interactive prompts.
//!
//! All interactive questions zigup asks go through the [`Prompter`] trait so
//! commands stay testable: production code uses [`StdPrompter`] over
//! stdin/stderr, tests inject a [`ScriptedPrompter`] with canned answers.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// A source of answers to interactive questions.
pub trait Prompter {
    /// Ask a yes/no question.
    ///
    /// `default` is returned on an empty answer; `None` means the question
    /// has no default and is re-asked until the user answers explicitly.
    fn confirm(&mut self, question: &str, default: Option<bool>) -> io::Result<bool>;

    /// Ask for a free-form line of input.
    fn line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Prompter reading answers from stdin.
#[derive(Debug, Default)]
pub struct StdPrompter;

impl StdPrompter {
    pub fn new() -> Self {
        Self
    }

    fn read_line() -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl Prompter for StdPrompter {
    fn confirm(&mut self, question: &str, default: Option<bool>) -> io::Result<bool> {
        let hint = match default {
            Some(true) => "[Y/n]",
            Some(false) => "[y/N]",
            None => "[y/n]",
        };
        loop {
            eprint!("{} {} ", question, hint);
            io::stderr().flush()?;
            let answer = Self::read_line()?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                "" => {
                    if let Some(default) = default {
                        return Ok(default);
                    }
                }
                _ => {}
            }
        }
    }

    fn line(&mut self, prompt: &str) -> io::Result<String> {
        eprint!("{}: ", prompt);
        io::stderr().flush()?;
        Self::read_line()
    }
}

/// Prompter replaying canned answers, for tests.
///
/// Records every question asked so tests can assert on the dialogue.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Questions asked so far, in order.
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    /// Create a prompter that will return the given answers in order.
    ///
    /// Yes/no questions consume an answer and interpret it like stdin input
    /// would be (`y`, `n`, or empty for the default).
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

    fn next_answer(&mut self) -> io::Result<String> {
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "scripted prompter ran out of answers",
            )
        })
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str, default: Option<bool>) -> io::Result<bool> {
        self.asked.push(question.to_string());
        loop {
            let answer = self.next_answer()?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                "" => {
                    if let Some(default) = default {
                        return Ok(default);
                    }
                }
                _ => {}
            }
        }
    }

    fn line(&mut self, prompt: &str) -> io::Result<String> {
        self.asked.push(prompt.to_string());
        self.next_answer()
    }
}
