//! The operator-facing input source. Reconciliation and the article file
//! picker talk to a [`Prompter`] so they can run against a live terminal
//! ([`TerminalPrompter`]) or a fixed list of answers ([`ScriptedPrompter`]).

use std::collections::VecDeque;
use std::fmt;

/// Asks the operator questions.
pub trait Prompter {
    /// Shows an informational message.
    fn say(&mut self, message: &str);

    /// Free text input. An empty answer is allowed.
    fn input(&mut self, message: &str) -> Result<String>;

    /// A yes/no question.
    fn confirm(&mut self, message: &str) -> Result<bool>;

    /// Picks one of `items`, returning its index.
    fn select(&mut self, message: &str, items: &[String]) -> Result<usize>;

    /// Picks any number of `items`. `defaults` has one flag per item.
    fn checklist(&mut self, message: &str, items: &[String], defaults: &[bool])
        -> Result<Vec<usize>>;
}

/// Prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn say(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn input(&mut self, message: &str) -> Result<String> {
        Ok(dialoguer::Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()?)
    }

    fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(dialoguer::Confirm::new()
            .with_prompt(message)
            .default(true)
            .interact()?)
    }

    fn select(&mut self, message: &str, items: &[String]) -> Result<usize> {
        Ok(dialoguer::Select::new()
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()?)
    }

    fn checklist(
        &mut self,
        message: &str,
        items: &[String],
        defaults: &[bool],
    ) -> Result<Vec<usize>> {
        Ok(dialoguer::MultiSelect::new()
            .with_prompt(message)
            .items(items)
            .defaults(defaults)
            .interact()?)
    }
}

/// One pre-seeded answer for a [`ScriptedPrompter`].
#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Select(usize),
    Checklist(Vec<usize>),
}

impl Answer {
    pub fn text(s: &str) -> Answer {
        Answer::Text(s.to_owned())
    }
}

/// Replays a fixed sequence of answers and records every question asked.
/// Running out of answers, or getting an answer of the wrong kind, is an
/// error rather than a hang.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,

    /// Every message shown or question asked, in order.
    pub transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I: IntoIterator<Item = Answer>>(answers: I) -> ScriptedPrompter {
        ScriptedPrompter {
            answers: answers.into_iter().collect(),
            transcript: Vec::new(),
        }
    }

    /// The answers that were never asked for.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<Answer> {
        self.transcript.push(message.to_owned());
        self.answers.pop_front().ok_or_else(|| Error::Exhausted {
            question: message.to_owned(),
        })
    }
}

fn unexpected(question: &str, expected: &'static str, got: Answer) -> Error {
    Error::Unexpected {
        question: question.to_owned(),
        expected,
        got,
    }
}

impl Prompter for ScriptedPrompter {
    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_owned());
    }

    fn input(&mut self, message: &str) -> Result<String> {
        match self.next(message)? {
            Answer::Text(s) => Ok(s),
            other => Err(unexpected(message, "text", other)),
        }
    }

    fn confirm(&mut self, message: &str) -> Result<bool> {
        match self.next(message)? {
            Answer::Confirm(b) => Ok(b),
            other => Err(unexpected(message, "confirm", other)),
        }
    }

    fn select(&mut self, message: &str, items: &[String]) -> Result<usize> {
        match self.next(message)? {
            Answer::Select(i) if i < items.len() => Ok(i),
            other => Err(unexpected(message, "select within range", other)),
        }
    }

    fn checklist(
        &mut self,
        message: &str,
        items: &[String],
        _defaults: &[bool],
    ) -> Result<Vec<usize>> {
        match self.next(message)? {
            Answer::Checklist(picked) if picked.iter().all(|&i| i < items.len()) => Ok(picked),
            other => Err(unexpected(message, "checklist within range", other)),
        }
    }
}

/// The result of a prompt.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to get an answer from the operator.
#[derive(Debug)]
pub enum Error {
    /// Returned when the terminal can't be driven.
    Terminal(dialoguer::Error),

    /// Returned when a [`ScriptedPrompter`] has no answers left.
    Exhausted { question: String },

    /// Returned when a [`ScriptedPrompter`] answer doesn't fit the question.
    Unexpected {
        question: String,
        expected: &'static str,
        got: Answer,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Terminal(err) => write!(f, "Prompting on the terminal: {}", err),
            Error::Exhausted { question } => {
                write!(f, "No scripted answer left for {:?}", question)
            }
            Error::Unexpected {
                question,
                expected,
                got,
            } => write!(
                f,
                "Scripted answer {:?} doesn't fit {:?} (expected {})",
                got, question, expected
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Terminal(err) => Some(err),
            Error::Exhausted { .. } => None,
            Error::Unexpected { .. } => None,
        }
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Error {
        Error::Terminal(err)
    }
}
