//! User-facing progress reporting
//!
//! Workflows never print. They report through a [`ProgressSink`]; the CLI
//! renders it to the terminal and tests record it.

use std::cell::RefCell;

/// Receives workflow progress.
pub trait ProgressSink {
    /// A numbered step is starting (`index` is 1-based).
    fn step(&self, index: usize, total: usize, description: &str);

    fn success(&self, message: &str);

    /// A failure that did not abort the workflow.
    fn warn(&self, message: &str);

    /// Detail lines, typically shown only in verbose mode.
    fn info(&self, message: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn step(&self, _index: usize, _total: usize, _description: &str) {}
    fn success(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
}

/// One recorded progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Step {
        index: usize,
        total: usize,
        description: String,
    },
    Success(String),
    Warn(String),
    Info(String),
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Step lines rendered as `[i/N] description`.
    pub fn steps(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Step {
                    index,
                    total,
                    description,
                } => Some(format!("[{index}/{total}] {description}")),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Warn(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether any success, warning or info line contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.events.borrow().iter().any(|event| match event {
            Event::Success(m) | Event::Warn(m) | Event::Info(m) => m.contains(needle),
            Event::Step { description, .. } => description.contains(needle),
        })
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl ProgressSink for RecordingSink {
    fn step(&self, index: usize, total: usize, description: &str) {
        self.push(Event::Step {
            index,
            total,
            description: description.to_string(),
        });
    }

    fn success(&self, message: &str) {
        self.push(Event::Success(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.push(Event::Warn(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(Event::Info(message.to_string()));
    }
}
