//! Step pipeline
//!
//! A workflow is an ordered list of named [`Step`]s. The [`Pipeline`]
//! numbers them through a [`ProgressSink`], applies each step's failure
//! policy and fallback, and wraps fatal failures in [`Error::StepFailed`]
//! so every abort names the step that caused it.

use std::fmt;

use crate::progress::ProgressSink;
use crate::{Error, Result};

/// What happens when a step (and its fallback, if any) fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Abort the workflow.
    Fatal,
    /// Report a warning and continue with the next step.
    Warn,
}

/// Returned by a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The workflow is complete; remaining steps are skipped.
    Finish,
}

type Action<'a> = Box<dyn FnMut(&mut WorkflowReport) -> Result<Flow> + 'a>;
type Fallback<'a> = Box<dyn FnMut(&mut WorkflowReport, &Error) -> Result<()> + 'a>;

/// One named unit of work.
pub struct Step<'a> {
    description: String,
    on_failure: OnFailure,
    action: Action<'a>,
    fallback: Option<Fallback<'a>>,
}

impl<'a> Step<'a> {
    pub fn new(
        description: impl Into<String>,
        on_failure: OnFailure,
        action: impl FnMut(&mut WorkflowReport) -> Result<Flow> + 'a,
    ) -> Self {
        Self {
            description: description.into(),
            on_failure,
            action: Box::new(action),
            fallback: None,
        }
    }

    pub fn fatal(
        description: impl Into<String>,
        action: impl FnMut(&mut WorkflowReport) -> Result<Flow> + 'a,
    ) -> Self {
        Self::new(description, OnFailure::Fatal, action)
    }

    pub fn warn(
        description: impl Into<String>,
        action: impl FnMut(&mut WorkflowReport) -> Result<Flow> + 'a,
    ) -> Self {
        Self::new(description, OnFailure::Warn, action)
    }

    /// Run `fallback` with the original error when the action fails. If the
    /// fallback succeeds the step counts as recovered.
    pub fn with_fallback(
        mut self,
        fallback: impl FnMut(&mut WorkflowReport, &Error) -> Result<()> + 'a,
    ) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn on_failure(&self) -> OnFailure {
        self.on_failure
    }
}

impl fmt::Debug for Step<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("description", &self.description)
            .field("on_failure", &self.on_failure)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// How a step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Failed under [`OnFailure::Warn`]; carries the failure message.
    Warned(String),
    /// The action failed and the fallback succeeded.
    Recovered(String),
    /// Not run because an earlier step finished the workflow.
    Skipped,
    /// Dry run: reported but not executed.
    Planned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub description: String,
    pub outcome: StepOutcome,
}

/// What a workflow did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowReport {
    pub workflow: &'static str,
    pub dry_run: bool,
    pub steps: Vec<StepRecord>,
    /// Context paths transferred: staged by `init`, copied by `push` and `pull`.
    pub copied: usize,
    /// Context paths left alone (missing, or kept without `--overwrite`).
    pub skipped: usize,
    /// Context paths already linked into the worktree.
    pub linked: usize,
    /// Commit message, if a commit was made.
    pub commit: Option<String>,
    pub pushed: bool,
    /// Hints for the user.
    pub notes: Vec<String>,
}

impl WorkflowReport {
    pub fn new(workflow: &'static str, dry_run: bool) -> Self {
        Self {
            workflow,
            dry_run,
            ..Self::default()
        }
    }

    pub fn outcome(&self, description: &str) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|record| record.description == description)
            .map(|record| &record.outcome)
    }

    /// Number of steps that ended in a warning.
    pub fn warnings(&self) -> usize {
        self.steps
            .iter()
            .filter(|record| matches!(record.outcome, StepOutcome::Warned(_)))
            .count()
    }

    fn record(&mut self, description: &str, outcome: StepOutcome) {
        self.steps.push(StepRecord {
            description: description.to_string(),
            outcome,
        });
    }
}

/// An ordered list of steps for one workflow.
#[derive(Debug)]
pub struct Pipeline<'a> {
    name: &'static str,
    steps: Vec<Step<'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    pub fn then(mut self, step: Step<'a>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: Step<'a>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.steps.iter().map(Step::description).collect()
    }

    /// Execute every step in order.
    ///
    /// With `dry_run` each step is announced and recorded as
    /// [`StepOutcome::Planned`] without running its action.
    pub fn run(self, sink: &dyn ProgressSink, dry_run: bool) -> Result<WorkflowReport> {
        let Pipeline { name, steps } = self;
        let total = steps.len();
        let mut report = WorkflowReport::new(name, dry_run);
        let mut finished = false;

        tracing::info!(workflow = name, steps = total, dry_run, "Starting workflow");

        for (index, mut step) in steps.into_iter().enumerate() {
            if finished {
                report.record(&step.description, StepOutcome::Skipped);
                continue;
            }

            sink.step(index + 1, total, &step.description);
            if dry_run {
                report.record(&step.description, StepOutcome::Planned);
                continue;
            }

            tracing::debug!(workflow = name, step = %step.description, "Running step");
            let failure = match (step.action)(&mut report) {
                Ok(flow) => {
                    report.record(&step.description, StepOutcome::Done);
                    finished = flow == Flow::Finish;
                    continue;
                }
                Err(err) => err,
            };

            let failure = match step.fallback.as_mut() {
                Some(fallback) => match fallback(&mut report, &failure) {
                    Ok(()) => {
                        tracing::warn!(workflow = name, step = %step.description, error = %failure, "Step recovered by fallback");
                        sink.warn(&format!("{}: {failure} (recovered)", step.description));
                        report.record(&step.description, StepOutcome::Recovered(failure.to_string()));
                        continue;
                    }
                    Err(fallback_err) => fallback_err,
                },
                None => failure,
            };

            match step.on_failure {
                OnFailure::Warn => {
                    tracing::warn!(workflow = name, step = %step.description, error = %failure, "Step failed; continuing");
                    sink.warn(&format!("{}: {failure}", step.description));
                    report.record(&step.description, StepOutcome::Warned(failure.to_string()));
                }
                OnFailure::Fatal => {
                    tracing::debug!(workflow = name, step = %step.description, "Step failed; aborting");
                    return Err(Error::StepFailed {
                        step: step.description,
                        source: Box::new(failure),
                    });
                }
            }
        }

        tracing::info!(workflow = name, warnings = report.warnings(), "Workflow finished");
        Ok(report)
    }
}
