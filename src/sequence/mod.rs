//! Ordered lifecycle sequences.
//!
//! A sequence is an explicit list of named steps executed by a single
//! driver, in order, each gated on the success of the previous one. Steps
//! communicate exclusively through the sequence's [`TestState`]: every field
//! has one writer step and one or more reader steps later in the order, and
//! reading a field before its writer ran fails loudly with
//! [`HarnessError::PreconditionMissing`] instead of falling back to a
//! default.

mod category;
mod recipe;

pub use category::category_lifecycle;
pub use recipe::recipe_lifecycle;

use crate::auth::Session;
use crate::error::HarnessError;
use crate::fixtures::RunFixture;
use std::future::Future;
use std::pin::Pin;
use tracing::{error, info};

/// Mutable state threaded through one sequence.
#[derive(Debug, Default)]
pub struct TestState {
    first_category_id: Option<String>,
    created_recipe_id: Option<String>,
    created_recipe_title: Option<String>,
    created_category_id: Option<String>,
    created_category_name: Option<String>,
    updated_category_id: Option<String>,
    updated_category_name: Option<String>,
}

impl TestState {
    pub fn set_first_category_id(&mut self, id: String) {
        self.first_category_id = Some(id);
    }

    pub fn first_category_id(&self) -> Result<&str, HarnessError> {
        self.first_category_id
            .as_deref()
            .ok_or(HarnessError::PreconditionMissing("first_category_id"))
    }

    pub fn set_created_recipe_id(&mut self, id: String) {
        self.created_recipe_id = Some(id);
    }

    pub fn created_recipe_id(&self) -> Result<&str, HarnessError> {
        self.created_recipe_id
            .as_deref()
            .ok_or(HarnessError::PreconditionMissing("created_recipe_id"))
    }

    /// Last-known recipe title: written by the create step, overwritten by
    /// the update step so the delete-response check sees the latest value.
    pub fn set_created_recipe_title(&mut self, title: String) {
        self.created_recipe_title = Some(title);
    }

    pub fn created_recipe_title(&self) -> Result<&str, HarnessError> {
        self.created_recipe_title
            .as_deref()
            .ok_or(HarnessError::PreconditionMissing("created_recipe_title"))
    }

    pub fn set_created_category_id(&mut self, id: String) {
        self.created_category_id = Some(id);
    }

    pub fn created_category_id(&self) -> Result<&str, HarnessError> {
        self.created_category_id
            .as_deref()
            .ok_or(HarnessError::PreconditionMissing("created_category_id"))
    }

    pub fn set_created_category_name(&mut self, name: String) {
        self.created_category_name = Some(name);
    }

    pub fn created_category_name(&self) -> Result<&str, HarnessError> {
        self.created_category_name
            .as_deref()
            .ok_or(HarnessError::PreconditionMissing("created_category_name"))
    }

    pub fn set_updated_category_id(&mut self, id: String) {
        self.updated_category_id = Some(id);
    }

    pub fn updated_category_id(&self) -> Result<&str, HarnessError> {
        self.updated_category_id
            .as_deref()
            .ok_or(HarnessError::PreconditionMissing("updated_category_id"))
    }

    pub fn set_updated_category_name(&mut self, name: String) {
        self.updated_category_name = Some(name);
    }

    pub fn updated_category_name(&self) -> Result<&str, HarnessError> {
        self.updated_category_name
            .as_deref()
            .ok_or(HarnessError::PreconditionMissing("updated_category_name"))
    }
}

/// Everything a step can touch: the session, the run fixture and the
/// sequence state.
pub struct StepContext<'a> {
    pub session: &'a Session,
    pub fixture: &'a RunFixture,
    pub state: &'a mut TestState,
}

pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HarnessError>> + Send + 'a>>;

pub type StepFn = for<'a> fn(StepContext<'a>) -> StepFuture<'a>;

/// A named step in an ordered sequence.
pub struct Step {
    pub name: &'static str,
    run: StepFn,
}

impl Step {
    pub const fn new(name: &'static str, run: StepFn) -> Self {
        Self { name, run }
    }
}

/// Outcome of one step in a driven sequence.
#[derive(Debug)]
pub enum StepOutcome {
    Passed,
    Failed(HarnessError),
    /// Not executed because an earlier step failed.
    Skipped,
}

#[derive(Debug)]
pub struct StepReport {
    pub name: &'static str,
    pub outcome: StepOutcome,
}

/// Result of driving one full sequence.
#[derive(Debug)]
pub struct SequenceReport {
    pub name: &'static str,
    pub steps: Vec<StepReport>,
}

impl SequenceReport {
    pub fn passed(&self) -> bool {
        self.steps
            .iter()
            .all(|step| matches!(step.outcome, StepOutcome::Passed))
    }

    /// The first failed step, if any.
    pub fn failure(&self) -> Option<(&'static str, &HarnessError)> {
        self.steps.iter().find_map(|step| match &step.outcome {
            StepOutcome::Failed(error) => Some((step.name, error)),
            _ => None,
        })
    }
}

/// Drives the steps of one sequence in order.
///
/// Later steps depend on state captured by earlier ones, so the first
/// failure aborts the remainder: subsequent steps are reported as skipped,
/// never executed against half-initialized state.
pub async fn run_sequence(
    name: &'static str,
    session: &Session,
    fixture: &RunFixture,
    steps: &[Step],
) -> SequenceReport {
    let mut state = TestState::default();
    let mut reports = Vec::with_capacity(steps.len());
    let mut failed = false;

    info!(sequence = name, "starting sequence");
    for step in steps {
        if failed {
            reports.push(StepReport {
                name: step.name,
                outcome: StepOutcome::Skipped,
            });
            continue;
        }

        let cx = StepContext {
            session,
            fixture,
            state: &mut state,
        };
        match (step.run)(cx).await {
            Ok(()) => {
                info!(sequence = name, step = step.name, "step passed");
                reports.push(StepReport {
                    name: step.name,
                    outcome: StepOutcome::Passed,
                });
            }
            Err(e) => {
                error!(sequence = name, step = step.name, error = %e, "step failed");
                failed = true;
                reports.push(StepReport {
                    name: step.name,
                    outcome: StepOutcome::Failed(e),
                });
            }
        }
    }

    SequenceReport {
        name,
        steps: reports,
    }
}
