//! Generic saga runner.
//!
//! A workflow is described as data: a [`SagaDefinition`] is an ordered list
//! of [`SagaStep`]s over a shared context. The [`SagaRunner`] executes the
//! steps in order and, when one fails, runs the compensations of the
//! already-completed steps in reverse order. Steps never panic to signal
//! failure; they return errors.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};

use crate::error::SagaError;

/// Lifecycle of a single saga execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaState {
    /// Steps are executing forward.
    Running,
    /// A step failed; compensations are running in reverse.
    Compensating,
    /// Every step completed.
    Completed,
    /// A step failed and compensation has finished.
    Failed,
}

impl SagaState {
    /// Returns true once the execution can no longer make progress.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Completed | SagaState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Running => "Running",
            SagaState::Compensating => "Compensating",
            SagaState::Completed => "Completed",
            SagaState::Failed => "Failed",
        }
    }
}

impl fmt::Display for SagaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of work in a saga.
///
/// `execute` performs the forward action. `compensate` undoes it and is
/// only invoked for steps whose `execute` already succeeded; the default
/// is a no-op for steps with nothing to undo.
#[async_trait]
pub trait SagaStep<C: Send>: Send + Sync {
    /// Stable step name used in errors, logs, and metrics.
    fn name(&self) -> &'static str;

    /// Performs the step's forward action.
    async fn execute(&self, ctx: &mut C) -> Result<(), SagaError>;

    /// Undoes the step's forward action.
    async fn compensate(&self, _ctx: &mut C) -> Result<(), SagaError> {
        Ok(())
    }
}

/// An ordered list of steps making up one workflow.
pub struct SagaDefinition<C: Send> {
    name: &'static str,
    steps: Vec<Arc<dyn SagaStep<C>>>,
}

impl<C: Send> SagaDefinition<C> {
    /// Starts an empty definition with the given workflow name.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    /// Appends a step; steps execute in the order they were added.
    pub fn step(mut self, step: Arc<dyn SagaStep<C>>) -> Self {
        self.steps.push(step);
        self
    }

    /// The workflow name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The steps in execution order.
    pub fn steps(&self) -> &[Arc<dyn SagaStep<C>>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<C: Send> fmt::Debug for SagaDefinition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SagaDefinition")
            .field("name", &self.name)
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct SagaConfig {
    /// Upper bound on each step's execution; `None` disables the guard.
    /// A timed-out step is treated exactly like a failed step.
    pub step_timeout: Option<Duration>,
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            step_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Outcome of one saga execution.
#[derive(Debug)]
pub struct SagaReport {
    saga: &'static str,
    state: SagaState,
    completed_steps: Vec<&'static str>,
    compensated_steps: Vec<&'static str>,
    error: Option<SagaError>,
}

impl SagaReport {
    /// The workflow name this report belongs to.
    pub fn saga(&self) -> &'static str {
        self.saga
    }

    /// Terminal state of the execution.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Returns true if every step completed.
    pub fn succeeded(&self) -> bool {
        self.state == SagaState::Completed
    }

    /// Names of the steps that completed, in execution order.
    pub fn completed_steps(&self) -> &[&'static str] {
        &self.completed_steps
    }

    /// Names of the steps whose compensation ran, in compensation order.
    pub fn compensated_steps(&self) -> &[&'static str] {
        &self.compensated_steps
    }

    /// The failure that stopped the execution, if any.
    pub fn error(&self) -> Option<&SagaError> {
        self.error.as_ref()
    }

    /// Consumes the report, yielding the failure if the saga failed.
    pub fn into_error(self) -> Option<SagaError> {
        self.error
    }
}

/// Executes saga definitions.
#[derive(Debug, Clone, Default)]
pub struct SagaRunner {
    config: SagaConfig,
}

impl SagaRunner {
    pub fn new(config: SagaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SagaConfig {
        &self.config
    }

    /// Runs every step of `definition` against `ctx`.
    ///
    /// On the first step failure, compensations of the completed steps run
    /// in reverse order. A failing compensation is logged and does not stop
    /// the remaining compensations. The report's error is always the
    /// original step failure, never a compensation error.
    pub async fn run<C: Send>(&self, definition: &SagaDefinition<C>, ctx: &mut C) -> SagaReport {
        let saga = definition.name();
        counter!("saga_executions_total", "saga" => saga).increment(1);
        let started = Instant::now();

        let mut state = SagaState::Running;
        let mut completed: Vec<&Arc<dyn SagaStep<C>>> = Vec::new();
        let mut failure: Option<SagaError> = None;

        for step in definition.steps() {
            tracing::debug!(saga, step = step.name(), %state, "executing saga step");
            match self.run_step(step.as_ref(), ctx).await {
                Ok(()) => {
                    tracing::debug!(saga, step = step.name(), "saga step completed");
                    completed.push(step);
                }
                Err(cause) => {
                    let cause = Self::attribute(step.name(), cause);
                    tracing::warn!(saga, step = step.name(), error = %cause, "saga step failed");
                    failure = Some(cause);
                    state = SagaState::Compensating;
                    break;
                }
            }
        }

        let mut compensated = Vec::new();
        if state == SagaState::Compensating {
            for step in completed.iter().rev() {
                tracing::debug!(saga, step = step.name(), "compensating saga step");
                if let Err(error) = step.compensate(ctx).await {
                    // Compensation failures do not stop the unwind; the
                    // remaining steps still get their chance to undo.
                    tracing::error!(saga, step = step.name(), %error, "compensation failed");
                }
                compensated.push(step.name());
            }
            state = SagaState::Failed;
        } else {
            state = SagaState::Completed;
        }

        histogram!("saga_duration_seconds", "saga" => saga)
            .record(started.elapsed().as_secs_f64());
        match state {
            SagaState::Completed => counter!("saga_completed_total", "saga" => saga).increment(1),
            _ => counter!("saga_failed_total", "saga" => saga).increment(1),
        }
        tracing::info!(saga, %state, steps = completed.len(), "saga finished");

        SagaReport {
            saga,
            state,
            completed_steps: completed.iter().map(|s| s.name()).collect(),
            compensated_steps: compensated,
            error: failure,
        }
    }

    async fn run_step<C: Send>(
        &self,
        step: &dyn SagaStep<C>,
        ctx: &mut C,
    ) -> Result<(), SagaError> {
        match self.config.step_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, step.execute(ctx)).await {
                Ok(result) => result,
                Err(_) => Err(SagaError::StepTimedOut {
                    step: step.name(),
                    timeout,
                }),
            },
            None => step.execute(ctx).await,
        }
    }

    /// Wraps a raw step error so the caller learns which step failed.
    fn attribute(step: &'static str, cause: SagaError) -> SagaError {
        match cause {
            timed_out @ SagaError::StepTimedOut { .. } => timed_out,
            other => SagaError::StepFailed {
                step,
                reason: other.to_string(),
            },
        }
    }
}
