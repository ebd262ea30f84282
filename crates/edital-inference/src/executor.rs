//! Generation executor: model fallback with bounded retries.
//!
//! A call walks an ordered [`ModelAttemptPlan`]. Two small state machines
//! drive it:
//!
//! - [`ModelSelection`] hands out the next model of the plan.
//! - [`RetryState`] tracks one model's attempts. A retryable failure
//!   (overloaded / rate limited) consumes an attempt and schedules a
//!   linear, capped backoff; any other failure abandons the model at once.
//!   The backoff is skipped when no attempt is left on any model.
//!
//! The first success short-circuits everything. When every model is spent
//! the last observed error is returned.
//!
//! Attempts are strictly sequential; the only suspension points are the
//! provider call and the backoff sleep.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use edital_core::{
    defaults, Error, GenerationBackend, GenerationRequest, GenerationResponse, Result,
};

use crate::classify::{classify, FailureKind};

// =============================================================================
// PLAN AND POLICY
// =============================================================================

/// Ordered model identifiers, each with the same attempt budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAttemptPlan {
    models: Vec<String>,
    max_retries_per_model: u32,
}

impl ModelAttemptPlan {
    /// Build a plan. Blank identifiers are dropped; the plan must keep at
    /// least one model and a non-zero budget.
    pub fn new<I, S>(models: I, max_retries_per_model: u32) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models: Vec<String> = models
            .into_iter()
            .map(Into::into)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        if models.is_empty() {
            return Err(Error::Config("model plan has no models".to_string()));
        }
        if max_retries_per_model == 0 {
            return Err(Error::Config(
                "max retries per model must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            models,
            max_retries_per_model,
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn max_retries_per_model(&self) -> u32 {
        self.max_retries_per_model
    }
}

/// Linear backoff: attempt `n` (zero-based) waits `min((n + 1) * step, cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub step: Duration,
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(defaults::BACKOFF_STEP_MS),
            cap: Duration::from_millis(defaults::BACKOFF_CAP_MS),
        }
    }
}

impl BackoffPolicy {
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.step
            .saturating_mul(attempt_index.saturating_add(1))
            .min(self.cap)
    }
}

// =============================================================================
// STATE MACHINES
// =============================================================================

/// Outer state machine: the next model to try.
#[derive(Debug)]
pub struct ModelSelection<'a> {
    remaining: std::slice::Iter<'a, String>,
}

impl<'a> ModelSelection<'a> {
    pub fn new(plan: &'a ModelAttemptPlan) -> Self {
        Self {
            remaining: plan.models.iter(),
        }
    }
}

impl<'a> Iterator for ModelSelection<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.remaining.next().map(String::as_str)
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep, then try the same model again if budget remains.
    Backoff(Duration),
    /// Give up on this model immediately.
    Abandon,
}

/// Inner state machine: one model's bounded retry loop.
#[derive(Debug)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
    abandoned: bool,
    elapsed_backoff: Duration,
    last_error: Option<Error>,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            abandoned: false,
            elapsed_backoff: Duration::ZERO,
            last_error: None,
        }
    }

    /// Zero-based index of the next attempt.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn can_attempt(&self) -> bool {
        !self.abandoned && self.attempt < self.max_attempts
    }

    pub fn elapsed_backoff(&self) -> Duration {
        self.elapsed_backoff
    }

    /// Consume the current attempt with a failure and decide what follows.
    pub fn record_failure(
        &mut self,
        kind: FailureKind,
        err: Error,
        policy: &BackoffPolicy,
    ) -> RetryDecision {
        let decision = if kind.is_retryable() {
            let delay = policy.delay_for(self.attempt);
            self.elapsed_backoff += delay;
            RetryDecision::Backoff(delay)
        } else {
            self.abandoned = true;
            RetryDecision::Abandon
        };
        self.attempt += 1;
        self.last_error = Some(err);
        decision
    }

    pub fn into_last_error(self) -> Option<Error> {
        self.last_error
    }
}

// =============================================================================
// EXECUTOR
// =============================================================================

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Retryable { kind: FailureKind, delay: Duration },
    NonRetryable { kind: FailureKind },
}

/// One provider call made during an execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub model: String,
    pub attempt: u32,
    pub outcome: AttemptOutcome,
}

/// A successful execution with its attempt history.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub response: GenerationResponse,
    /// Model that produced the response.
    pub model: String,
    pub attempts: Vec<AttemptRecord>,
}

/// Runs generation requests against a plan of models.
#[derive(Clone)]
pub struct GenerationExecutor {
    backend: Arc<dyn GenerationBackend>,
    backoff: BackoffPolicy,
}

impl GenerationExecutor {
    pub fn new(backend: Arc<dyn GenerationBackend>, backoff: BackoffPolicy) -> Self {
        Self { backend, backoff }
    }

    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    /// Run `request` through the plan until one model succeeds.
    pub async fn call(
        &self,
        plan: &ModelAttemptPlan,
        request: &GenerationRequest,
    ) -> Result<ExecutionOutcome> {
        let start = Instant::now();
        let mut attempts = Vec::new();
        let mut last_error: Option<Error> = None;

        let mut models = ModelSelection::new(plan).peekable();
        while let Some(model) = models.next() {
            let is_last_model = models.peek().is_none();
            let mut state = RetryState::new(plan.max_retries_per_model());

            while state.can_attempt() {
                let attempt = state.attempt();
                match self.backend.generate(model, request).await {
                    Ok(response) => {
                        attempts.push(AttemptRecord {
                            model: model.to_string(),
                            attempt,
                            outcome: AttemptOutcome::Succeeded,
                        });
                        info!(
                            subsystem = "inference",
                            component = "executor",
                            model = model,
                            attempt = attempt,
                            total_attempts = attempts.len(),
                            response_len = response.text.len(),
                            duration_ms = start.elapsed().as_millis() as u64,
                            "Generation succeeded"
                        );
                        return Ok(ExecutionOutcome {
                            response,
                            model: model.to_string(),
                            attempts,
                        });
                    }
                    Err(err) => {
                        let kind = classify(&err);
                        let message = err.to_string();
                        match state.record_failure(kind, err, &self.backoff) {
                            RetryDecision::Backoff(delay) => {
                                // Nothing left to retry: fail now instead of sleeping.
                                let delay = if is_last_model && !state.can_attempt() {
                                    Duration::ZERO
                                } else {
                                    delay
                                };
                                warn!(
                                    subsystem = "inference",
                                    component = "executor",
                                    model = model,
                                    attempt = attempt,
                                    delay_ms = delay.as_millis() as u64,
                                    failure = ?kind,
                                    error = %message,
                                    "Retryable generation failure, backing off"
                                );
                                attempts.push(AttemptRecord {
                                    model: model.to_string(),
                                    attempt,
                                    outcome: AttemptOutcome::Retryable { kind, delay },
                                });
                                if !delay.is_zero() {
                                    tokio::time::sleep(delay).await;
                                }
                            }
                            RetryDecision::Abandon => {
                                warn!(
                                    subsystem = "inference",
                                    component = "executor",
                                    model = model,
                                    attempt = attempt,
                                    failure = ?kind,
                                    error = %message,
                                    "Non-retryable generation failure, moving to next model"
                                );
                                attempts.push(AttemptRecord {
                                    model: model.to_string(),
                                    attempt,
                                    outcome: AttemptOutcome::NonRetryable { kind },
                                });
                            }
                        }
                    }
                }
            }

            if let Some(err) = state.into_last_error() {
                last_error = Some(err);
            }
        }

        warn!(
            subsystem = "inference",
            component = "executor",
            total_attempts = attempts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "All models exhausted"
        );
        Err(last_error.unwrap_or_else(|| Error::Config("model plan has no models".to_string())))
    }
}
