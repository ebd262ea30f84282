//! Scripted generation backend for deterministic testing.
//!
//! Each model has its own queue of scripted outcomes, consumed one per call.
//! When a model's queue is empty the default response is returned.
//!
//! ## Usage
//!
//! ```rust
//! use edital_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new().with_default_response("{\"ok\":true}");
//! backend.push_failure("gemini-2.5-flash", Some(503), "The model is overloaded.");
//! backend.push_response("gemini-2.5-flash", "{\"a\":1}");
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use edital_core::{Error, GenerationBackend, GenerationRequest, GenerationResponse, Result};

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Failure { status: Option<u16>, message: String },
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub model: String,
    pub request: GenerationRequest,
    pub timestamp: std::time::Instant,
}

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    default_response: Arc<Mutex<Option<String>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerationBackend {
    /// Create a backend that answers "Mock response" by default.
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(Some("Mock response".to_string()))),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_default_response(self, response: impl Into<String>) -> Self {
        *self.default_response.lock().unwrap() = Some(response.into());
        self
    }

    /// Fail with a non-retryable error once scripts run out.
    pub fn without_default_response(self) -> Self {
        *self.default_response.lock().unwrap() = None;
        self
    }

    /// Queue a successful answer for `model`.
    pub fn push_response(&self, model: &str, text: impl Into<String>) {
        self.push(model, Scripted::Text(text.into()));
    }

    /// Queue a failure for `model`.
    pub fn push_failure(&self, model: &str, status: Option<u16>, message: impl Into<String>) {
        self.push(
            model,
            Scripted::Failure {
                status,
                message: message.into(),
            },
        );
    }

    fn push(&self, model: &str, outcome: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Models called, in order.
    pub fn called_models(&self) -> Vec<String> {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.model.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse> {
        self.call_log.lock().unwrap().push(MockCall {
            model: model.to_string(),
            request: request.clone(),
            timestamp: std::time::Instant::now(),
        });

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Text(text)) => Ok(GenerationResponse { text }),
            Some(Scripted::Failure { status, message }) => Err(Error::generation(status, message)),
            None => match self.default_response.lock().unwrap().clone() {
                Some(text) => Ok(GenerationResponse { text }),
                None => Err(Error::generation(
                    Some(400),
                    format!("no scripted response for {}", model),
                )),
            },
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
