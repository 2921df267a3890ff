//! Instrumentation boundary for caller operations.
//!
//! Wrapped operations run without any monitor lock held. Once they finish,
//! successfully, with an error or by panicking, exactly one event is recorded
//! and the original result is handed back (or the panic resumed) unchanged.
//!
//! Operations take a single argument; use a tuple for several and `()` for none.
//! The argument type must implement `Debug` even when argument capture is
//! disabled. For values that do not, move them into the closure and pass `()`.
//!
//! Bookkeeping never masks the operation's outcome: a failing `Debug` or
//! `Display` implementation, or a panicking token extractor, is replaced with a
//! placeholder and logged.

use std::any::Any;
use std::fmt::{self, Debug, Display};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use agentops_config::ArgumentCapture;
use agentops_events::{EventRecord, Outcome};
use agentops_primitives::TokenUsage;
use futures::FutureExt;
use serde_json::Value;
use tracing::warn;

use crate::monitor::MonitorHandle;

/// Metadata value recorded for arguments under [`ArgumentCapture::Redacted`].
pub const REDACTED_ARGUMENTS: &str = "<redacted>";

/// Metadata value recorded when the arguments' `Debug` implementation fails.
pub const UNFORMATTABLE_ARGUMENTS: &str = "<arguments debug failed>";

/// Derives token counters from a successful return value.
pub trait UsageExtractor<T> {
    /// Returns the counters reported by `value`.
    fn extract(&self, value: &T) -> TokenUsage;
}

/// Extractor that reports zeroed counters for every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUsage;

impl<T> UsageExtractor<T> for DefaultUsage {
    fn extract(&self, _value: &T) -> TokenUsage {
        TokenUsage::default()
    }
}

impl<T, G> UsageExtractor<T> for G
where
    G: Fn(&T) -> TokenUsage,
{
    fn extract(&self, value: &T) -> TokenUsage {
        self(value)
    }
}

/// Records events for operations performed under one action type.
#[derive(Debug, Clone)]
pub struct ActionWrapper {
    monitor: MonitorHandle,
    action_type: String,
    model: Option<String>,
}

impl ActionWrapper {
    pub(crate) fn new(monitor: MonitorHandle, action_type: impl Into<String>) -> Self {
        Self {
            monitor,
            action_type: action_type.into(),
            model: None,
        }
    }

    /// Labels recorded events with the model that served the call.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Returns the action label.
    #[must_use]
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Returns the monitor events are recorded to.
    #[must_use]
    pub fn monitor(&self) -> &MonitorHandle {
        &self.monitor
    }

    /// Wraps a reusable operation, returning its instrumented form.
    #[must_use]
    pub fn wrap<F>(&self, operation: F) -> Instrumented<F> {
        Instrumented {
            wrapper: self.clone(),
            operation,
            usage: DefaultUsage,
        }
    }

    /// Runs `operation(args)` once, recording its outcome.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, unchanged.
    pub fn invoke<A, T, E, F>(&self, args: A, operation: F) -> Result<T, E>
    where
        F: FnOnce(A) -> Result<T, E>,
        A: Debug,
        E: Display,
    {
        self.run(args, operation, &DefaultUsage)
    }

    /// Runs the asynchronous `operation(args)` once, recording its outcome.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, unchanged.
    pub async fn invoke_async<A, T, E, F, Fut>(&self, args: A, operation: F) -> Result<T, E>
    where
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Debug,
        E: Display,
    {
        self.run_async(args, operation, &DefaultUsage).await
    }

    fn run<A, T, E, F, U>(&self, args: A, operation: F, usage: &U) -> Result<T, E>
    where
        F: FnOnce(A) -> Result<T, E>,
        U: UsageExtractor<T>,
        A: Debug,
        E: Display,
    {
        let captured = self.capture(&args);
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(move || operation(args)));
        let elapsed = started.elapsed();

        match result {
            Ok(result) => {
                self.complete(&result, elapsed, captured, usage);
                result
            }
            Err(payload) => {
                self.record_panic(payload.as_ref(), elapsed, captured);
                panic::resume_unwind(payload)
            }
        }
    }

    async fn run_async<A, T, E, F, Fut, U>(&self, args: A, operation: F, usage: &U) -> Result<T, E>
    where
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        U: UsageExtractor<T>,
        A: Debug,
        E: Display,
    {
        let captured = self.capture(&args);
        let started = Instant::now();
        let result = AssertUnwindSafe(async move { operation(args).await })
            .catch_unwind()
            .await;
        let elapsed = started.elapsed();

        match result {
            Ok(result) => {
                self.complete(&result, elapsed, captured, usage);
                result
            }
            Err(payload) => {
                self.record_panic(payload.as_ref(), elapsed, captured);
                panic::resume_unwind(payload)
            }
        }
    }

    fn capture<A: Debug>(&self, args: &A) -> Option<Value> {
        match self.monitor.config().argument_capture() {
            ArgumentCapture::Debug => {
                let text = panic::catch_unwind(AssertUnwindSafe(|| format!("{args:?}")))
                    .unwrap_or_else(|_| {
                        warn!(action_type = %self.action_type, "argument formatting failed");
                        UNFORMATTABLE_ARGUMENTS.to_owned()
                    });
                Some(Value::String(text))
            }
            ArgumentCapture::Redacted => Some(Value::from(REDACTED_ARGUMENTS)),
            ArgumentCapture::Disabled => None,
        }
    }

    fn complete<T, E, U>(
        &self,
        result: &Result<T, E>,
        elapsed: Duration,
        captured: Option<Value>,
        usage: &U,
    ) where
        E: Display,
        U: UsageExtractor<T>,
    {
        let token_usage = match result {
            Ok(value) => panic::catch_unwind(AssertUnwindSafe(|| usage.extract(value)))
                .unwrap_or_else(|_| {
                    warn!(action_type = %self.action_type, "token usage extraction panicked");
                    TokenUsage::default()
                }),
            Err(_) => TokenUsage::default(),
        };
        self.record(Outcome::from_result(result), elapsed, captured, token_usage);
    }

    fn record_panic(&self, payload: &(dyn Any + Send), elapsed: Duration, captured: Option<Value>) {
        let message = panic_message(payload);
        warn!(action_type = %self.action_type, %message, "wrapped action panicked");
        self.record(
            Outcome::Failure(format!("panicked: {message}")),
            elapsed,
            captured,
            TokenUsage::default(),
        );
    }

    fn record(
        &self,
        outcome: Outcome,
        elapsed: Duration,
        captured: Option<Value>,
        token_usage: TokenUsage,
    ) {
        let mut builder = EventRecord::builder(self.action_type.clone())
            .latency(elapsed)
            .outcome(outcome)
            .token_usage(token_usage);
        if let Some(model) = &self.model {
            builder = builder.model(model.clone());
        }
        if let Some(args) = captured {
            builder = builder.metadata("args", args);
        }
        self.monitor.record(builder.build());
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

/// An operation bound to an [`ActionWrapper`]; every call is recorded.
pub struct Instrumented<F, U = DefaultUsage> {
    wrapper: ActionWrapper,
    operation: F,
    usage: U,
}

impl<F, U> fmt::Debug for Instrumented<F, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumented")
            .field("action_type", &self.wrapper.action_type)
            .field("model", &self.wrapper.model)
            .finish_non_exhaustive()
    }
}

impl<F> Instrumented<F, DefaultUsage> {
    /// Reports token counters extracted from each successful return value.
    #[must_use]
    pub fn with_token_usage<U>(self, usage: U) -> Instrumented<F, U> {
        Instrumented {
            wrapper: self.wrapper,
            operation: self.operation,
            usage,
        }
    }
}

impl<F, U> Instrumented<F, U> {
    /// Returns the wrapper recording this operation.
    #[must_use]
    pub fn action(&self) -> &ActionWrapper {
        &self.wrapper
    }

    /// Calls the operation, recording the outcome.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, unchanged.
    pub fn call<A, T, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        U: UsageExtractor<T>,
        A: Debug,
        E: Display,
    {
        self.wrapper.run(args, &self.operation, &self.usage)
    }

    /// Calls the asynchronous operation, recording the outcome.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, unchanged.
    pub async fn call_async<A, T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        U: UsageExtractor<T>,
        A: Debug,
        E: Display,
    {
        self.wrapper
            .run_async(args, &self.operation, &self.usage)
            .await
    }

    /// Converts the instrumented operation into a plain closure.
    pub fn into_fn<A, T, E>(self) -> impl Fn(A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        U: UsageExtractor<T>,
        A: Debug,
        E: Display,
    {
        move |args| self.call(args)
    }
}
