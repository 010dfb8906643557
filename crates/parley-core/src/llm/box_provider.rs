//! Type-erased provider handle used by the completion gateway.
//!
//! [`LlmProvider`] returns `impl Future`, so it cannot be a trait object.
//! [`BoxLlmProvider`] hides the concrete client behind an `Arc` and exposes
//! the one call the gateway makes: a completion raced against the request's
//! cancellation token.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::provider::LlmProvider;
use crate::lifecycle::request_context::RequestContext;

type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

trait ErasedProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    fn start<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a>;
}

impl<P: LlmProvider> ErasedProvider for P {
    fn provider_name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn start<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(LlmProvider::complete(self, request))
    }
}

/// Shared handle to whichever completion backend the config selected.
#[derive(Clone)]
pub struct BoxLlmProvider {
    inner: Arc<dyn ErasedProvider>,
}

impl BoxLlmProvider {
    pub fn new<P: LlmProvider + 'static>(provider: P) -> Self {
        Self {
            inner: Arc::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.provider_name()
    }

    /// Run `request` unless `ctx` is cancelled first.
    ///
    /// A context that is already cancelled never reaches the provider. A
    /// cancel that arrives mid-call drops the provider future, which aborts
    /// the outbound request.
    pub async fn complete_cancellable(
        &self,
        ctx: &RequestContext,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        if ctx.is_cancelled() {
            return Err(LlmError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => Err(LlmError::Cancelled),
            result = self.inner.start(request) => result,
        }
    }
}
