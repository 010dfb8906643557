//! Completion gateway: turns chat history plus a user message into an
//! assistant reply through an [`LlmProvider`](crate::llm::provider::LlmProvider).
//!
//! The gateway owns the outbound message layout, fixed sampling parameters,
//! reasoning-markup stripping and the title side call. Outbound calls go
//! through [`BoxLlmProvider::complete_cancellable`], so `stop` drops (and
//! thereby aborts) the in-flight HTTP future.

pub mod reasoning;
pub mod style;
pub mod title;

use std::time::Instant;

use parley_types::chat::ChatMessage;
use parley_types::config::{ChatConfig, LlmConfig};
use parley_types::error::ChatError;
use parley_types::llm::{CompletionRequest, LlmError, Message, MessageRole};
use parley_types::style::Style;

use crate::lifecycle::request_context::RequestContext;
use crate::llm::box_provider::BoxLlmProvider;

use self::reasoning::strip_reasoning;
use self::title::{TITLE_SYSTEM_PROMPT, clean_title, fallback_title, title_user_prompt};

/// Model and sampling parameters applied to every outbound call.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub model: String,
    pub max_tokens: u32,
    pub title_max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    /// Number of prior turns forwarded with each reply request.
    pub history_window: usize,
}

impl GatewaySettings {
    pub fn from_config(llm: &LlmConfig, chat: &ChatConfig) -> Self {
        Self {
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            title_max_tokens: llm.title_max_tokens,
            temperature: llm.temperature,
            top_p: llm.top_p,
            history_window: chat.history_window,
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default(), &ChatConfig::default())
    }
}

/// Validate and trim user input.
pub fn validate_input(input: &str) -> Result<&str, ChatError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    Ok(trimmed)
}

/// Build the outbound message list: `[preamble] + last N turns + [user]`.
///
/// `history` must be in chronological order; only the trailing `window`
/// turns are kept, order preserved.
pub fn build_messages(
    history: &[ChatMessage],
    input: &str,
    style: Style,
    window: usize,
) -> Vec<Message> {
    let start = history.len().saturating_sub(window);
    let mut messages = Vec::with_capacity(window + 2);
    messages.push(style::preamble_message(style));
    messages.extend(history[start..].iter().map(|m| Message {
        role: m.role,
        content: m.content.clone(),
    }));
    messages.push(Message {
        role: MessageRole::User,
        content: input.to_string(),
    });
    messages
}

/// Stateless wrapper around the provider; shared across requests.
pub struct CompletionGateway {
    provider: BoxLlmProvider,
    settings: GatewaySettings,
}

impl CompletionGateway {
    pub fn new(provider: BoxLlmProvider, settings: GatewaySettings) -> Self {
        Self { provider, settings }
    }

    /// Produce the assistant reply for `input` given the chat's history.
    #[tracing::instrument(
        name = "gateway.reply",
        skip(self, ctx, history, input, style),
        fields(
            request_id = %ctx.request_id,
            model = %self.settings.model,
            style = %style,
            history_len = history.len(),
        )
    )]
    pub async fn reply(
        &self,
        ctx: &RequestContext,
        history: &[ChatMessage],
        input: &str,
        style: Style,
    ) -> Result<String, ChatError> {
        let input = validate_input(input)?;
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: build_messages(history, input, style, self.settings.history_window),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
        };

        let content = self.call(ctx, &request).await?;
        let reply = strip_reasoning(&content);
        if reply.is_empty() {
            tracing::warn!("completion was empty after stripping reasoning");
            return Err(ChatError::Upstream(LlmError::EmptyResponse));
        }
        Ok(reply)
    }

    /// Generate a short title for a chat from its first message.
    ///
    /// Failures fall back to the truncated input; only cancellation is
    /// reported as an error.
    #[tracing::instrument(
        name = "gateway.title",
        skip(self, ctx, input),
        fields(request_id = %ctx.request_id, model = %self.settings.model)
    )]
    pub async fn generate_title(
        &self,
        ctx: &RequestContext,
        input: &str,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                Message::system(TITLE_SYSTEM_PROMPT),
                Message::user(title_user_prompt(input.trim())),
            ],
            max_tokens: self.settings.title_max_tokens,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
        };

        match self.call(ctx, &request).await {
            Ok(raw) => Ok(clean_title(&raw).unwrap_or_else(|| fallback_title(input))),
            Err(LlmError::Cancelled) => Err(LlmError::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "title generation failed, using input");
                Ok(fallback_title(input))
            }
        }
    }

    async fn call(
        &self,
        ctx: &RequestContext,
        request: &CompletionRequest,
    ) -> Result<String, LlmError> {
        let started = Instant::now();
        let result = self.provider.complete_cancellable(ctx, request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(resp) => tracing::debug!(
                elapsed_ms,
                provider = self.provider.name(),
                input_tokens = resp.usage.input_tokens,
                output_tokens = resp.usage.output_tokens,
                "completion finished"
            ),
            Err(LlmError::Cancelled) => {
                tracing::info!(elapsed_ms, "completion cancelled")
            }
            Err(e) => tracing::error!(elapsed_ms, error = %e, "completion failed"),
        }

        result.map(|resp| resp.content)
    }
}
