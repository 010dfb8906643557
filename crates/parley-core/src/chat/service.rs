//! ChatService -- orchestrates the chat store, completion gateway, and the
//! chat-list cache on behalf of one user at a time.
//!
//! Generic over repository implementations so it can be tested with the
//! in-memory doubles in `crate::testing`.

use std::sync::Arc;

use chrono::Utc;
use parley_types::chat::{Chat, ChatMessage, MessageRole};
use parley_types::error::ChatError;
use parley_types::user::UserId;
use serde::Serialize;
use uuid::Uuid;

use super::cache::ChatListCache;
use super::repository::ChatRepository;
use crate::gateway::{CompletionGateway, validate_input};
use crate::lifecycle::request_context::RequestContext;
use crate::repository::user::UserRepository;

/// Result of a successful send: the reply, the new title (first message
/// only), and the refreshed chat list.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub reply: String,
    pub title: Option<String>,
    pub chats: Vec<Chat>,
}

pub struct ChatService<C: ChatRepository, U: UserRepository> {
    chat_repo: Arc<C>,
    user_repo: Arc<U>,
    gateway: Arc<CompletionGateway>,
    cache: ChatListCache,
}

impl<C: ChatRepository, U: UserRepository> ChatService<C, U> {
    pub fn new(
        chat_repo: Arc<C>,
        user_repo: Arc<U>,
        gateway: Arc<CompletionGateway>,
        cache: ChatListCache,
    ) -> Self {
        Self {
            chat_repo,
            user_repo,
            gateway,
            cache,
        }
    }

    /// Return the active chat if it still exists for `user_id`, otherwise
    /// create a fresh one.
    pub async fn ensure_active_chat(
        &self,
        user_id: UserId,
        active: Option<Uuid>,
    ) -> Result<Chat, ChatError> {
        if let Some(chat_id) = active {
            if let Some(chat) = self.chat_repo.get_chat(user_id, &chat_id).await? {
                return Ok(chat);
            }
            tracing::debug!(user_id, %chat_id, "active chat is gone, creating a new one");
        }
        self.new_chat(user_id).await
    }

    /// Create a chat and return it.
    pub async fn new_chat(&self, user_id: UserId) -> Result<Chat, ChatError> {
        let chat = self.chat_repo.create_chat(&Chat::new(user_id)).await?;
        self.cache.invalidate(user_id);
        tracing::info!(user_id, chat_id = %chat.id, "created chat");
        Ok(chat)
    }

    /// Make `chat_id` the active chat. Unknown (or foreign) chats are replaced
    /// by a new chat.
    pub async fn switch_chat(&self, user_id: UserId, chat_id: &Uuid) -> Result<Chat, ChatError> {
        match self.chat_repo.get_chat(user_id, chat_id).await? {
            Some(mut chat) => {
                let now = Utc::now();
                self.chat_repo.touch(chat_id, now).await?;
                self.cache.invalidate(user_id);
                chat.last_active = now;
                Ok(chat)
            }
            None => self.new_chat(user_id).await,
        }
    }

    /// Reset an owned chat. Returns `false` if the chat is not the user's.
    pub async fn reset_chat(&self, user_id: UserId, chat_id: &Uuid) -> Result<bool, ChatError> {
        if !self.chat_repo.chat_exists(user_id, chat_id).await? {
            return Ok(false);
        }
        self.chat_repo.reset_chat(chat_id, Utc::now()).await?;
        self.cache.invalidate(user_id);
        tracing::info!(user_id, %chat_id, "reset chat");
        Ok(true)
    }

    /// Delete an owned chat.
    ///
    /// When the deleted chat is the active one (or there is no active chat),
    /// returns the chat that should become active: the most recent remaining
    /// chat, or a freshly created one.
    pub async fn delete_chat(
        &self,
        user_id: UserId,
        chat_id: &Uuid,
        active: Option<Uuid>,
    ) -> Result<Option<Chat>, ChatError> {
        if !self.chat_repo.chat_exists(user_id, chat_id).await? {
            return Ok(None);
        }
        self.chat_repo.delete_chat(chat_id).await?;
        self.cache.invalidate(user_id);
        tracing::info!(user_id, %chat_id, "deleted chat");

        if active.is_some_and(|a| a != *chat_id) {
            return Ok(None);
        }
        let replacement = match self.list_chats(user_id).await?.first() {
            Some(chat) => chat.clone(),
            None => self.new_chat(user_id).await?,
        };
        Ok(Some(replacement))
    }

    /// The user's chats, newest activity first. Served from the cache.
    pub async fn list_chats(&self, user_id: UserId) -> Result<Arc<Vec<Chat>>, ChatError> {
        let chats = self
            .cache
            .get_or_load(user_id, || self.chat_repo.list_chats(user_id))
            .await?;
        Ok(chats)
    }

    /// Full message history of an owned chat.
    pub async fn history(&self, user_id: UserId, chat_id: &Uuid) -> Result<Vec<ChatMessage>, ChatError> {
        if !self.chat_repo.chat_exists(user_id, chat_id).await? {
            return Err(ChatError::NotFound);
        }
        Ok(self.chat_repo.get_messages(chat_id).await?)
    }

    /// Send `input` to the chat and persist the exchange.
    ///
    /// The user turn is stored before the outbound call. The assistant turn
    /// is stored only for a successful, non-cancelled reply. On the first
    /// message of a chat the title is generated concurrently with the reply
    /// and applied even if the reply fails, unless the request was stopped.
    #[tracing::instrument(
        name = "chat.send_message",
        skip(self, ctx, input),
        fields(request_id = %ctx.request_id, user_id = ctx.user_id, chat_id = %chat_id)
    )]
    pub async fn send_message(
        &self,
        ctx: &RequestContext,
        chat_id: &Uuid,
        input: &str,
    ) -> Result<Exchange, ChatError> {
        let user_id = ctx.user_id;
        let input = validate_input(input)?;

        let chat = self
            .chat_repo
            .get_chat(user_id, chat_id)
            .await?
            .ok_or(ChatError::NotFound)?;
        let history = self.chat_repo.get_messages(&chat.id).await?;
        let style = self.user_repo.get_settings(user_id).await?.style;

        self.chat_repo
            .append_message(&chat.id, MessageRole::User, input, Utc::now())
            .await?;
        self.cache.invalidate(user_id);

        let (reply, title) = if history.is_empty() {
            let (reply, title) = tokio::join!(
                self.gateway.reply(ctx, &history, input, style),
                self.gateway.generate_title(ctx, input),
            );
            (reply, title.ok())
        } else {
            (self.gateway.reply(ctx, &history, input, style).await, None)
        };

        let title = match title {
            Some(title) if !ctx.is_cancelled() => {
                self.chat_repo.update_title(&chat.id, &title).await?;
                tracing::debug!(%title, "applied generated title");
                Some(title)
            }
            _ => None,
        };

        let reply = reply?;
        if ctx.is_cancelled() {
            return Err(ChatError::Cancelled);
        }

        self.chat_repo
            .append_message(&chat.id, MessageRole::Assistant, &reply, Utc::now())
            .await?;
        self.cache.invalidate(user_id);

        let chats = self.list_chats(user_id).await?;
        Ok(Exchange {
            reply,
            title,
            chats: chats.as_ref().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewaySettings;
    use crate::gateway::style::preamble;
    use crate::gateway::title::TITLE_SYSTEM_PROMPT;
    use crate::lifecycle::registry::RequestRegistry;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::testing::{InMemoryChatRepository, InMemoryUserRepository, MockMode, MockProvider};
    use parley_types::chat::DEFAULT_CHAT_TITLE;
    use parley_types::llm::{LlmError, MessageRole};
    use parley_types::style::Style;
    use std::time::Duration;

    struct Fixture {
        service: ChatService<InMemoryChatRepository, InMemoryUserRepository>,
        chats: Arc<InMemoryChatRepository>,
        users: Arc<InMemoryUserRepository>,
        provider: MockProvider,
        user_id: UserId,
    }

    async fn fixture(mode: MockMode) -> Fixture {
        let chats = Arc::new(InMemoryChatRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let user_id = users.create_user("alice", "hash").await.unwrap().id;
        let provider = MockProvider::new(mode);
        let gateway = Arc::new(CompletionGateway::new(
            BoxLlmProvider::new(provider.clone()),
            GatewaySettings::default(),
        ));
        let service = ChatService::new(
            chats.clone(),
            users.clone(),
            gateway,
            ChatListCache::new(Duration::from_secs(30)),
        );
        Fixture {
            service,
            chats,
            users,
            provider,
            user_id,
        }
    }

    #[tokio::test]
    async fn test_ensure_active_chat_creates_when_missing() {
        let f = fixture(MockMode::Text("hi".into())).await;
        let chat = f.service.ensure_active_chat(f.user_id, None).await.unwrap();
        assert_eq!(chat.title, DEFAULT_CHAT_TITLE);

        let same = f
            .service
            .ensure_active_chat(f.user_id, Some(chat.id))
            .await
            .unwrap();
        assert_eq!(same.id, chat.id);

        let replaced = f
            .service
            .ensure_active_chat(f.user_id, Some(Uuid::new_v4()))
            .await
            .unwrap();
        assert_ne!(replaced.id, chat.id);
    }

    #[tokio::test]
    async fn test_first_message_generates_title_and_persists_both_turns() {
        let f = fixture(MockMode::Text("Sure thing.".into())).await;
        f.provider.set_title("\"Greeting the bot\"");
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        let ctx = RequestContext::new(f.user_id);

        let exchange = f.service.send_message(&ctx, &chat.id, "hello").await.unwrap();
        assert_eq!(exchange.reply, "Sure thing.");
        assert_eq!(exchange.title.as_deref(), Some("Greeting the bot"));
        assert_eq!(exchange.chats.len(), 1);
        assert_eq!(exchange.chats[0].title, "Greeting the bot");

        let messages = f.chats.get_messages(&chat.id).await.unwrap();
        let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
        assert_eq!(f.provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_later_messages_skip_title_call() {
        let f = fixture(MockMode::Text("ok".into())).await;
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        let ctx = RequestContext::new(f.user_id);
        f.service.send_message(&ctx, &chat.id, "one").await.unwrap();
        let before = f.provider.requests().len();

        let exchange = f.service.send_message(&ctx, &chat.id, "two").await.unwrap();
        assert!(exchange.title.is_none());
        assert_eq!(f.provider.requests().len(), before + 1);
    }

    #[tokio::test]
    async fn test_history_window_is_last_three_turns() {
        let f = fixture(MockMode::Text("ok".into())).await;
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        let ctx = RequestContext::new(f.user_id);
        for input in ["a", "b", "c"] {
            f.service.send_message(&ctx, &chat.id, input).await.unwrap();
        }
        f.service.send_message(&ctx, &chat.id, "d").await.unwrap();

        let last = f.provider.requests().pop().unwrap();
        let contents: Vec<&str> = last.messages.iter().map(|m| m.content.as_str()).collect();
        // stored turns: a ok b ok c ok -> last three are "ok", "c", "ok"
        assert_eq!(contents[1..], ["ok", "c", "ok", "d"]);
        assert_eq!(last.messages[0].role, MessageRole::System);
    }

    #[tokio::test]
    async fn test_style_selects_preamble() {
        let f = fixture(MockMode::Text("Certainly.".into())).await;
        f.users.set_style(f.user_id, Style::Formal).await.unwrap();
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        f.chats
            .append_message(&chat.id, MessageRole::User, "hi", Utc::now())
            .await
            .unwrap();

        let ctx = RequestContext::new(f.user_id);
        f.service
            .send_message(&ctx, &chat.id, "how are you")
            .await
            .unwrap();

        let req = f.provider.requests().pop().unwrap();
        assert_eq!(req.messages.len(), 3);
        assert_eq!(req.messages[0].content, preamble(Style::Formal));
        assert_eq!(req.messages[1].content, "hi");
        assert_eq!(req.messages[2].content, "how are you");
    }

    #[tokio::test]
    async fn test_empty_input_touches_nothing() {
        let f = fixture(MockMode::Text("ok".into())).await;
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        let writes = f.chats.mutation_count();

        let ctx = RequestContext::new(f.user_id);
        let result = f.service.send_message(&ctx, &chat.id, "  \n ").await;
        assert!(matches!(result, Err(ChatError::EmptyMessage)));
        assert_eq!(f.chats.mutation_count(), writes);
        assert!(f.provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_chat_is_not_found() {
        let f = fixture(MockMode::Text("ok".into())).await;
        let bob = f.users.create_user("bob", "hash").await.unwrap().id;
        let bobs_chat = f.service.new_chat(bob).await.unwrap();

        let ctx = RequestContext::new(f.user_id);
        let result = f.service.send_message(&ctx, &bobs_chat.id, "hi").await;
        assert!(matches!(result, Err(ChatError::NotFound)));
        assert!(f.chats.get_messages(&bobs_chat.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_stored_as_reply() {
        let f = fixture(MockMode::Fail(LlmError::Provider {
            message: "HTTP 503".into(),
        }))
        .await;
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        let ctx = RequestContext::new(f.user_id);

        let result = f.service.send_message(&ctx, &chat.id, "hello there").await;
        assert!(matches!(result, Err(ChatError::Upstream(_))));

        let messages = f.chats.get_messages(&chat.id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
        // title falls back to the input
        let stored = f.chats.get_chat(f.user_id, &chat.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "hello there");
    }

    #[tokio::test]
    async fn test_stop_aborts_and_persists_no_reply() {
        let f = fixture(MockMode::Hang).await;
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        let registry = RequestRegistry::new();

        let stopper = registry.clone();
        let user_id = f.user_id;
        let stop = tokio::spawn(async move {
            while stopper.in_flight_for(user_id) == 0 {
                tokio::task::yield_now().await;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            stopper.cancel_user(user_id)
        });

        let result = {
            let guard = registry.begin(f.user_id);
            f.service.send_message(guard.context(), &chat.id, "hello").await
        };
        assert_eq!(stop.await.unwrap(), 1);
        assert!(matches!(result, Err(ChatError::Cancelled)));
        assert_eq!(registry.in_flight(), 0);

        let messages = f.chats.get_messages(&chat.id).await.unwrap();
        assert!(messages.iter().all(|m| m.role == MessageRole::User));
        let stored = f.chats.get_chat(f.user_id, &chat.id).await.unwrap().unwrap();
        assert_eq!(stored.title, DEFAULT_CHAT_TITLE);
    }

    #[tokio::test]
    async fn test_chat_deleted_mid_send_is_not_found() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let f = fixture(MockMode::Gated(gate.clone(), "too late".into())).await;
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        f.chats
            .append_message(&chat.id, MessageRole::User, "earlier", Utc::now())
            .await
            .unwrap();
        let ctx = RequestContext::new(f.user_id);

        let (result, _) = tokio::join!(f.service.send_message(&ctx, &chat.id, "hello"), async {
            while f.provider.requests().is_empty() {
                tokio::task::yield_now().await;
            }
            f.service
                .delete_chat(f.user_id, &chat.id, Some(chat.id))
                .await
                .unwrap();
            gate.notify_one();
        });

        assert!(matches!(result, Err(ChatError::NotFound)));
        assert!(!f.chats.chat_exists(f.user_id, &chat.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_keeps_id_and_restores_title() {
        let f = fixture(MockMode::Text("ok".into())).await;
        f.provider.set_title("Some title");
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        let ctx = RequestContext::new(f.user_id);
        f.service.send_message(&ctx, &chat.id, "hi").await.unwrap();

        assert!(f.service.reset_chat(f.user_id, &chat.id).await.unwrap());
        let stored = f.chats.get_chat(f.user_id, &chat.id).await.unwrap().unwrap();
        assert_eq!(stored.id, chat.id);
        assert_eq!(stored.title, DEFAULT_CHAT_TITLE);
        assert!(f.chats.get_messages(&chat.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_foreign_chat_is_noop() {
        let f = fixture(MockMode::Text("ok".into())).await;
        assert!(!f.service.reset_chat(f.user_id, &Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_active_chat_yields_replacement() {
        let f = fixture(MockMode::Text("ok".into())).await;
        let only = f.service.new_chat(f.user_id).await.unwrap();

        let replacement = f
            .service
            .delete_chat(f.user_id, &only.id, Some(only.id))
            .await
            .unwrap()
            .expect("replacement chat");
        assert_ne!(replacement.id, only.id);
        assert!(f.chats.chat_exists(f.user_id, &replacement.id).await.unwrap());
        assert!(!f.chats.chat_exists(f.user_id, &only.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_active_chat_prefers_existing_chat() {
        let f = fixture(MockMode::Text("ok".into())).await;
        let older = f.service.new_chat(f.user_id).await.unwrap();
        let active = f.service.new_chat(f.user_id).await.unwrap();
        f.service.switch_chat(f.user_id, &active.id).await.unwrap();

        let replacement = f
            .service
            .delete_chat(f.user_id, &active.id, Some(active.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replacement.id, older.id);
    }

    #[tokio::test]
    async fn test_delete_inactive_chat_keeps_active() {
        let f = fixture(MockMode::Text("ok".into())).await;
        let other = f.service.new_chat(f.user_id).await.unwrap();
        let active = f.service.new_chat(f.user_id).await.unwrap();

        let replacement = f
            .service
            .delete_chat(f.user_id, &other.id, Some(active.id))
            .await
            .unwrap();
        assert!(replacement.is_none());
        assert_eq!(f.service.list_chats(f.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_switch_unknown_chat_creates_new() {
        let f = fixture(MockMode::Text("ok".into())).await;
        let chat = f.service.switch_chat(f.user_id, &Uuid::new_v4()).await.unwrap();
        assert!(f.chats.chat_exists(f.user_id, &chat.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_chats_sees_mutations() {
        let f = fixture(MockMode::Text("ok".into())).await;
        assert!(f.service.list_chats(f.user_id).await.unwrap().is_empty());
        f.service.new_chat(f.user_id).await.unwrap();
        assert_eq!(f.service.list_chats(f.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_title_prompt_used_only_for_first_message() {
        let f = fixture(MockMode::Text("ok".into())).await;
        let chat = f.service.new_chat(f.user_id).await.unwrap();
        let ctx = RequestContext::new(f.user_id);
        f.service.send_message(&ctx, &chat.id, "one").await.unwrap();
        f.service.send_message(&ctx, &chat.id, "two").await.unwrap();

        let title_calls = f
            .provider
            .requests()
            .iter()
            .filter(|r| r.messages[0].content == TITLE_SYSTEM_PROMPT)
            .count();
        assert_eq!(title_calls, 1);
    }
}
