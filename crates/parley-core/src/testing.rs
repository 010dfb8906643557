//! In-memory repositories and a scripted LLM provider for service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use parley_types::chat::{Chat, ChatMessage, DEFAULT_CHAT_TITLE, MessageRole, truncate_title};
use parley_types::error::RepositoryError;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};
use parley_types::style::Style;
use parley_types::user::{User, UserId, UserSettings};
use uuid::Uuid;

use crate::chat::repository::ChatRepository;
use crate::gateway::title::TITLE_SYSTEM_PROMPT;
use crate::llm::provider::LlmProvider;
use crate::repository::user::UserRepository;

/// How the mock answers reply calls.
#[derive(Debug, Clone)]
pub enum MockMode {
    Text(String),
    Fail(LlmError),
    /// Never resolves; only cancellation ends the call.
    Hang,
    /// Answers with the text once the gate is notified.
    Gated(Arc<tokio::sync::Notify>, String),
}

#[derive(Debug)]
struct MockState {
    mode: MockMode,
    title: Option<String>,
    requests: Vec<CompletionRequest>,
}

/// Records every request. Title calls return the configured title, or
/// behave like reply calls when none is set.
#[derive(Debug, Clone)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    pub fn new(mode: MockMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                mode,
                title: None,
                requests: Vec::new(),
            })),
        }
    }

    pub fn set_title(&self, title: &str) {
        self.state.lock().unwrap().title = Some(title.to_string());
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send {
        let is_title = request
            .messages
            .first()
            .is_some_and(|m| m.content == TITLE_SYSTEM_PROMPT);
        let mode = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            match (&state.title, is_title) {
                (Some(title), true) => MockMode::Text(title.clone()),
                _ => state.mode.clone(),
            }
        };
        let model = request.model.clone();
        async move {
            match mode {
                MockMode::Text(content) => Ok(CompletionResponse {
                    id: "mock-1".to_string(),
                    content,
                    model,
                    usage: Usage::default(),
                }),
                MockMode::Fail(e) => Err(e),
                MockMode::Hang => std::future::pending().await,
                MockMode::Gated(gate, content) => {
                    gate.notified().await;
                    Ok(CompletionResponse {
                        id: "mock-1".to_string(),
                        content,
                        model,
                        usage: Usage::default(),
                    })
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct UserTables {
    users: Vec<User>,
    settings: Vec<UserSettings>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    tables: Mutex<UserTables>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.username == username) {
            return Err(RepositoryError::Conflict(format!(
                "username '{username}' already exists"
            )));
        }
        let user = User {
            id: tables.users.len() as UserId + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.push(user.clone());
        tables.settings.push(UserSettings::new(user.id));
        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_settings(&self, user_id: UserId) -> Result<UserSettings, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .settings
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned()
            .unwrap_or_else(|| UserSettings::new(user_id)))
    }

    async fn set_style(&self, user_id: UserId, style: Style) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        match tables.settings.iter_mut().find(|s| s.user_id == user_id) {
            Some(settings) => settings.style = style,
            None => tables.settings.push(UserSettings { user_id, style }),
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ChatTables {
    chats: Vec<Chat>,
    messages: Vec<ChatMessage>,
    next_message_id: i64,
}

/// Chat store double. Counts every mutating call.
#[derive(Debug, Default)]
pub struct InMemoryChatRepository {
    tables: Mutex<ChatTables>,
    mutations: AtomicUsize,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn mutated(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

impl ChatRepository for InMemoryChatRepository {
    async fn create_chat(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        self.mutated();
        self.tables.lock().unwrap().chats.push(chat.clone());
        Ok(chat.clone())
    }

    async fn get_chat(&self, user_id: UserId, chat_id: &Uuid) -> Result<Option<Chat>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .chats
            .iter()
            .find(|c| c.id == *chat_id && c.user_id == user_id)
            .cloned())
    }

    async fn chat_exists(&self, user_id: UserId, chat_id: &Uuid) -> Result<bool, RepositoryError> {
        Ok(self.get_chat(user_id, chat_id).await?.is_some())
    }

    async fn list_chats(&self, user_id: UserId) -> Result<Vec<Chat>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        let mut chats: Vec<Chat> = tables
            .chats
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        Ok(chats)
    }

    async fn append_message(
        &self,
        chat_id: &Uuid,
        role: MessageRole,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<ChatMessage, RepositoryError> {
        self.mutated();
        let mut tables = self.tables.lock().unwrap();
        let chat = tables
            .chats
            .iter_mut()
            .find(|c| c.id == *chat_id)
            .ok_or(RepositoryError::NotFound)?;
        chat.last_active = at;
        tables.next_message_id += 1;
        let message = ChatMessage {
            id: tables.next_message_id,
            chat_id: *chat_id,
            role,
            content: content.to_string(),
            created_at: at,
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn get_messages(&self, chat_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        let mut messages: Vec<ChatMessage> = tables
            .messages
            .iter()
            .filter(|m| m.chat_id == *chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(messages)
    }

    async fn update_title(&self, chat_id: &Uuid, title: &str) -> Result<(), RepositoryError> {
        self.mutated();
        let mut tables = self.tables.lock().unwrap();
        if let Some(chat) = tables.chats.iter_mut().find(|c| c.id == *chat_id) {
            chat.title = truncate_title(title);
        }
        Ok(())
    }

    async fn touch(&self, chat_id: &Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.mutated();
        let mut tables = self.tables.lock().unwrap();
        if let Some(chat) = tables.chats.iter_mut().find(|c| c.id == *chat_id) {
            chat.last_active = at;
        }
        Ok(())
    }

    async fn reset_chat(&self, chat_id: &Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.mutated();
        let mut tables = self.tables.lock().unwrap();
        tables.messages.retain(|m| m.chat_id != *chat_id);
        if let Some(chat) = tables.chats.iter_mut().find(|c| c.id == *chat_id) {
            chat.title = DEFAULT_CHAT_TITLE.to_string();
            chat.last_active = at;
        }
        Ok(())
    }

    async fn delete_chat(&self, chat_id: &Uuid) -> Result<(), RepositoryError> {
        self.mutated();
        let mut tables = self.tables.lock().unwrap();
        tables.messages.retain(|m| m.chat_id != *chat_id);
        tables.chats.retain(|c| c.id != *chat_id);
        Ok(())
    }
}
