//! In-memory todo store for tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{TodoItem, TodoStorageResult, TodoStore, TodoUpdate};

type TodoKey = (String, String);

/// `HashMap`-backed store that mirrors the `DynamoDB` semantics of [`super::TodoStorage`]
///
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    todos: Arc<RwLock<HashMap<TodoKey, TodoItem>>>,
}

impl InMemoryTodoStore {
    /// Creates a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored todos across all users
    pub async fn len(&self) -> usize {
        self.todos.read().await.len()
    }

    /// Whether the store holds no todos
    pub async fn is_empty(&self) -> bool {
        self.todos.read().await.is_empty()
    }

    fn key(user_id: &str, todo_id: &str) -> TodoKey {
        (user_id.to_string(), todo_id.to_string())
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn query_by_user(&self, user_id: &str) -> TodoStorageResult<Vec<TodoItem>> {
        let todos = self.todos.read().await;
        let mut owned: Vec<TodoItem> = todos
            .values()
            .filter(|todo| todo.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }

    async fn put(&self, todo: &TodoItem) -> TodoStorageResult<()> {
        let mut todos = self.todos.write().await;
        todos.insert(Self::key(&todo.user_id, &todo.todo_id), todo.clone());
        Ok(())
    }

    async fn update_fields(
        &self,
        user_id: &str,
        todo_id: &str,
        update: &TodoUpdate,
    ) -> TodoStorageResult<()> {
        let mut todos = self.todos.write().await;
        if let Some(todo) = todos.get_mut(&Self::key(user_id, todo_id)) {
            todo.name.clone_from(&update.name);
            todo.done = update.done;
            todo.due_date.clone_from(&update.due_date);
        }
        Ok(())
    }

    async fn update_attachment_url(
        &self,
        user_id: &str,
        todo_id: &str,
        attachment_url: &str,
    ) -> TodoStorageResult<()> {
        let mut todos = self.todos.write().await;
        if let Some(todo) = todos.get_mut(&Self::key(user_id, todo_id)) {
            todo.attachment_url = Some(attachment_url.to_string());
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, todo_id: &str) -> TodoStorageResult<()> {
        let mut todos = self.todos.write().await;
        todos.remove(&Self::key(user_id, todo_id));
        Ok(())
    }
}
