//! Todo operations
//!
//! One method per use case. Each call scopes every store access to the caller's user id,
//! applies creation defaults and hands the result back to the route layer.
mod error;

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use todo_storage::todo::{TodoItem, TodoStore, TodoUpdate};
use tracing::info;
use uuid::Uuid;

use crate::attachment_storage::{AttachmentUploadRequest, UploadAuthorization, UploadUrlSigner};

pub use error::{TodoError, TodoResult};

/// User supplied fields of a new todo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    /// Label
    pub name: String,
    /// Optional due date
    pub due_date: Option<String>,
}

/// A freshly persisted todo together with its upload slot
#[derive(Debug, Clone)]
pub struct CreatedTodo {
    /// The record as written to the table
    pub item: TodoItem,
    /// Presigned URL for uploading the attachment
    pub upload_url: String,
}

/// Todo service backed by a todo store and an upload signer
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    signer: Arc<dyn UploadUrlSigner>,
}

impl TodoService {
    /// Creates a new todo service
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>, signer: Arc<dyn UploadUrlSigner>) -> Self {
        Self { store, signer }
    }

    /// Lists every todo owned by `user_id`, oldest first
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Storage` if the query fails
    pub async fn list_todos(&self, user_id: &str) -> TodoResult<Vec<TodoItem>> {
        info!(user_id, "Fetching todos");

        let todos = self.store.query_by_user(user_id).await?;

        info!(user_id, count = todos.len(), "Todos fetched");
        Ok(todos)
    }

    /// Creates a todo with a generated id and a pre-provisioned attachment slot
    ///
    /// The record is built first, then an upload is authorized for it and the
    /// resulting public URL is merged in before the single write.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Attachment` if the upload cannot be authorized
    /// Returns `TodoError::Storage` if the write fails
    pub async fn create_todo(&self, user_id: &str, new_todo: NewTodo) -> TodoResult<CreatedTodo> {
        let mut todo = TodoItem {
            user_id: user_id.to_string(),
            todo_id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            name: new_todo.name,
            due_date: new_todo.due_date,
            done: false,
            attachment_url: None,
        };

        info!(user_id, todo_id = %todo.todo_id, "Creating todo");

        let authorization = self.authorize_upload(user_id, &todo.todo_id).await?;
        todo.attachment_url = Some(authorization.attachment_url);

        self.store.put(&todo).await?;

        info!(user_id, todo_id = %todo.todo_id, "Create complete");
        Ok(CreatedTodo {
            item: todo,
            upload_url: authorization.upload_url,
        })
    }

    /// Overwrites `name`, `done` and `dueDate` of a todo
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Storage` if the update fails
    pub async fn update_todo(
        &self,
        user_id: &str,
        todo_id: &str,
        update: &TodoUpdate,
    ) -> TodoResult<()> {
        info!(user_id, todo_id, ?update, "Updating todo");

        self.store.update_fields(user_id, todo_id, update).await?;

        info!(user_id, todo_id, "Update complete");
        Ok(())
    }

    /// Deletes a todo
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Storage` if the delete fails
    pub async fn delete_todo(&self, user_id: &str, todo_id: &str) -> TodoResult<()> {
        info!(user_id, todo_id, "Deleting todo");

        self.store.delete(user_id, todo_id).await?;

        info!(user_id, todo_id, "Delete complete");
        Ok(())
    }

    /// Issues a new upload URL for a todo and points its `attachmentUrl` at the new object
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Attachment` if the upload cannot be authorized
    /// Returns `TodoError::Storage` if recording the attachment URL fails
    pub async fn generate_upload_url(&self, user_id: &str, todo_id: &str) -> TodoResult<String> {
        let authorization = self.authorize_upload(user_id, todo_id).await?;

        self.store
            .update_attachment_url(user_id, todo_id, &authorization.attachment_url)
            .await?;

        info!(user_id, todo_id, "Attachment url updated");
        Ok(authorization.upload_url)
    }

    async fn authorize_upload(
        &self,
        user_id: &str,
        todo_id: &str,
    ) -> TodoResult<UploadAuthorization> {
        let request = AttachmentUploadRequest::new(user_id, todo_id);

        info!(
            user_id,
            todo_id,
            attachment_id = %request.key,
            "Creating signed URL"
        );

        Ok(self.signer.authorize_upload(&request).await?)
    }
}
