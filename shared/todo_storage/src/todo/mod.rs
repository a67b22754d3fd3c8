//! Todo storage module for `DynamoDB` operations
//!
//! Items live in a single table keyed by `(userId, todoId)`. Listing goes through a
//! global secondary index keyed by `(userId, createdAt)` so results come back in
//! creation order.

mod error;
#[cfg(any(test, feature = "test-utils"))]
mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::SdkError, types::AttributeValue, Client as DynamoDbClient};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_items, to_item};
use strum::Display;
use tracing::debug;

pub use error::{TodoStorageError, TodoStorageResult};
#[cfg(any(test, feature = "test-utils"))]
pub use in_memory::InMemoryTodoStore;

/// A single task record owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Partition key - opaque identifier of the owner
    pub user_id: String,
    /// Sort key - UUID v4 assigned at creation
    pub todo_id: String,
    /// RFC 3339 creation timestamp, also the GSI sort key
    pub created_at: String,
    /// User supplied label
    pub name: String,
    /// Optional user supplied due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Completion flag
    pub done: bool,
    /// Public URL of the uploaded attachment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

/// Fields overwritten by a todo update
///
/// All three are always written; a missing due date is stored as `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    /// New label
    pub name: String,
    /// New completion flag
    pub done: bool,
    /// New due date
    #[serde(default)]
    pub due_date: Option<String>,
}

/// `DynamoDB` attribute names for the todo table
#[derive(Debug, Clone, Copy, Display)]
#[strum(serialize_all = "camelCase")]
pub enum TodoAttribute {
    /// Partition key, also the GSI partition key
    UserId,
    /// Sort key
    TodoId,
    /// GSI sort key
    CreatedAt,
    /// Todo label (reserved word in `DynamoDB`, always aliased)
    Name,
    /// Due date
    DueDate,
    /// Completion flag
    Done,
    /// Attachment URL
    AttachmentUrl,
}

/// Table operations needed by the todo service
///
/// Every method addresses items by the owner first; no operation can reach an item
/// without knowing its `user_id`.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Returns every todo owned by `user_id`, oldest first
    async fn query_by_user(&self, user_id: &str) -> TodoStorageResult<Vec<TodoItem>>;

    /// Writes the full record, replacing any item with the same key
    async fn put(&self, todo: &TodoItem) -> TodoStorageResult<()>;

    /// Overwrites `name`, `done` and `dueDate` on an existing item
    ///
    /// Missing items are left alone and the call still succeeds.
    async fn update_fields(
        &self,
        user_id: &str,
        todo_id: &str,
        update: &TodoUpdate,
    ) -> TodoStorageResult<()>;

    /// Overwrites `attachmentUrl` on an existing item
    ///
    /// Missing items are left alone and the call still succeeds.
    async fn update_attachment_url(
        &self,
        user_id: &str,
        todo_id: &str,
        attachment_url: &str,
    ) -> TodoStorageResult<()>;

    /// Removes the item; deleting a missing item succeeds
    async fn delete(&self, user_id: &str, todo_id: &str) -> TodoStorageResult<()>;
}

/// Storage client for todo operations
pub struct TodoStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    created_at_index_name: String,
}

impl TodoStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for todos
    /// * `created_at_index_name` - Name of the GSI keyed by `(userId, createdAt)`
    #[must_use]
    pub const fn new(
        dynamodb_client: Arc<DynamoDbClient>,
        table_name: String,
        created_at_index_name: String,
    ) -> Self {
        Self {
            dynamodb_client,
            table_name,
            created_at_index_name,
        }
    }

    fn key_value(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }
}

#[async_trait]
impl TodoStore for TodoStorage {
    async fn query_by_user(&self, user_id: &str) -> TodoStorageResult<Vec<TodoItem>> {
        let mut todos = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let response = self
                .dynamodb_client
                .query()
                .table_name(&self.table_name)
                .index_name(&self.created_at_index_name)
                .key_condition_expression("#user_id = :user_id")
                .expression_attribute_names("#user_id", TodoAttribute::UserId.to_string())
                .expression_attribute_values(":user_id", Self::key_value(user_id))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            let items = response.items.unwrap_or_default();
            todos.extend(from_items::<_, TodoItem>(items)?);

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        Ok(todos)
    }

    async fn put(&self, todo: &TodoItem) -> TodoStorageResult<()> {
        let item = to_item(todo)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await?;

        Ok(())
    }

    async fn update_fields(
        &self,
        user_id: &str,
        todo_id: &str,
        update: &TodoUpdate,
    ) -> TodoStorageResult<()> {
        let due_date = update
            .due_date
            .clone()
            .map_or(AttributeValue::Null(true), AttributeValue::S);

        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(TodoAttribute::UserId.to_string(), Self::key_value(user_id))
            .key(TodoAttribute::TodoId.to_string(), Self::key_value(todo_id))
            .update_expression("SET #name = :name, #done = :done, #due_date = :due_date")
            .condition_expression("attribute_exists(#todo_id)")
            .expression_attribute_names("#todo_id", TodoAttribute::TodoId.to_string())
            .expression_attribute_names("#name", TodoAttribute::Name.to_string())
            .expression_attribute_names("#done", TodoAttribute::Done.to_string())
            .expression_attribute_names("#due_date", TodoAttribute::DueDate.to_string())
            .expression_attribute_values(":name", AttributeValue::S(update.name.clone()))
            .expression_attribute_values(":done", AttributeValue::Bool(update.done))
            .expression_attribute_values(":due_date", due_date)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(ref svc))
                if svc.err().is_conditional_check_failed_exception() =>
            {
                debug!(user_id, todo_id, "update skipped, todo does not exist");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update_attachment_url(
        &self,
        user_id: &str,
        todo_id: &str,
        attachment_url: &str,
    ) -> TodoStorageResult<()> {
        let result = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(TodoAttribute::UserId.to_string(), Self::key_value(user_id))
            .key(TodoAttribute::TodoId.to_string(), Self::key_value(todo_id))
            .update_expression("SET #attachment_url = :attachment_url")
            .condition_expression("attribute_exists(#todo_id)")
            .expression_attribute_names("#todo_id", TodoAttribute::TodoId.to_string())
            .expression_attribute_names(
                "#attachment_url",
                TodoAttribute::AttachmentUrl.to_string(),
            )
            .expression_attribute_values(
                ":attachment_url",
                AttributeValue::S(attachment_url.to_string()),
            )
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(ref svc))
                if svc.err().is_conditional_check_failed_exception() =>
            {
                debug!(user_id, todo_id, "attachment url skipped, todo does not exist");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, user_id: &str, todo_id: &str) -> TodoStorageResult<()> {
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(TodoAttribute::UserId.to_string(), Self::key_value(user_id))
            .key(TodoAttribute::TodoId.to_string(), Self::key_value(todo_id))
            .send()
            .await?;

        Ok(())
    }
}
