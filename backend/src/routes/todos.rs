use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use todo_storage::todo::{TodoItem, TodoUpdate};
use tracing::instrument;
use validator::Validate;

use crate::{
    middleware::AuthenticatedUser,
    todos::{NewTodo, TodoService},
    types::{AppError, ValidatedJson},
};

/// Request to create a new todo
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    /// Label of the todo, stored as given
    pub name: String,

    /// Optional due date, stored as given
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Request to update an existing todo
///
/// All three fields are written on every update.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    /// New label
    pub name: String,

    /// New completion flag
    pub done: bool,

    /// New due date; omitted clears it
    #[serde(default)]
    pub due_date: Option<String>,
}

impl From<UpdateTodoRequest> for TodoUpdate {
    fn from(request: UpdateTodoRequest) -> Self {
        Self {
            name: request.name,
            done: request.done,
            due_date: request.due_date,
        }
    }
}

/// Response listing the caller's todos
#[derive(Debug, Serialize)]
pub struct ListTodosResponse {
    /// Todos ordered by creation time
    pub items: Vec<TodoItem>,
}

/// Response to a successful create
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoResponse {
    /// The stored todo
    pub item: TodoItem,
    /// Presigned URL for uploading the attachment
    pub upload_url: String,
}

/// Response carrying a fresh upload URL
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    /// Presigned URL for uploading the attachment
    pub attachment_url: String,
}

/// Empty JSON object body
#[derive(Debug, Serialize)]
pub struct EmptyResponse {}

/// List the caller's todos
///
/// # Returns
///
/// Returns `200 OK` with every todo owned by the caller
///
/// # Errors
///
/// - `401 UNAUTHORIZED` - Invalid or missing authentication
/// - `500 INTERNAL_SERVER_ERROR` - Storage operation fails
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn list_todos(
    user: AuthenticatedUser,
    Extension(todo_service): Extension<Arc<TodoService>>,
) -> Result<Json<ListTodosResponse>, AppError> {
    let items = todo_service.list_todos(&user.user_id).await?;

    Ok(Json(ListTodosResponse { items }))
}

/// Create a new todo
///
/// The todo is created with `done = false` and an attachment slot. The returned
/// `uploadUrl` is the only way to write that attachment.
///
/// # Returns
///
/// Returns `201 CREATED` with the stored todo and its upload URL
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Invalid request body
/// - `401 UNAUTHORIZED` - Invalid or missing authentication
/// - `500 INTERNAL_SERVER_ERROR` - Storage or presigning fails
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_todo(
    user: AuthenticatedUser,
    Extension(todo_service): Extension<Arc<TodoService>>,
    ValidatedJson(payload): ValidatedJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<CreateTodoResponse>), AppError> {
    let new_todo = NewTodo {
        name: payload.name,
        due_date: payload.due_date,
    };

    let created = todo_service.create_todo(&user.user_id, new_todo).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTodoResponse {
            item: created.item,
            upload_url: created.upload_url,
        }),
    ))
}

/// Update a todo
///
/// Overwrites `name`, `done` and `dueDate`. Updating a todo that does not exist is a no-op.
///
/// # Returns
///
/// Returns `200 OK` with an empty object
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Invalid request body
/// - `401 UNAUTHORIZED` - Invalid or missing authentication
/// - `500 INTERNAL_SERVER_ERROR` - Storage operation fails
#[instrument(skip_all, fields(user_id = %user.user_id, todo_id = %todo_id))]
pub async fn update_todo(
    user: AuthenticatedUser,
    Path(todo_id): Path<String>,
    Extension(todo_service): Extension<Arc<TodoService>>,
    ValidatedJson(payload): ValidatedJson<UpdateTodoRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    let update = TodoUpdate::from(payload);

    todo_service
        .update_todo(&user.user_id, &todo_id, &update)
        .await?;

    Ok(Json(EmptyResponse {}))
}

/// Delete a todo
///
/// Deleting a todo that does not exist succeeds.
///
/// # Returns
///
/// Returns `202 ACCEPTED` with an empty object
///
/// # Errors
///
/// - `401 UNAUTHORIZED` - Invalid or missing authentication
/// - `500 INTERNAL_SERVER_ERROR` - Storage operation fails
#[instrument(skip_all, fields(user_id = %user.user_id, todo_id = %todo_id))]
pub async fn delete_todo(
    user: AuthenticatedUser,
    Path(todo_id): Path<String>,
    Extension(todo_service): Extension<Arc<TodoService>>,
) -> Result<(StatusCode, Json<EmptyResponse>), AppError> {
    todo_service.delete_todo(&user.user_id, &todo_id).await?;

    Ok((StatusCode::ACCEPTED, Json(EmptyResponse {})))
}

/// Issue a new attachment upload URL for a todo
///
/// Points the todo's `attachmentUrl` at a fresh object and returns the presigned URL
/// for uploading it.
///
/// # Returns
///
/// Returns `200 OK` with the presigned upload URL
///
/// # Errors
///
/// - `401 UNAUTHORIZED` - Invalid or missing authentication
/// - `500 INTERNAL_SERVER_ERROR` - Storage or presigning fails
#[instrument(skip_all, fields(user_id = %user.user_id, todo_id = %todo_id))]
pub async fn generate_upload_url(
    user: AuthenticatedUser,
    Path(todo_id): Path<String>,
    Extension(todo_service): Extension<Arc<TodoService>>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let attachment_url = todo_service
        .generate_upload_url(&user.user_id, &todo_id)
        .await?;

    Ok(Json(UploadUrlResponse { attachment_url }))
}
