/// Task endpoints
///
/// All routes require a session. Create and update share one validation
/// policy: every field is required, `projectId` and `userId` must name
/// existing rows, and `status` must be one of the allowed values.
///
/// # Endpoints
///
/// - `GET    /api/v1/tasks` - All tasks
/// - `POST   /api/v1/tasks` - Create a task
/// - `GET    /api/v1/tasks/:id` - One task with its assignee
/// - `PUT    /api/v1/tasks/:id` - Replace a task's fields
/// - `DELETE /api/v1/tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{data, message, ApiJson, DataResponse, MessageResponse, ResourceId},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;
use taskboard_shared::{
    models::{
        project::Project,
        task::{CreateTask, Task, TaskWithUser, UpdateTask},
        user::User,
    },
    validation::{coerce_id, parse_status, require_all, ValidationError},
};

const MISSING_FIELDS: &str =
    "Please provide the task name, description, status, project ID, and user ID";

/// Body for create and update
///
/// The foreign keys arrive either as numbers or as numeric strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<Value>,
    pub user_id: Option<Value>,
}

fn task_not_found() -> ApiError {
    ApiError::not_found("Task not found")
}

/// Checks a task body and the rows it references
async fn validate_task(state: &AppState, req: &TaskRequest) -> ApiResult<CreateTask> {
    let [name, description, status] =
        require_all([&req.name, &req.description, &req.status], MISSING_FIELDS)?;

    let project_id = coerce_id(req.project_id.as_ref(), "projectId")?;
    let user_id = coerce_id(req.user_id.as_ref(), "userId")?;
    let (Some(project_id), Some(user_id)) = (project_id, user_id) else {
        return Err(ValidationError::new(MISSING_FIELDS).into());
    };

    if !Project::exists(&state.db, project_id).await? {
        return Err(ApiError::not_found("Project not found"));
    }

    if !User::exists(&state.db, user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(CreateTask {
        name: name.to_string(),
        description: description.to_string(),
        status: parse_status(status)?,
        project_id,
        user_id,
    })
}

pub async fn get_all_tasks(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = Task::list(&state.db).await?;
    Ok(data("Tasks retrieved successfully", tasks))
}

/// Returns a task with its assignee under `user`
pub async fn get_task_by_id(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<DataResponse<TaskWithUser>>> {
    let task = TaskWithUser::find_by_id(&state.db, id)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(data("Task retrieved successfully", task))
}

/// Creates a task
///
/// # Errors
///
/// - `400 Bad Request`: Missing field, non-numeric id or invalid status
/// - `404 Not Found`: Project or user does not exist
pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Task>>)> {
    let input = validate_task(&state, &req).await?;
    let task = Task::create(&state.db, input).await?;

    tracing::info!(task_id = task.id, project_id = task.project_id, "Task created");

    Ok((StatusCode::CREATED, data("Task created successfully", task)))
}

/// Replaces a task's fields
///
/// # Errors
///
/// - `404 Not Found`: Task, project or user does not exist
/// - `400 Bad Request`: Same rules as create
pub async fn update_task(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<Json<DataResponse<Task>>> {
    if Task::find_by_id(&state.db, id).await?.is_none() {
        return Err(task_not_found());
    }

    let input = validate_task(&state, &req).await?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            name: input.name,
            description: input.description,
            status: input.status,
            project_id: input.project_id,
            user_id: input.user_id,
        },
    )
    .await?
    .ok_or_else(task_not_found)?;

    tracing::info!(task_id = id, "Task updated");

    Ok(data("Task updated successfully", task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<MessageResponse>> {
    if !Task::delete(&state.db, id).await? {
        return Err(task_not_found());
    }

    tracing::info!(task_id = id, "Task deleted");

    Ok(message("Task deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_request_reads_camel_case_ids() {
        let req: TaskRequest = serde_json::from_value(json!({
            "name": "Write docs",
            "description": "README",
            "status": "Not Started",
            "projectId": "4",
            "userId": 2
        }))
        .unwrap();

        assert_eq!(coerce_id(req.project_id.as_ref(), "projectId").unwrap(), Some(4));
        assert_eq!(coerce_id(req.user_id.as_ref(), "userId").unwrap(), Some(2));
    }

    #[test]
    fn test_task_request_null_id_is_missing() {
        let req: TaskRequest = serde_json::from_value(json!({ "projectId": null })).unwrap();
        assert!(req.project_id.is_none());
        assert!(req.user_id.is_none());
    }
}
