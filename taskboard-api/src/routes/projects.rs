/// Project endpoints
///
/// All routes require a session.
///
/// # Endpoints
///
/// - `GET    /api/v1/projects` - All projects with their tasks
/// - `POST   /api/v1/projects` - Create a project
/// - `GET    /api/v1/projects/:id` - One project with its tasks
/// - `PUT    /api/v1/projects/:id` - Replace name, description and status
/// - `DELETE /api/v1/projects/:id` - Delete a project and its tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{data, message, ApiJson, DataResponse, MessageResponse, ResourceId},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use taskboard_shared::{
    models::project::{CreateProject, Project, ProjectWithTasks, UpdateProject},
    validation::{non_empty, parse_status, require_all},
};

/// Body for create and update
#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

fn project_not_found() -> ApiError {
    ApiError::not_found("Project not found")
}

pub async fn get_all_projects(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<Vec<ProjectWithTasks>>>> {
    let projects = ProjectWithTasks::list(&state.db).await?;
    Ok(data("Projects retrieved successfully", projects))
}

pub async fn get_project_by_id(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<DataResponse<ProjectWithTasks>>> {
    let project = ProjectWithTasks::find_by_id(&state.db, id)
        .await?
        .ok_or_else(project_not_found)?;

    Ok(data("Project retrieved successfully", project))
}

/// Creates a project
///
/// # Errors
///
/// - `400 Bad Request`: Missing field or status outside the allowed values
pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ProjectRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Project>>)> {
    let [name, description, status] = require_all(
        [&req.name, &req.description, &req.status],
        "Please provide the project name, description, and status",
    )?;
    let status = parse_status(status)?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: name.to_string(),
            description: description.to_string(),
            status,
        },
    )
    .await?;

    tracing::info!(project_id = project.id, "Project created");

    Ok((
        StatusCode::CREATED,
        data("Project created successfully", project),
    ))
}

/// Replaces a project's fields
///
/// # Errors
///
/// - `404 Not Found`: No such project
/// - `400 Bad Request`: Missing name or description, or invalid status
pub async fn update_project(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    ApiJson(req): ApiJson<ProjectRequest>,
) -> ApiResult<Json<DataResponse<Project>>> {
    if !Project::exists(&state.db, id).await? {
        return Err(project_not_found());
    }

    let [name, description] = require_all(
        [&req.name, &req.description],
        "Please provide the project name and description",
    )?;
    let status = parse_status(non_empty(&req.status).unwrap_or_default())?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: name.to_string(),
            description: description.to_string(),
            status,
        },
    )
    .await?
    .ok_or_else(project_not_found)?;

    tracing::info!(project_id = id, "Project updated");

    Ok(data("Project updated successfully", project))
}

/// Deletes a project together with its tasks
pub async fn delete_project(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<MessageResponse>> {
    if !Project::delete(&state.db, id).await? {
        return Err(project_not_found());
    }

    tracing::info!(project_id = id, "Project deleted");

    Ok(message("Project deleted successfully"))
}
