/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status VARCHAR(32) NOT NULL
///         CHECK (status IN ('Not Started', 'In Progress', 'Completed'))
/// );
/// ```
///
/// Deleting a project deletes its tasks (`tasks.project_id ... ON DELETE CASCADE`).

use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;

use super::status::Status;
use super::task::Task;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,

    #[sqlx(try_from = "String")]
    pub status: Status,
}

/// Project together with all of its tasks
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<Task>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub status: Status,
}

/// Input for updating a project; every field is overwritten
#[derive(Debug, Clone)]
pub struct UpdateProject {
    pub name: String,
    pub description: String,
    pub status: Status,
}

impl Project {
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, status)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, status
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.status.as_str())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            "SELECT id, name, description, status FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Returns None if the project doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i32,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2, description = $3, status = $4
            WHERE id = $1
            RETURNING id, name, description, status
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.status.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Deletes a project and, through the cascade, its tasks
    ///
    /// Returns false if the project didn't exist.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ProjectWithTasks {
    /// Lists every project with its tasks
    ///
    /// Two queries: the projects, then all tasks belonging to them.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, status FROM projects ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        let ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
        let tasks = Task::list_by_projects(pool, &ids).await?;

        Ok(attach_tasks(projects, tasks))
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let Some(project) = Project::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let tasks = Task::list_by_projects(pool, &[id]).await?;

        Ok(Some(Self { project, tasks }))
    }
}

/// Groups tasks under their projects, preserving both orders
fn attach_tasks(projects: Vec<Project>, tasks: Vec<Task>) -> Vec<ProjectWithTasks> {
    let mut by_project: HashMap<i32, Vec<Task>> = HashMap::new();
    for task in tasks {
        by_project.entry(task.project_id).or_default().push(task);
    }

    projects
        .into_iter()
        .map(|project| {
            let tasks = by_project.remove(&project.id).unwrap_or_default();
            ProjectWithTasks { project, tasks }
        })
        .collect()
}
