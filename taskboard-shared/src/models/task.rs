/// Task model and database operations
///
/// A task belongs to exactly one project and is assigned to exactly one user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status VARCHAR(32) NOT NULL
///         CHECK (status IN ('Not Started', 'In Progress', 'Completed')),
///     project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::status::Status;
/// use taskboard_shared::models::task::{CreateTask, Task};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     name: "Write docs".to_string(),
///     description: "README and API reference".to_string(),
///     status: Status::NotStarted,
///     project_id: 1,
///     user_id: 1,
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::PgPool;

use super::status::Status;
use super::user::UserProfile;

/// Task row, serialised with camelCase foreign keys (`projectId`, `userId`)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub name: String,
    pub description: String,

    #[sqlx(try_from = "String")]
    pub status: Status,

    pub project_id: i32,

    /// Assignee
    pub user_id: i32,
}

/// Task with its assignee
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithUser {
    #[serde(flatten)]
    pub task: Task,
    pub user: Option<UserProfile>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub project_id: i32,
    pub user_id: i32,
}

/// Input for updating a task; every field is overwritten
#[derive(Debug, Clone)]
pub struct UpdateTask {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub project_id: i32,
    pub user_id: i32,
}

impl Task {
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (name, description, status, project_id, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, status, project_id, user_id
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.status.as_str())
        .bind(data.project_id)
        .bind(data.user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, description, status, project_id, user_id
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists every task, unfiltered
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, description, status, project_id, user_id
            FROM tasks
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Lists the tasks of the given projects
    pub async fn list_by_projects(
        pool: &PgPool,
        project_ids: &[i32],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, description, status, project_id, user_id
            FROM tasks
            WHERE project_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await
    }

    /// Returns None if the task doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i32,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET name = $2, description = $3, status = $4, project_id = $5, user_id = $6
            WHERE id = $1
            RETURNING id, name, description, status, project_id, user_id
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.status.as_str())
        .bind(data.project_id)
        .bind(data.user_id)
        .fetch_optional(pool)
        .await
    }

    /// Returns false if the task didn't exist
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl TaskWithUser {
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let Some(task) = Task::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let user = UserProfile::find_by_id(pool, task.user_id).await?;

        Ok(Some(Self { task, user }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serialises_camel_case_keys() {
        let task = Task {
            id: 9,
            name: "Write docs".to_string(),
            description: "README".to_string(),
            status: Status::Completed,
            project_id: 2,
            user_id: 5,
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["projectId"], 2);
        assert_eq!(json["userId"], 5);
        assert_eq!(json["status"], "Completed");
        assert!(json.get("project_id").is_none());
    }

    #[test]
    fn test_task_with_user_embeds_assignee() {
        let with_user = TaskWithUser {
            task: Task {
                id: 1,
                name: "t".to_string(),
                description: "d".to_string(),
                status: Status::NotStarted,
                project_id: 1,
                user_id: 5,
            },
            user: Some(UserProfile {
                id: 5,
                name: "alice123".to_string(),
                email: "a@example.com".to_string(),
                photo: None,
            }),
        };

        let json = serde_json::to_value(&with_user).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["user"]["email"], "a@example.com");
        assert!(json["user"].get("password").is_none());
    }
}
