/// Database models for Taskboard
///
/// # Models
///
/// - `user`: Accounts and task assignees
/// - `project`: Projects, each owning many tasks
/// - `task`: Tasks, each in one project and assigned to one user
/// - `status`: The status enum shared by projects and tasks
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{CreateProject, Project};
/// use taskboard_shared::models::status::Status;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Website".to_string(),
///     description: "Marketing site relaunch".to_string(),
///     status: Status::InProgress,
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod project;
pub mod status;
pub mod task;
pub mod user;
