//! Dashboard task service

use sqlx::PgPool;
use validator::Validate;

use crate::error::AppResult;
use crate::models::{CreateTaskInput, Task};

/// Task service
#[derive(Clone)]
pub struct TaskService {
    db: PgPool,
}

impl TaskService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_tasks(&self, user_id: &str) -> AppResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, (uuid::Uuid, String, String, chrono::DateTime<chrono::Utc>)>(
            "SELECT id, user_id, name, created_at FROM tasks WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Task {
                id: r.0,
                user_id: r.1,
                name: r.2,
                created_at: r.3,
            })
            .collect())
    }

    pub async fn create_task(&self, user_id: &str, input: CreateTaskInput) -> AppResult<Task> {
        input.validate()?;

        let row = sqlx::query_as::<_, (uuid::Uuid, String, String, chrono::DateTime<chrono::Utc>)>(
            r#"
            INSERT INTO tasks (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(input.name.trim())
        .fetch_one(&self.db)
        .await?;

        Ok(Task {
            id: row.0,
            user_id: row.1,
            name: row.2,
            created_at: row.3,
        })
    }
}
