//! Client book service

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{generate_client_id, Client, ClientInput, ListQuery};

/// Codes drawn before a collision is reported
const CLIENT_ID_ATTEMPTS: u32 = 3;

/// Client service for managing a user's customers
#[derive(Clone)]
pub struct ClientService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    client_id: String,
    user_id: String,
    name: String,
    phone: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            client_id: row.client_id,
            user_id: row.user_id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl ClientService {
    /// Create a new ClientService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Clients of a user, newest first, optionally filtered by name/email/phone
    pub async fn list_clients(&self, user_id: &str, query: &ListQuery) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, client_id, user_id, name, phone, email, created_at, updated_at
            FROM clients
            WHERE user_id = $1
              AND ($2::text IS NULL
                   OR name ILIKE $2
                   OR email ILIKE $2
                   OR phone ILIKE $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(query.ilike_pattern())
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    pub async fn get_client(&self, user_id: &str, id: Uuid) -> AppResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, client_id, user_id, name, phone, email, created_at, updated_at
            FROM clients
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Ok(row.into())
    }

    /// Create a client with a freshly generated client code
    ///
    /// A code that collides with an existing one is drawn again.
    pub async fn create_client(&self, user_id: &str, input: ClientInput) -> AppResult<Client> {
        let input = input.normalized();
        input.validate()?;

        let mut attempt = 1;
        loop {
            match self.insert_client(user_id, &input, &generate_client_id()).await {
                Err(AppError::DuplicateEntry(_)) if attempt < CLIENT_ID_ATTEMPTS => {
                    tracing::warn!(attempt, "Client code collision, drawing a new one");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn insert_client(
        &self,
        user_id: &str,
        input: &ClientInput,
        client_id: &str,
    ) -> AppResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            INSERT INTO clients (client_id, user_id, name, phone, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, client_id, user_id, name, phone, email, created_at, updated_at
            "#,
        )
        .bind(client_id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_insert(e, "client_id"))?;

        tracing::info!(client_id = %row.client_id, "Client created");

        Ok(row.into())
    }

    /// Replace a client's details; the client code never changes
    pub async fn update_client(
        &self,
        user_id: &str,
        id: Uuid,
        input: ClientInput,
    ) -> AppResult<Client> {
        let input = input.normalized();
        input.validate()?;

        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            UPDATE clients
            SET name = $1, phone = $2, email = $3, updated_at = NOW()
            WHERE id = $4 AND user_id = $5
            RETURNING id, client_id, user_id, name, phone, email, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Ok(row.into())
    }

    /// Delete a client; items referencing it keep existing without a client
    pub async fn delete_client(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client".to_string()));
        }
        Ok(())
    }

    /// Whether `id` is one of the user's clients
    pub async fn owns_client(&self, user_id: &str, id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }
}
