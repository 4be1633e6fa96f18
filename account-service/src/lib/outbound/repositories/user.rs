use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserName;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        // A stored row that fails validation is a storage fault, not bad input.
        let corrupt_row = |field: &str, error: String| {
            tracing::error!(user_id = r.id, field, %error, "Stored user row is invalid");
            UserError::DatabaseError(format!("stored user {} has invalid {}", r.id, field))
        };

        let name = UserName::new(r.name).map_err(|e| corrupt_row("name", e.to_string()))?;
        let email = EmailAddress::new(r.email).map_err(|e| corrupt_row("email", e.to_string()))?;

        Ok(User {
            id: UserId(r.id),
            name,
            email,
            password_hash: r.password_hash,
            created_at: r.created_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            tracing::warn!(constraint = ?db_err.constraint(), "Unique constraint violated");
        }
    }
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password AS password_hash, created_at
            "#,
        )
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?;

        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password AS password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(User::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password AS password_hash, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, id: &UserId, changes: UpdateUserCommand) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2, email = $3
            WHERE id = $1
            RETURNING id, name, email, password AS password_hash, created_at
            "#,
        )
        .bind(id.0)
        .bind(changes.name.as_str())
        .bind(changes.email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(User::try_from)
            .transpose()?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, email: &str) -> UserRow {
        UserRow {
            id: 4,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_user() {
        let user = User::try_from(row("Ann", "a@x.com")).expect("Conversion failed");

        assert_eq!(user.id, UserId(4));
        assert_eq!(user.name.as_str(), "Ann");
        assert_eq!(user.email.as_str(), "a@x.com");
    }

    #[test]
    fn test_blank_stored_fields_are_database_errors() {
        let result = User::try_from(row("  ", "a@x.com"));
        assert!(matches!(result, Err(UserError::DatabaseError(_))));

        let result = User::try_from(row("Ann", ""));
        assert!(matches!(result, Err(UserError::DatabaseError(_))));
    }
}
