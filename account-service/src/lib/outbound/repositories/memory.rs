use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Mirrors the PostgreSQL schema: ids come from a sequence starting at 1,
/// emails are unique, and a duplicate surfaces as a `DatabaseError`.
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<UserId, User>,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email.as_str() == email && Some(u.id) != except)
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_email() -> UserError {
    UserError::DatabaseError(
        "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
    )
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut state = self.state.write().await;

        if state.email_taken(user.email.as_str(), None) {
            return Err(duplicate_email());
        }

        state.next_id += 1;
        let created = User {
            id: UserId(state.next_id),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let state = self.state.read().await;

        Ok(state
            .users
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let state = self.state.read().await;

        Ok(state.users.values().cloned().collect())
    }

    async fn update(&self, id: &UserId, changes: UpdateUserCommand) -> Result<User, UserError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(id) {
            return Err(UserError::NotFound(id.to_string()));
        }
        if state.email_taken(changes.email.as_str(), Some(*id)) {
            return Err(duplicate_email());
        }

        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.name = changes.name;
        user.email = changes.email;

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let mut state = self.state.write().await;

        state
            .users
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}
