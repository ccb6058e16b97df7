//! # User Persistence
//!
//! The [`UserRepository`] port and an in-memory adapter. Database-backed
//! adapters plug in behind the same trait.
//!
//! Ids are allocated by the repository, so they stay unique across restarts
//! of the service as long as the store itself persists.

use crate::error::UserError;
use crate::model::{User, UserId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Allocates an id no stored user holds and no earlier call returned.
    async fn next_id(&self) -> Result<UserId, UserError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    async fn exists_by_line_user_id(&self, line_user_id: &str) -> Result<bool, UserError>;

    /// Stores a new user. Fails with [`UserError::IdTaken`] if the id is
    /// already stored, or [`UserError::LineUserAlreadyExists`] if the LINE
    /// user id belongs to someone else.
    async fn insert(&self, user: User) -> Result<(), UserError>;

    /// Replaces an existing user. Fails with [`UserError::NotFound`] if the
    /// id is not stored.
    async fn save(&self, user: User) -> Result<(), UserError>;
}

/// [`UserRepository`] over a map held in memory.
///
/// Ids are `user_1`, `user_2`, ..., skipping any already present.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    next: AtomicU64,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next: AtomicU64::new(1),
        }
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn next_id(&self) -> Result<UserId, UserError> {
        loop {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            let id = UserId(format!("user_{n}"));
            if !self.users.read().contains_key(&id) {
                return Ok(id);
            }
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn exists_by_line_user_id(&self, line_user_id: &str) -> Result<bool, UserError> {
        Ok(self
            .users
            .read()
            .values()
            .any(|user| user.line_user_id == line_user_id))
    }

    async fn insert(&self, user: User) -> Result<(), UserError> {
        let mut users = self.users.write();
        if users.contains_key(&user.id) {
            return Err(UserError::IdTaken(user.id));
        }
        if users.values().any(|other| other.line_user_id == user.line_user_id) {
            return Err(UserError::LineUserAlreadyExists(user.line_user_id));
        }
        debug!(user_id = %user.id, "Inserting user");
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn save(&self, user: User) -> Result<(), UserError> {
        let mut users = self.users.write();
        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }
        let taken = users
            .values()
            .any(|other| other.id != user.id && other.line_user_id == user.line_user_id);
        if taken {
            return Err(UserError::LineUserAlreadyExists(user.line_user_id));
        }
        debug!(user_id = %user.id, "Saving user");
        users.insert(user.id.clone(), user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_count_up_and_skip_stored_ones() {
        let repo = InMemoryUserRepository::new();
        assert_eq!(repo.next_id().await.unwrap(), UserId::from("user_1"));

        repo.insert(User::new(UserId::from("user_2"), "line-a", None, "A"))
            .await
            .unwrap();
        assert_eq!(repo.next_id().await.unwrap(), UserId::from("user_3"));
    }

    #[tokio::test]
    async fn insert_then_find() {
        let repo = InMemoryUserRepository::new();
        let user = User::new(UserId::from("user_1"), "line-a", None, "A");
        repo.insert(user.clone()).await.unwrap();

        assert_eq!(repo.find_by_id(&user.id).await.unwrap(), Some(user));
        assert!(repo.exists_by_line_user_id("line-a").await.unwrap());
        assert!(!repo.exists_by_line_user_id("line-b").await.unwrap());
        assert_eq!(repo.find_by_id(&UserId::from("user_2")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn insert_never_overwrites() {
        let repo = InMemoryUserRepository::new();
        let existing = User::new(UserId::from("user_1"), "line-existing", None, "A");
        repo.insert(existing.clone()).await.unwrap();

        let same_id = User::new(UserId::from("user_1"), "line-new", None, "B");
        assert_eq!(
            repo.insert(same_id).await,
            Err(UserError::IdTaken(UserId::from("user_1")))
        );
        let same_line = User::new(UserId::from("user_2"), "line-existing", None, "C");
        assert_eq!(
            repo.insert(same_line).await,
            Err(UserError::LineUserAlreadyExists("line-existing".into()))
        );

        assert_eq!(repo.find_by_id(&existing.id).await.unwrap(), Some(existing));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn save_replaces_existing_user_only() {
        let repo = InMemoryUserRepository::new();
        let mut user = User::new(UserId::from("user_1"), "line-a", None, "A");
        repo.insert(user.clone()).await.unwrap();

        user.profile.display_name = "Renamed".into();
        repo.save(user).await.unwrap();
        assert_eq!(repo.len(), 1);

        let unknown = User::new(UserId::from("user_9"), "line-z", None, "Z");
        assert_eq!(
            repo.save(unknown).await,
            Err(UserError::NotFound(UserId::from("user_9")))
        );

        repo.insert(User::new(UserId::from("user_2"), "line-b", None, "B"))
            .await
            .unwrap();
        let clash = User::new(UserId::from("user_2"), "line-a", None, "B");
        assert_eq!(
            repo.save(clash).await,
            Err(UserError::LineUserAlreadyExists("line-a".into()))
        );
    }
}
