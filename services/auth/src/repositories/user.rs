//! User repository: password hashing on top of the credential store

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use recommender::{CatalogError, CredentialStore, NewUser, Role, User, UserId};
use std::sync::Arc;
use tracing::{info, warn};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn CredentialStore>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Hash the password and store a new user
    ///
    /// The username uniqueness check is left to the store, so a taken
    /// username surfaces as a `CatalogError::UsernameTaken` inside the error.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
        interests: &str,
    ) -> Result<User> {
        info!("Registering new {:?} user: {}", role, username);

        let password_hash = hash_password(password)?;
        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
                role,
                interests: interests.to_string(),
            })
            .await?;

        Ok(user)
    }

    /// Return the user if the username exists and the password matches
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, CatalogError> {
        let Some(user) = self.store.find_by_username(username).await? else {
            info!("Login attempt for unknown user: {}", username);
            return Ok(None);
        };

        match verify_password(&user, password) {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(e) => {
                warn!("Stored password hash for {} is unreadable: {}", username, e);
                Ok(None)
            }
        }
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, CatalogError> {
        self.store.find_user(id).await
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

fn verify_password(user: &User, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recommender::memory::MemoryStore;

    fn repository() -> UserRepository {
        UserRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let repo = repository();
        let user = repo
            .register("alice", "correct horse", Role::Member, "jazz")
            .await
            .unwrap();

        assert_ne!(user.password_hash, "correct horse");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let repo = repository();
        let registered = repo
            .register("alice", "correct horse", Role::Member, "jazz")
            .await
            .unwrap();

        let user = repo.authenticate("alice", "correct horse").await.unwrap();
        assert_eq!(user.map(|u| u.id), Some(registered.id));

        assert!(repo.authenticate("alice", "wrong horse").await.unwrap().is_none());
        assert!(repo.authenticate("bob", "correct horse").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_password_gets_different_salts() {
        let repo = repository();
        let a = repo.register("alice", "same password", Role::Member, "a").await.unwrap();
        let b = repo.register("bob", "same password", Role::Member, "b").await.unwrap();
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[tokio::test]
    async fn test_taken_username() {
        let repo = repository();
        repo.register("alice", "password one", Role::Member, "jazz")
            .await
            .unwrap();

        let err = repo
            .register("alice", "password two", Role::Admin, "")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::UsernameTaken(_))
        ));
    }
}
