use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tracing::info;
use ulid::Ulid;

use crate::engine::{Engine, EngineError};
use crate::limits::MAX_NAME_LEN;
use crate::model::{Role, User, UserProfile};
use crate::store::Collection;

pub fn hash_password(password: &str) -> Result<String, EngineError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| EngineError::InvalidInput("password could not be hashed"))
}

/// False for a wrong password and for a stored value that is not a hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

impl Engine {
    /// Email match is case-insensitive. `None` for unknown email or wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<UserProfile>, EngineError> {
        let users: Vec<User> = self.load_all(Collection::Users).await?;
        let user = users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .filter(|u| verify_password(password, &u.password_hash));
        Ok(user.map(UserProfile::from))
    }

    /// New accounts are always guests.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserProfile, EngineError> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(EngineError::InvalidInput("name, email and password are required"));
        }
        if name.len() > MAX_NAME_LEN || email.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("name or email too long"));
        }
        self.insert_user(name, email, password, Role::Guest).await
    }

    pub(crate) async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserProfile, EngineError> {
        let user = User {
            id: format!("user-{}", Ulid::new()),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            role,
        };
        self.update_collection(Collection::Users, |users: &mut Vec<User>| {
            if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
                return Err(EngineError::AlreadyExists(user.email.clone()));
            }
            users.push(user.clone());
            Ok(())
        })
        .await?;
        info!("registered user {} ({:?})", user.id, user.role);
        Ok(UserProfile::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trip() {
        let hash = hash_password("Gestore123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Gestore123", &hash));
        assert!(!verify_password("gestore123", &hash));
    }

    #[test]
    fn plain_text_never_verifies() {
        assert!(!verify_password("Gestore123", "Gestore123"));
    }
}
