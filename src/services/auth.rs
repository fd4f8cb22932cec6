use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use tracing::{info, warn};

use crate::db::Store;
use crate::error::{StudioError, StudioResult};
use crate::models::AdminUser;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_SIZE: usize = 16;
const HASH_SIZE: usize = 32;
pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> String {
    hash_password_with(password, PBKDF2_ITERATIONS)
}

/// `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`
pub fn hash_password_with(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut hash);

    format!(
        "{}${}${}${}",
        SCHEME,
        iterations,
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    let (Ok(iterations), Ok(salt), Ok(expected)) = (
        iterations.parse::<u32>(),
        hex::decode(salt),
        hex::decode(expected),
    ) else {
        return false;
    };
    if iterations == 0 || expected.is_empty() {
        return false;
    }

    let mut hash = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut hash);

    // Compare without short-circuiting on the first differing byte
    hash.iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub fn validate_new_password(password: &str, confirmation: &str) -> StudioResult<()> {
    if password != confirmation {
        return Err(StudioError::validation("passwords do not match"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StudioError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn login(store: &dyn Store, email: &str, password: &str) -> StudioResult<AdminUser> {
    let email = normalize_email(email);
    let Some(user) = store.find_admin(&email).await? else {
        warn!(%email, "login attempt for unknown account");
        return Err(StudioError::Unauthorized);
    };

    if !verify_password(password, &user.password_hash) {
        warn!(%email, "login attempt with wrong password");
        return Err(StudioError::Unauthorized);
    }

    info!(user_id = user.id, "admin logged in");
    Ok(user)
}

pub async fn create_admin(store: &dyn Store, email: &str, password: &str) -> StudioResult<i32> {
    let email = normalize_email(email);
    if !email.contains('@') {
        return Err(StudioError::validation("e-mail address is not valid"));
    }
    validate_new_password(password, password)?;

    let id = store.upsert_admin(&email, &hash_password(password)).await?;
    info!(user_id = id, %email, "admin account saved");
    Ok(id)
}

pub async fn change_password(
    store: &dyn Store,
    user: &AdminUser,
    new_password: &str,
    confirmation: &str,
) -> StudioResult<()> {
    validate_new_password(new_password, confirmation)?;
    store
        .update_admin_password(user.id, &hash_password(new_password))
        .await?;
    info!(user_id = user.id, "admin password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn hash_round_trip() {
        let stored = hash_password_with("retouch42", 1_000);
        assert!(stored.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("retouch42", &stored));
        assert!(!verify_password("retouch43", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(
            hash_password_with("same", 1_000),
            hash_password_with("same", 1_000)
        );
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "plain-text"));
        assert!(!verify_password("x", "pbkdf2-sha256$abc$00$00"));
        assert!(!verify_password("x", "bcrypt$1000$00$00"));
    }

    #[test]
    fn new_password_rules() {
        assert!(validate_new_password("secret1", "secret1").is_ok());
        assert!(matches!(
            validate_new_password("secret1", "secret2"),
            Err(StudioError::Validation(_))
        ));
        assert!(matches!(
            validate_new_password("abc", "abc"),
            Err(StudioError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_checks_email_and_password() {
        let store = MemoryStore::new();
        store
            .upsert_admin("owner@studio.test", &hash_password_with("retouch42", 1_000))
            .await
            .unwrap();

        let user = login(&store, " Owner@Studio.test ", "retouch42").await.unwrap();
        assert_eq!(user.email, "owner@studio.test");

        for (email, password) in [("owner@studio.test", "nope"), ("other@studio.test", "retouch42")] {
            let err = login(&store, email, password).await.unwrap_err();
            assert!(matches!(err, StudioError::Unauthorized));
        }
    }

    #[tokio::test]
    async fn rejected_password_change_keeps_the_old_hash() {
        let store = MemoryStore::new();
        let stored = hash_password_with("retouch42", 1_000);
        store.upsert_admin("owner@studio.test", &stored).await.unwrap();
        let user = store.find_admin("owner@studio.test").await.unwrap().unwrap();

        let err = change_password(&store, &user, "short", "short").await.unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
        let user = store.find_admin("owner@studio.test").await.unwrap().unwrap();
        assert_eq!(user.password_hash, stored);
    }
}
