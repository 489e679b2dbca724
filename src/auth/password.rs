/// Password hashing and verification on top of bcrypt.

use bcrypt::hash;

use crate::error::AppError;

const BCRYPT_COST: u32 = 12;

/// Hash a password with a fresh random salt.
///
/// # Errors
/// Returns an internal error if bcrypt itself fails; input is passed
/// through untouched (provisioning decides password policy, not this
/// service).
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a candidate password against a stored bcrypt hash.
///
/// Never fails: a malformed stored hash verifies as `false`, so the
/// caller cannot distinguish "wrong password" from "corrupt record".
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    bcrypt::verify(candidate, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("correct horse battery").expect("hashing failed");

        assert_ne!(hash, "correct horse battery");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("correct horse battery", &hash));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hash = hash_password("correct horse battery").expect("hashing failed");

        assert!(!verify_password("incorrect horse battery", &hash));
    }

    #[test]
    fn same_password_hashes_differently_but_both_verify() {
        let first = hash_password("hunter2!").expect("hashing failed");
        let second = hash_password("hunter2!").expect("hashing failed");

        assert_ne!(first, second);
        assert!(verify_password("hunter2!", &first));
        assert!(verify_password("hunter2!", &second));
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", ""));
    }
}
